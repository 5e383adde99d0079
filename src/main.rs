// src/main.rs

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use tokio::signal;
use tracing::{info, warn};

mod mock_dsp;

use pulsepoint_adapter::model::ad_unit::AdapterRequest;
use pulsepoint_adapter::model::context::PreBidRequestContext;
use pulsepoint_adapter::{logging, Adapter, AdapterConfig, HttpClient, PulsepointAdapter, ReqwestHttpClient};

#[derive(Parser, Debug)]
#[command(author = "whiteCcinn", version = "1.0", about = "PulsePoint OpenRTB adapter toolbox")]
struct CliArgs {
    #[arg(long, default_value = "static/adapter_config.json")]
    config: String,
    /// 覆盖配置文件中的日志目录
    #[arg(long)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 构造出站 OpenRTB 请求并打印
    Build {
        #[arg(long, default_value = "static/adapter_request.json")]
        request: String,
    },
    /// 构造请求、发送给合作方并打印映射后的竞价结果
    Auction {
        #[arg(long, default_value = "static/adapter_request.json")]
        request: String,
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// 启动本地 Mock PulsePoint 服务
    MockDsp {
        #[arg(short, long, default_value_t = 9001)]
        port: u16,
    },
}

/// 命令行使用的请求样例：广告位列表 + 拍卖上下文
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AuctionFixture {
    adapter_request: AdapterRequest,
    context: PreBidRequestContext,
}

fn load_fixture(path: &str) -> Result<AuctionFixture, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 先确定日志目录并初始化日志，回退到默认配置的告警才不会丢失
    let loaded = AdapterConfig::load(&args.config)?;
    let config_found = loaded.is_some();
    let mut config = loaded.unwrap_or_default();
    if let Some(log_dir) = args.log_dir {
        config.log_dir = log_dir;
    }
    let _guard = logging::init(&config.log_dir)?;
    if !config_found {
        warn!(path = %args.config, "config file not found, using defaults");
    }

    match args.command {
        Command::Build { request } => {
            let fixture = load_fixture(&request)?;
            let adapter = PulsepointAdapter::from_config(&config)?;
            let http_requests = adapter.make_http_requests(&fixture.adapter_request, &fixture.context)?;
            println!("{}", serde_json::to_string_pretty(&http_requests)?);
        }
        Command::Auction { request, endpoint } => {
            let fixture = load_fixture(&request)?;
            let config = config.with_endpoint(endpoint);
            let adapter = PulsepointAdapter::from_config(&config)?;
            let client = ReqwestHttpClient::new(config.default_timeout_ms);

            let mut bids = Vec::new();
            for http_request in adapter.make_http_requests(&fixture.adapter_request, &fixture.context)? {
                let exchange_call = client.execute(&http_request).await?;
                for builder in adapter.extract_bids(&fixture.adapter_request, &exchange_call)? {
                    bids.push(builder.response_time_ms(Some(exchange_call.response_time_ms)).build()?);
                }
            }
            info!(tid = %fixture.context.tid, bids = bids.len(), "pulsepoint auction finished");
            println!("{}", serde_json::to_string_pretty(&bids)?);
        }
        Command::MockDsp { port } => {
            tokio::select! {
                result = mock_dsp::start_mock_dsp_server(port) => result?,
                _ = signal::ctrl_c() => {
                    info!("Shutting down mock PulsePoint...");
                }
            }
        }
    }

    Ok(())
}
