// src/bidding/http_client.rs

use std::future::Future;
use std::time::Instant;

use reqwest::{Client, StatusCode};
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::error::AdapterError;
use crate::model::http::{ExchangeCall, HttpRequest};
use crate::openrtb::response::BidResponse;

/// 传输层能力：发送 adapter 构造的请求并返回调用结果
pub trait HttpClient: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> impl Future<Output = Result<ExchangeCall, AdapterError>> + Send;
}

/// 毫秒数超出 u64 时饱和到上限
fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// 基于 reqwest 的默认实现，超时取 BidRequest.tmax，缺省时用配置值
pub struct ReqwestHttpClient {
    client: Client,
    default_timeout_ms: u64,
}

impl ReqwestHttpClient {
    pub fn new(default_timeout_ms: u64) -> Self {
        Self {
            client: Client::new(),
            default_timeout_ms,
        }
    }
}

impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: &HttpRequest) -> Result<ExchangeCall, AdapterError> {
        let timeout_ms = request.payload.tmax.unwrap_or(self.default_timeout_ms);
        let mut builder = self.client.post(&request.uri);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let start = Instant::now();
        let call = async {
            let response = builder.json(&request.payload).send().await?;
            let status = response.status();
            let body = if status == StatusCode::NO_CONTENT {
                None
            } else if status.is_success() {
                Some(response.json::<BidResponse>().await?)
            } else {
                return Ok((status, Err(format!("unexpected status code {}", status))));
            };
            Ok::<_, reqwest::Error>((status, Ok(body)))
        };

        let (status, body) = timeout(Duration::from_millis(timeout_ms), call)
            .await
            .map_err(|_| {
                warn!(uri = %request.uri, timeout_ms, "partner call timed out");
                AdapterError::Timeout(timeout_ms)
            })?
            .map_err(|e| AdapterError::Transport(e.to_string()))?;
        let bid_response = body.map_err(AdapterError::Transport)?;
        let response_time_ms = elapsed_ms(start.elapsed());

        debug!(uri = %request.uri, status = status.as_u16(), response_time_ms, "partner call finished");
        Ok(ExchangeCall {
            status_code: status.as_u16(),
            response_time_ms,
            bid_response,
        })
    }
}
