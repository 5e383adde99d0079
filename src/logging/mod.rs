// src/logging/mod.rs

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::error::{AdapterError, Result};

/// 初始化全局 tracing 日志：按小时滚动的 JSON 文件，级别由 RUST_LOG 控制。
/// 返回的 guard 需要在进程结束前一直持有，否则缓冲中的日志会丢失。
pub fn init(log_dir: &str) -> Result<WorkerGuard> {
    let log_file = rolling::hourly(log_dir, "pulsepoint_adapter.json");
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let subscriber = Registry::default()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().json().with_writer(non_blocking));
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AdapterError::Config(format!("unable to set global tracing subscriber: {}", e)))?;
    Ok(guard)
}
