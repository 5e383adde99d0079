// src/config/adapter_config.rs

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AdapterError, Result};

pub const DEFAULT_ENDPOINT: &str = "http://bid.contextweb.com/header/ortb?src=prebid";
pub const DEFAULT_TIMEOUT_MS: u64 = 250;
pub const DEFAULT_LOG_DIR: &str = "logs";

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_log_dir() -> String {
    DEFAULT_LOG_DIR.to_string()
}

/// adapter 配置，从 JSON 文件读取，缺省字段使用默认值
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AdapterConfig {
    /// PulsePoint 竞价 API 地址
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// BidRequest 未携带 tmax 时传输层使用的超时（毫秒）
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            default_timeout_ms: default_timeout_ms(),
            log_dir: default_log_dir(),
        }
    }
}

impl AdapterConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| AdapterError::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// 文件不存在时返回 None，由调用方决定何时回退并记录日志
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        Self::from_file(path).map(Some)
    }

    /// 文件不存在时回退到默认配置；文件存在但格式错误仍然报错
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Ok(Self::load(path)?.unwrap_or_else(|| {
            warn!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        }))
    }

    /// 命令行参数覆盖 endpoint
    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        self
    }
}
