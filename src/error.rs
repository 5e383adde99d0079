use thiserror::Error;

/// 广告位参数（cp / ct / cf）校验失败的具体原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    #[error("params section is missing")]
    MissingParams,

    /// 参数无法反序列化，保留 serde 的原始错误信息
    #[error("{0}")]
    Malformed(String),

    #[error("missing publisher id")]
    MissingPublisherId,

    #[error("missing tag id")]
    MissingTagId,

    #[error("missing ad size")]
    MissingAdSize,

    #[error("invalid ad size {0}")]
    InvalidAdSize(String),

    #[error("invalid width {0}")]
    InvalidWidth(String),

    #[error("invalid height {0}")]
    InvalidHeight(String),
}

/// 错误大类，供编排层按类别分支处理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 发布方配置错误（参数缺失、格式错误、endpoint 非法）
    Configuration,
    /// 过滤后没有任何可投放的 impression
    EmptyRequest,
    /// 响应里出现了本次调用未发送的 impid
    ContractViolation,
    /// 传输层失败（超时、非 2xx、响应体无法解析）
    Transport,
}

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error(transparent)]
    Params(#[from] ParamsError),

    /// 声明了 video 却没有提供视频参数（或 mimes 为空）
    #[error("invalid ad unit {ad_unit_code}: video media type with no video data")]
    VideoWithoutData { ad_unit_code: String },

    #[error("no valid impressions")]
    NoValidImpressions,

    #[error("unknown ad unit code '{0}'")]
    UnknownImpression(String),

    #[error("invalid endpoint url `{url}`: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("transport: {0}")]
    Transport(String),

    #[error("timeout: partner exceeded {0}ms")]
    Timeout(u64),

    #[error("config: {0}")]
    Config(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),
}

impl AdapterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdapterError::Params(_)
            | AdapterError::VideoWithoutData { .. }
            | AdapterError::InvalidEndpoint { .. }
            | AdapterError::Config(_)
            | AdapterError::Io(_) => ErrorKind::Configuration,
            AdapterError::NoValidImpressions => ErrorKind::EmptyRequest,
            AdapterError::UnknownImpression(_) => ErrorKind::ContractViolation,
            AdapterError::Transport(_) | AdapterError::Timeout(_) | AdapterError::Serde(_) => {
                ErrorKind::Transport
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
