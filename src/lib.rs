//! PulsePoint bidder adapter.
//!
//! 将 prebid 广告位竞价需求翻译为 PulsePoint 的 OpenRTB 请求，并把响应映射回归一化竞价结果。
//! 传输、拍卖编排与用户同步不在本 crate 范围内，`bidding::http_client` 仅提供一个默认传输实现。

pub mod bidding;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod openrtb;

pub use bidding::adapter::Adapter;
pub use bidding::http_client::{HttpClient, ReqwestHttpClient};
pub use bidding::pulsepoint::{PulsepointAdapter, BIDDER_NAME};
pub use config::AdapterConfig;
pub use error::{AdapterError, ErrorKind, ParamsError};
