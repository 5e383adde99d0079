// src/bidding/adapter.rs

use url::Url;

use crate::error::{AdapterError, Result};
use crate::model::ad_unit::AdapterRequest;
use crate::model::bid::BidBuilder;
use crate::model::context::PreBidRequestContext;
use crate::model::http::{ExchangeCall, HttpRequest};

pub const APPLICATION_JSON_UTF8: &str = "application/json;charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";

/// 编排层调用的 bidder adapter 接口。
/// 实现必须无状态，可被不同拍卖并发调用。
pub trait Adapter: Send + Sync {
    /// bidder 名称
    fn name(&self) -> &'static str;

    /// 构造出站请求；任一广告位校验失败则整体失败
    fn make_http_requests(
        &self,
        adapter_request: &AdapterRequest,
        context: &PreBidRequestContext,
    ) -> Result<Vec<HttpRequest>>;

    /// 将传输层结果映射为竞价 builder
    fn extract_bids(&self, adapter_request: &AdapterRequest, exchange_call: &ExchangeCall) -> Result<Vec<BidBuilder>>;
}

/// OpenRTB 出站请求的固定 header
pub fn openrtb_headers() -> Vec<(String, String)> {
    vec![
        ("Content-Type".to_string(), APPLICATION_JSON_UTF8.to_string()),
        ("Accept".to_string(), APPLICATION_JSON.to_string()),
    ]
}

/// 校验 endpoint 是合法的 http(s) 绝对地址，原样返回
pub fn validate_url(endpoint: &str) -> Result<String> {
    let url = Url::parse(endpoint).map_err(|e| AdapterError::InvalidEndpoint {
        url: endpoint.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(endpoint.to_string()),
        other => Err(AdapterError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: format!("unsupported scheme {}", other),
        }),
    }
}
