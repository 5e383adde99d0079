// src/model/http.rs

use serde::{Deserialize, Serialize};

use crate::openrtb::request::BidRequest;
use crate::openrtb::response::BidResponse;

/// 交给传输层的出站请求描述（POST，body 为 OpenRTB JSON）
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub payload: BidRequest,
}

/// 传输层调用结果
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ExchangeCall {
    pub status_code: u16,
    pub response_time_ms: u64,
    /// 204 或空响应时为 None
    pub bid_response: Option<BidResponse>,
}

impl ExchangeCall {
    pub fn with_response(bid_response: BidResponse) -> Self {
        Self {
            status_code: 200,
            response_time_ms: 0,
            bid_response: Some(bid_response),
        }
    }

    pub fn empty() -> Self {
        Self {
            status_code: 204,
            response_time_ms: 0,
            bid_response: None,
        }
    }
}
