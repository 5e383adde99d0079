// src/model/ad_unit.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::openrtb::request::Format;

/// 调用方声明的广告类型
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Banner,
    Video,
    Native,
    Audio,
}

/// 调用方提供的通用视频参数，原样透传到 imp.video
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoParams {
    #[serde(default)]
    pub mimes: Vec<String>,
    pub minduration: Option<i32>,
    pub maxduration: Option<i32>,
    pub startdelay: Option<i32>,
    pub playback_method: Option<i32>,
    #[serde(default)]
    pub protocols: Vec<i32>,
}

/// 单个广告位的竞价需求（由编排层持有，adapter 只读）
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdUnitBid {
    pub bidder_code: String,
    pub bid_id: String,
    pub ad_unit_code: String,
    #[serde(default)]
    pub sizes: Vec<Format>,
    pub topframe: Option<i32>,
    pub instl: Option<i32>,
    #[serde(default)]
    pub media_types: Vec<MediaType>,
    pub video: Option<VideoParams>,
    /// PulsePoint 专属参数，对编排层不透明
    pub params: Option<Value>,
}

/// 一次 adapter 调用涉及的全部广告位
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdapterRequest {
    pub bidder_code: String,
    pub ad_unit_bids: Vec<AdUnitBid>,
}

impl AdapterRequest {
    pub fn new(bidder_code: &str, ad_unit_bids: Vec<AdUnitBid>) -> Self {
        Self {
            bidder_code: bidder_code.to_string(),
            ad_unit_bids,
        }
    }
}
