// src/model/context.rs

use serde::{Deserialize, Serialize};

use crate::openrtb::request::{App, Device, Site, Source, User};

/// 一次拍卖的共享请求上下文，由编排层构造并传入
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreBidRequestContext {
    /// 交易 ID，直接作为 OpenRTB BidRequest.id
    pub tid: String,
    /// 超时预算（毫秒），写入 tmax，由合作方自行遵守
    pub timeout_millis: Option<u64>,
    /// 1 = 需要 https 素材
    pub secure: Option<i32>,
    pub app: Option<App>,
    pub site: Option<Site>,
    pub device: Option<Device>,
    pub user: Option<User>,
    pub source: Option<Source>,
}
