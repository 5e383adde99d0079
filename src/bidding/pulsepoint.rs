// src/bidding/pulsepoint.rs

use tracing::{debug, info};

use crate::bidding::adapter::{self, Adapter};
use crate::bidding::{request_builder, response_mapper};
use crate::config::AdapterConfig;
use crate::error::Result;
use crate::model::ad_unit::AdapterRequest;
use crate::model::bid::BidBuilder;
use crate::model::context::PreBidRequestContext;
use crate::model::http::{ExchangeCall, HttpRequest};

pub const BIDDER_NAME: &str = "pulsepoint";

/// **PulsePoint bidder adapter**
///
/// 唯一的状态是构造时校验过的 endpoint。
#[derive(Debug, Clone)]
pub struct PulsepointAdapter {
    endpoint_url: String,
}

impl PulsepointAdapter {
    /// endpoint 非法时立即失败，而不是等到第一次调用
    pub fn new(endpoint_url: &str) -> Result<Self> {
        let endpoint_url = adapter::validate_url(endpoint_url)?;
        info!(endpoint = %endpoint_url, "pulsepoint adapter ready");
        Ok(Self { endpoint_url })
    }

    pub fn from_config(config: &AdapterConfig) -> Result<Self> {
        Self::new(&config.endpoint)
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

impl Adapter for PulsepointAdapter {
    fn name(&self) -> &'static str {
        BIDDER_NAME
    }

    fn make_http_requests(
        &self,
        adapter_request: &AdapterRequest,
        context: &PreBidRequestContext,
    ) -> Result<Vec<HttpRequest>> {
        let bids_with_params = request_builder::validate_all(&adapter_request.ad_unit_bids)?;
        let bid_request = request_builder::build_bid_request(&bids_with_params, context)?;
        debug!(
            tid = %bid_request.id,
            ad_units = bids_with_params.len(),
            imps = bid_request.imp.len(),
            "built pulsepoint bid request"
        );

        Ok(vec![HttpRequest {
            uri: self.endpoint_url.clone(),
            headers: adapter::openrtb_headers(),
            payload: bid_request,
        }])
    }

    fn extract_bids(&self, adapter_request: &AdapterRequest, exchange_call: &ExchangeCall) -> Result<Vec<BidBuilder>> {
        response_mapper::extract_bids(&adapter_request.ad_unit_bids, exchange_call.bid_response.as_ref())
    }
}
