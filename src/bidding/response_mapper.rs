// src/bidding/response_mapper.rs

use tracing::error;

use crate::error::AdapterError;
use crate::model::ad_unit::AdUnitBid;
use crate::model::bid::BidBuilder;
use crate::openrtb::response::{self, BidResponse};

/// 将合作方响应中的每个 bid 映射回对应广告位。
/// 返回 builder，编排层仍可在 build 前补充拍卖维度的信息。
pub fn extract_bids(
    ad_unit_bids: &[AdUnitBid],
    bid_response: Option<&BidResponse>,
) -> Result<Vec<BidBuilder>, AdapterError> {
    bid_response
        .into_iter()
        .flat_map(|response| response.bids())
        .map(|bid| to_bid_builder(bid, ad_unit_bids))
        .collect()
}

fn to_bid_builder(bid: &response::Bid, ad_unit_bids: &[AdUnitBid]) -> Result<BidBuilder, AdapterError> {
    let ad_unit_bid = lookup_bid(ad_unit_bids, &bid.impid)?;
    Ok(BidBuilder::default()
        .bidder(ad_unit_bid.bidder_code.clone())
        .bid_id(ad_unit_bid.bid_id.clone())
        .code(bid.impid.clone())
        .price(bid.price)
        .adm(bid.adm.clone())
        .creative_id(bid.crid.clone())
        .width(bid.w)
        .height(bid.h))
}

/// 响应中的 impid 必然来自本次发送的 imp，找不到说明上游协议出错
fn lookup_bid<'a>(ad_unit_bids: &'a [AdUnitBid], impid: &str) -> Result<&'a AdUnitBid, AdapterError> {
    ad_unit_bids
        .iter()
        .find(|ad_unit_bid| ad_unit_bid.ad_unit_code == impid)
        .ok_or_else(|| {
            error!(impid = %impid, "partner bid references an impression that was never sent");
            AdapterError::UnknownImpression(impid.to_string())
        })
}
