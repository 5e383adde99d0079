// src/model/bid.rs

use std::collections::HashMap;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::model::ad_unit::MediaType;

/// **归一化后的竞价结果**
///
/// adapter 只填写来自合作方响应与广告位的字段；
/// `deal_id`、`media_type`、`response_time_ms`、`ad_server_targeting`
/// 由编排层在 `build()` 之前补充。
#[derive(Builder, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[builder(pattern = "owned", setter(into), default, derive(Debug))]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub bidder: String,
    pub bid_id: String,
    /// 广告位代码（= 合作方响应中的 impid）
    pub code: String,
    pub price: f64,
    pub adm: Option<String>,
    pub creative_id: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub deal_id: Option<String>,
    pub media_type: Option<MediaType>,
    pub response_time_ms: Option<u64>,
    pub ad_server_targeting: Option<HashMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orchestration_can_finish_a_partially_filled_builder() {
        let builder = BidBuilder::default()
            .bidder("pulsepoint")
            .bid_id("abc")
            .code("slot1")
            .price(1.5);

        let bid = builder
            .response_time_ms(Some(42u64))
            .ad_server_targeting(Some(HashMap::from([(
                "hb_pb".to_string(),
                "1.50".to_string(),
            )])))
            .build()
            .unwrap();

        assert_eq!(bid.bid_id, "abc");
        assert_eq!(bid.price, 1.5);
        assert_eq!(bid.response_time_ms, Some(42));
        assert!(bid.adm.is_none());
    }

    #[test]
    fn builder_can_be_debug_printed() {
        let builder = BidBuilder::default().bid_id("abc").price(1.5);
        let printed = format!("{:?}", builder);
        assert!(printed.contains("abc"), "{}", printed);
    }
}
