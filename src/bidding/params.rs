// src/bidding/params.rs

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ParamsError;
use crate::model::ad_unit::AdUnitBid;

/// 广告位 params 中的 PulsePoint 原始参数。
/// 线上使用短键 cp / ct / cf，同时兼容完整字段名。
#[derive(Deserialize, Debug, Clone, Default)]
struct PulsepointParams {
    #[serde(rename = "cp", alias = "publisherId", default, deserialize_with = "lenient_int")]
    publisher_id: Option<i64>,
    #[serde(rename = "ct", alias = "tagId", default, deserialize_with = "lenient_int")]
    tag_id: Option<i64>,
    #[serde(rename = "cf", alias = "adSize", default)]
    ad_size: Option<String>,
}

/// 校验通过后的参数，publisher / tag id 以字符串形式保存，与 OpenRTB 字段类型一致
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerParams {
    pub publisher_id: String,
    pub tag_id: String,
    pub ad_size_width: u32,
    pub ad_size_height: u32,
}

/// 接受 JSON 数字或数字字符串；空字符串视为缺失
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid integer value {}", n))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("cannot parse `{}` as an integer", s))),
        Some(other) => Err(de::Error::custom(format!("expected an integer, found {}", other))),
    }
}

/// 解析并校验单个广告位的参数，按固定顺序返回第一个失败原因
pub fn parse_and_validate(ad_unit_bid: &AdUnitBid) -> Result<PartnerParams, ParamsError> {
    let raw = match &ad_unit_bid.params {
        None | Some(Value::Null) => return Err(ParamsError::MissingParams),
        Some(raw) => raw,
    };

    let params = PulsepointParams::deserialize(raw)
        .map_err(|e| ParamsError::Malformed(e.to_string()))?;

    let publisher_id = match params.publisher_id {
        Some(id) if id != 0 => id,
        _ => return Err(ParamsError::MissingPublisherId),
    };
    let tag_id = match params.tag_id {
        Some(id) if id != 0 => id,
        _ => return Err(ParamsError::MissingTagId),
    };
    let ad_size = match params.ad_size.as_deref() {
        Some(size) if !size.is_empty() => size,
        _ => return Err(ParamsError::MissingAdSize),
    };

    let (ad_size_width, ad_size_height) = parse_ad_size(ad_size)?;

    Ok(PartnerParams {
        publisher_id: publisher_id.to_string(),
        tag_id: tag_id.to_string(),
        ad_size_width,
        ad_size_height,
    })
}

/// "300x250" / "300X250" -> (300, 250)
fn parse_ad_size(ad_size: &str) -> Result<(u32, u32), ParamsError> {
    let lowered = ad_size.to_lowercase();
    let mut sizes: Vec<&str> = lowered.split('x').collect();
    // 末尾的空段不计入段数（"300x250x" 仍是两段）
    while sizes.last().is_some_and(|s| s.is_empty()) {
        sizes.pop();
    }

    let [width, height] = sizes.as_slice() else {
        return Err(ParamsError::InvalidAdSize(ad_size.to_string()));
    };
    let width = width
        .parse::<u32>()
        .map_err(|_| ParamsError::InvalidWidth(width.to_string()))?;
    let height = height
        .parse::<u32>()
        .map_err(|_| ParamsError::InvalidHeight(height.to_string()))?;

    Ok((width, height))
}
