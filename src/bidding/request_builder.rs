// src/bidding/request_builder.rs

use tracing::{debug, warn};

use crate::bidding::params::{self, PartnerParams};
use crate::error::{AdapterError, ParamsError};
use crate::model::ad_unit::{AdUnitBid, MediaType};
use crate::model::context::PreBidRequestContext;
use crate::openrtb::request::{App, Banner, BidRequest, Imp, Publisher, Site, Video};

/// PulsePoint 支持的广告类型，顺序即 imp 的生成顺序
pub const ALLOWED_MEDIA_TYPES: [MediaType; 2] = [MediaType::Banner, MediaType::Video];

/// 一价竞价
const FIRST_PRICE_AUCTION: i32 = 1;

/// 广告位与其校验通过的参数，只在一次调用内存在
#[derive(Debug, Clone)]
pub struct AdUnitBidWithParams<'a> {
    pub ad_unit_bid: &'a AdUnitBid,
    pub params: PartnerParams,
}

/// imp 上的广告类型子对象
#[derive(Debug, Clone, PartialEq)]
enum ImpMedia {
    Banner(Banner),
    Video(Video),
}

/// 第一遍：先检查全部广告位的广告类型，再校验全部参数。
/// 任一失败则整个调用失败，不会产生部分请求。
pub fn validate_all(ad_unit_bids: &[AdUnitBid]) -> Result<Vec<AdUnitBidWithParams<'_>>, AdapterError> {
    ad_unit_bids.iter().try_for_each(validate_media_types)?;

    let bids_with_params = ad_unit_bids
        .iter()
        .map(|ad_unit_bid| {
            params::parse_and_validate(ad_unit_bid)
                .map(|params| AdUnitBidWithParams { ad_unit_bid, params })
                .map_err(|err| {
                    warn!(
                        ad_unit_code = %ad_unit_bid.ad_unit_code,
                        error = %err,
                        "rejecting pulsepoint params"
                    );
                    err
                })
        })
        .collect::<Result<Vec<_>, ParamsError>>()?;
    Ok(bids_with_params)
}

/// 声明 video 的广告位必须带有非空 mimes 的视频参数
fn validate_media_types(ad_unit_bid: &AdUnitBid) -> Result<(), AdapterError> {
    let has_video_data = ad_unit_bid
        .video
        .as_ref()
        .is_some_and(|video| !video.mimes.is_empty());
    if ad_unit_bid.media_types.contains(&MediaType::Video) && !has_video_data {
        warn!(ad_unit_code = %ad_unit_bid.ad_unit_code, "video media type with no video data");
        return Err(AdapterError::VideoWithoutData {
            ad_unit_code: ad_unit_bid.ad_unit_code.clone(),
        });
    }
    Ok(())
}

/// 第二遍：由已校验的广告位构造唯一的出站 BidRequest
pub fn build_bid_request(
    bids_with_params: &[AdUnitBidWithParams<'_>],
    context: &PreBidRequestContext,
) -> Result<BidRequest, AdapterError> {
    let imps = make_imps(bids_with_params, context);
    if imps.is_empty() {
        return Err(AdapterError::NoValidImpressions);
    }

    let publisher = make_publisher(bids_with_params);
    let (app, site) = attach_publisher(context, publisher);

    Ok(BidRequest {
        id: context.tid.clone(),
        imp: imps,
        app,
        site,
        device: context.device.clone(),
        user: context.user.clone(),
        source: context.source.clone(),
        at: Some(FIRST_PRICE_AUCTION),
        tmax: context.timeout_millis,
        ..Default::default()
    })
}

/// 声明的广告类型与支持集合求交，按支持集合的顺序去重返回
pub fn allowed_media_types(ad_unit_bid: &AdUnitBid) -> Vec<MediaType> {
    let allowed: Vec<MediaType> = ALLOWED_MEDIA_TYPES
        .iter()
        .copied()
        .filter(|media_type| ad_unit_bid.media_types.contains(media_type))
        .collect();

    let dropped: Vec<&MediaType> = ad_unit_bid
        .media_types
        .iter()
        .filter(|media_type| !ALLOWED_MEDIA_TYPES.contains(media_type))
        .collect();
    if !dropped.is_empty() {
        debug!(
            ad_unit_code = %ad_unit_bid.ad_unit_code,
            dropped = ?dropped,
            "skipping media types pulsepoint does not serve"
        );
    }

    allowed
}

fn make_imps(bids_with_params: &[AdUnitBidWithParams<'_>], context: &PreBidRequestContext) -> Vec<Imp> {
    bids_with_params
        .iter()
        .flat_map(|bid_with_params| {
            let ad_unit_bid = bid_with_params.ad_unit_bid;
            let params = &bid_with_params.params;
            allowed_media_types(ad_unit_bid)
                .into_iter()
                .filter_map(move |media_type| imp_media(media_type, ad_unit_bid, params))
                .map(move |media| make_imp(media, ad_unit_bid, params, context))
        })
        .collect()
}

fn imp_media(media_type: MediaType, ad_unit_bid: &AdUnitBid, params: &PartnerParams) -> Option<ImpMedia> {
    match media_type {
        MediaType::Banner => Some(ImpMedia::Banner(make_banner(ad_unit_bid, params))),
        MediaType::Video => make_video(ad_unit_bid).map(ImpMedia::Video),
        // 不支持的类型不贡献 imp
        MediaType::Native | MediaType::Audio => None,
    }
}

fn make_imp(media: ImpMedia, ad_unit_bid: &AdUnitBid, params: &PartnerParams, context: &PreBidRequestContext) -> Imp {
    let (banner, video) = match media {
        ImpMedia::Banner(banner) => (Some(banner), None),
        ImpMedia::Video(video) => (None, Some(video)),
    };
    Imp {
        id: ad_unit_bid.ad_unit_code.clone(),
        banner,
        video,
        instl: ad_unit_bid.instl,
        tagid: Some(params.tag_id.clone()),
        secure: context.secure,
        ..Default::default()
    }
}

/// banner 的宽高取自 PulsePoint 的 cf 参数，format 保留广告位声明的全部尺寸
fn make_banner(ad_unit_bid: &AdUnitBid, params: &PartnerParams) -> Banner {
    Banner {
        w: Some(params.ad_size_width),
        h: Some(params.ad_size_height),
        format: ad_unit_bid.sizes.clone(),
        topframe: ad_unit_bid.topframe,
    }
}

/// video 参数原样透传，宽高取广告位的第一个尺寸。
/// 缺少视频参数的广告位已在校验阶段被拒绝。
fn make_video(ad_unit_bid: &AdUnitBid) -> Option<Video> {
    let video = ad_unit_bid.video.as_ref()?;
    let size = ad_unit_bid.sizes.first();
    Some(Video {
        mimes: video.mimes.clone(),
        minduration: video.minduration,
        maxduration: video.maxduration,
        w: size.map(|format| format.w),
        h: size.map(|format| format.h),
        startdelay: video.startdelay,
        playbackmethod: video.playback_method.into_iter().collect(),
        protocols: video.protocols.clone(),
    })
}

/// 取最后一个广告位的 publisher id。
/// 同一调用混入不同 publisher 时后者覆盖前者，该行为是否有意尚未确认。
fn make_publisher(bids_with_params: &[AdUnitBidWithParams<'_>]) -> Publisher {
    Publisher {
        id: bids_with_params
            .last()
            .map(|bid_with_params| bid_with_params.params.publisher_id.clone()),
        ..Default::default()
    }
}

/// publisher 只挂到 app 或 site 之一，app 优先
fn attach_publisher(context: &PreBidRequestContext, publisher: Publisher) -> (Option<App>, Option<Site>) {
    match (&context.app, &context.site) {
        (Some(app), site) => {
            if site.is_some() {
                debug!(tid = %context.tid, "context carries both app and site, site is dropped");
            }
            let app = App {
                publisher: Some(publisher),
                ..app.clone()
            };
            (Some(app), None)
        }
        (None, Some(site)) => {
            let site = Site {
                publisher: Some(publisher),
                ..site.clone()
            };
            (None, Some(site))
        }
        (None, None) => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ad_unit::VideoParams;
    use crate::openrtb::request::{Device, Format, Source, User};
    use proptest::prelude::*;
    use serde_json::json;

    fn ad_unit_bid(code: &str, cp: i64, media_types: Vec<MediaType>) -> AdUnitBid {
        AdUnitBid {
            bidder_code: "pulsepoint".to_string(),
            bid_id: format!("bid-{}", code),
            ad_unit_code: code.to_string(),
            sizes: vec![Format { w: 640, h: 480 }, Format { w: 300, h: 250 }],
            media_types,
            video: Some(VideoParams {
                mimes: vec!["video/mp4".to_string()],
                ..Default::default()
            }),
            params: Some(json!({"cp": cp, "ct": 77, "cf": "300x250"})),
            ..Default::default()
        }
    }

    fn site_context() -> PreBidRequestContext {
        PreBidRequestContext {
            tid: "tid-1".to_string(),
            timeout_millis: Some(500),
            secure: Some(1),
            site: Some(Site {
                domain: Some("example.com".to_string()),
                ..Default::default()
            }),
            device: Some(Device {
                ua: Some("test-agent".to_string()),
                ..Default::default()
            }),
            user: Some(User {
                buyeruid: Some("buyer-1".to_string()),
                ..Default::default()
            }),
            source: Some(Source {
                tid: Some("tid-1".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn build(bids: &[AdUnitBid], context: &PreBidRequestContext) -> Result<BidRequest, AdapterError> {
        let with_params = validate_all(bids)?;
        build_bid_request(&with_params, context)
    }

    #[test]
    fn builds_one_imp_per_allowed_media_type() {
        let bids = vec![
            ad_unit_bid("slot1", 111, vec![MediaType::Video, MediaType::Banner, MediaType::Native]),
            ad_unit_bid("slot2", 111, vec![MediaType::Banner]),
        ];
        let request = build(&bids, &site_context()).unwrap();

        assert_eq!(request.id, "tid-1");
        assert_eq!(request.at, Some(1));
        assert_eq!(request.tmax, Some(500));
        assert_eq!(request.imp.len(), 3);

        // 同一广告位内 banner 先于 video
        assert_eq!(request.imp[0].id, "slot1");
        assert!(request.imp[0].banner.is_some() && request.imp[0].video.is_none());
        assert_eq!(request.imp[1].id, "slot1");
        assert!(request.imp[1].video.is_some() && request.imp[1].banner.is_none());
        assert_eq!(request.imp[2].id, "slot2");

        for imp in &request.imp {
            assert_eq!(imp.tagid.as_deref(), Some("77"));
            assert_eq!(imp.secure, Some(1));
        }
    }

    #[test]
    fn banner_size_comes_from_partner_params() {
        let request = build(&[ad_unit_bid("slot1", 1, vec![MediaType::Banner])], &site_context()).unwrap();
        let banner = request.imp[0].banner.as_ref().unwrap();
        assert_eq!((banner.w, banner.h), (Some(300), Some(250)));
        assert_eq!(banner.format.len(), 2);
    }

    #[test]
    fn video_params_pass_through_unchanged() {
        let mut bid = ad_unit_bid("slot1", 1, vec![MediaType::Video]);
        bid.instl = Some(1);
        bid.video = Some(VideoParams {
            mimes: vec!["video/mp4".to_string()],
            minduration: Some(5),
            maxduration: Some(30),
            startdelay: Some(0),
            playback_method: Some(2),
            protocols: vec![2, 3],
        });

        let request = build(&[bid], &site_context()).unwrap();
        let imp = &request.imp[0];
        assert_eq!(imp.instl, Some(1));
        assert_eq!(
            imp.video,
            Some(Video {
                mimes: vec!["video/mp4".to_string()],
                minduration: Some(5),
                maxduration: Some(30),
                w: Some(640),
                h: Some(480),
                startdelay: Some(0),
                playbackmethod: vec![2],
                protocols: vec![2, 3],
            })
        );
    }

    #[test]
    fn one_invalid_ad_unit_fails_the_whole_call() {
        let mut broken = ad_unit_bid("slot2", 1, vec![MediaType::Banner]);
        broken.params = Some(json!({"cp": 1, "cf": "300x250"}));
        let bids = vec![ad_unit_bid("slot1", 1, vec![MediaType::Banner]), broken];

        let err = build(&bids, &site_context()).unwrap_err();
        assert!(matches!(err, AdapterError::Params(ParamsError::MissingTagId)));
        assert_eq!(err.to_string(), "missing tag id");
    }

    #[test]
    fn video_ad_unit_without_video_data_fails_the_whole_call() {
        let mut no_video = ad_unit_bid("slot2", 1, vec![MediaType::Video]);
        no_video.video = None;
        let bids = vec![ad_unit_bid("slot1", 1, vec![MediaType::Banner]), no_video];

        let err = build(&bids, &site_context()).unwrap_err();
        assert!(matches!(err, AdapterError::VideoWithoutData { ref ad_unit_code } if ad_unit_code == "slot2"));
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);

        let mut empty_mimes = ad_unit_bid("slot1", 1, vec![MediaType::Banner, MediaType::Video]);
        empty_mimes.video = Some(VideoParams::default());
        assert!(matches!(
            build(&[empty_mimes], &site_context()),
            Err(AdapterError::VideoWithoutData { .. })
        ));
    }

    #[test]
    fn media_check_runs_before_params_check() {
        let mut no_video = ad_unit_bid("slot2", 1, vec![MediaType::Video]);
        no_video.video = None;
        let mut no_params = ad_unit_bid("slot1", 1, vec![MediaType::Banner]);
        no_params.params = None;

        let err = build(&[no_params, no_video], &site_context()).unwrap_err();
        assert!(matches!(err, AdapterError::VideoWithoutData { .. }));
    }

    #[test]
    fn banner_only_ad_unit_needs_no_video_data() {
        let mut banner = ad_unit_bid("slot1", 1, vec![MediaType::Banner]);
        banner.video = None;
        assert_eq!(build(&[banner], &site_context()).unwrap().imp.len(), 1);
    }

    #[test]
    fn ad_unit_without_supported_media_contributes_nothing() {
        let bids = vec![
            ad_unit_bid("slot1", 1, vec![MediaType::Native]),
            ad_unit_bid("slot2", 1, vec![MediaType::Banner]),
        ];
        let request = build(&bids, &site_context()).unwrap();
        assert_eq!(request.imp.len(), 1);
        assert_eq!(request.imp[0].id, "slot2");
    }

    #[test]
    fn no_supported_media_at_all_is_an_empty_request() {
        let bids = vec![ad_unit_bid("slot1", 1, vec![MediaType::Audio, MediaType::Native])];
        let err = build(&bids, &site_context()).unwrap_err();
        assert!(matches!(err, AdapterError::NoValidImpressions));
        assert_eq!(err.to_string(), "no valid impressions");

        assert!(matches!(build(&[], &site_context()), Err(AdapterError::NoValidImpressions)));
    }

    #[test]
    fn last_ad_unit_publisher_wins() {
        let bids = vec![
            ad_unit_bid("slotA", 111, vec![MediaType::Banner]),
            ad_unit_bid("slotB", 222, vec![MediaType::Banner]),
        ];
        let request = build(&bids, &site_context()).unwrap();
        let site = request.site.unwrap();
        assert_eq!(site.domain.as_deref(), Some("example.com"));
        assert_eq!(site.publisher.unwrap().id.as_deref(), Some("222"));
        assert!(request.app.is_none());
    }

    #[test]
    fn app_takes_precedence_over_site() {
        let mut context = site_context();
        context.app = Some(App {
            bundle: Some("com.example.app".to_string()),
            ..Default::default()
        });

        let request = build(&[ad_unit_bid("slot1", 9, vec![MediaType::Banner])], &context).unwrap();
        assert!(request.site.is_none());
        let app = request.app.unwrap();
        assert_eq!(app.bundle.as_deref(), Some("com.example.app"));
        assert_eq!(app.publisher.unwrap().id.as_deref(), Some("9"));
    }

    #[test]
    fn context_objects_pass_through() {
        let context = site_context();
        let request = build(&[ad_unit_bid("slot1", 1, vec![MediaType::Banner])], &context).unwrap();
        assert_eq!(request.device, context.device);
        assert_eq!(request.user, context.user);
        assert_eq!(request.source, context.source);
    }

    #[test]
    fn neither_app_nor_site_leaves_both_empty() {
        let mut context = site_context();
        context.site = None;
        let request = build(&[ad_unit_bid("slot1", 1, vec![MediaType::Banner])], &context).unwrap();
        assert!(request.site.is_none() && request.app.is_none());
    }

    fn media_subset() -> impl Strategy<Value = Vec<MediaType>> {
        proptest::sample::subsequence(
            vec![MediaType::Banner, MediaType::Video, MediaType::Native, MediaType::Audio],
            1..=4,
        )
    }

    proptest! {
        #[test]
        fn imp_count_matches_allowed_media_intersection(declared in proptest::collection::vec(media_subset(), 1..6)) {
            let bids: Vec<AdUnitBid> = declared
                .iter()
                .enumerate()
                .map(|(i, media_types)| ad_unit_bid(&format!("slot{}", i), 1, media_types.clone()))
                .collect();
            let expected: usize = declared
                .iter()
                .map(|media_types| media_types.iter().filter(|t| ALLOWED_MEDIA_TYPES.contains(t)).count())
                .sum();

            match build(&bids, &site_context()) {
                Ok(request) => prop_assert_eq!(request.imp.len(), expected),
                Err(err) => {
                    prop_assert_eq!(expected, 0);
                    prop_assert!(matches!(err, AdapterError::NoValidImpressions));
                }
            }
        }
    }
}
