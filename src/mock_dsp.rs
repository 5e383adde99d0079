use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::post, serve, Json, Router};
use rand::Rng;
use tokio::net::TcpListener;
use tokio::time::{sleep, Duration};
use tracing::info;
use uuid::Uuid;

use pulsepoint_adapter::openrtb::request::{BidRequest, Imp};
use pulsepoint_adapter::openrtb::response::{Bid, BidResponse, SeatBid};

/// 模拟 PulsePoint 竞价响应
/// 每个 imp 返回一个随机出价；banner 返回 HTML，video 返回 VAST。没有 imp 时返回 204。
async fn handle_partner_bid(Json(request): Json<BidRequest>) -> Response {
    info!(
        "Mock PulsePoint received BidRequest: id={}, imp_count={}",
        request.id,
        request.imp.len()
    );

    // 模拟合作方处理延迟（10 ~ 50 毫秒），不超过 tmax
    let delay_ms = rand::thread_rng().gen_range(10..50).min(request.tmax.unwrap_or(u64::MAX));
    sleep(Duration::from_millis(delay_ms)).await;

    let response = mock_bid_response(&request, &mut rand::thread_rng());
    if response.seatbid.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(response).into_response()
}

pub fn mock_bid_response(request: &BidRequest, rng: &mut impl Rng) -> BidResponse {
    let bids: Vec<Bid> = request.imp.iter().map(|imp| mock_bid(imp, &mut *rng)).collect();
    if bids.is_empty() {
        return BidResponse {
            id: request.id.clone(),
            nbr: Some(2),
            ..Default::default()
        };
    }

    BidResponse {
        id: request.id.clone(),
        seatbid: vec![SeatBid {
            bid: bids,
            seat: Some("pulsepoint".to_string()),
        }],
        cur: Some("USD".to_string()),
        ..Default::default()
    }
}

fn mock_bid(imp: &Imp, rng: &mut impl Rng) -> Bid {
    let bid_id = format!("bid-{}", Uuid::new_v4());
    let bidfloor = imp.bidfloor.unwrap_or(0.5);

    let (price, adm, w, h) = if let Some(video) = &imp.video {
        // 视频广告出价更高
        let adm = format!(
            r#"<VAST version="3.0"><Ad id="{bid_id}"><InLine><AdSystem>Mock PulsePoint</AdSystem><Impression><![CDATA[http://pp-tracker.local/impression?bid={bid_id}]]></Impression></InLine></Ad></VAST>"#,
            bid_id = bid_id
        );
        (bidfloor * rng.gen_range(1.0..2.5), adm, video.w, video.h)
    } else {
        let banner = imp.banner.clone().unwrap_or_default();
        let adm = format!(
            "<html><body>Mock PulsePoint Banner<img src=\"http://pp-tracker.local/impression?bid={bid_id}\" style=\"display:none;\" /></body></html>",
            bid_id = bid_id
        );
        (bidfloor * rng.gen_range(1.0..3.0), adm, banner.w, banner.h)
    };

    Bid {
        id: bid_id,
        impid: imp.id.clone(),
        price,
        adm: Some(adm),
        crid: Some(format!("crid-{}", imp.tagid.as_deref().unwrap_or("0"))),
        w,
        h,
        adomain: vec!["advertiser.example".to_string()],
        ..Default::default()
    }
}

/// 启动 Mock PulsePoint 服务，路由为 `/bid`
pub async fn start_mock_dsp_server(port: u16) -> std::io::Result<()> {
    let app = Router::new().route("/bid", post(handle_partner_bid));

    let addr = format!("0.0.0.0:{}", port);
    info!("Mock PulsePoint running at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    serve(listener, app).await
}
