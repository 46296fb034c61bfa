//! Dashboard API Routes
//!
//! - GET  /health
//! - GET  /api/v1/satellites                    satellite catalog
//! - GET  /api/v1/frame                         current frame
//! - GET  /api/v1/windows/:feed/:resolution     raw window snapshot
//! - POST /api/v1/events                        apply a UI event
//! - POST /api/v1/tick                          manual advance
//! - GET  /api/v1/stream                        WebSocket, one frame per tick

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use telemetry_core::{
    DashboardFrame, Feed, Resolution, SatelliteId, SatelliteInfo, UiEvent, WindowSnapshot,
};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::scheduler::AppState;

// ============================================================================
// Route Handlers
// ============================================================================

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let tick = state.engine.lock().await.tick();
    Json(serde_json::json!({
        "status": "healthy",
        "service": "telemetry-gateway",
        "tick": tick,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn list_satellites() -> Json<Vec<SatelliteInfo>> {
    Json(SatelliteId::ALL.iter().map(|s| s.info()).collect())
}

pub async fn get_frame(State(state): State<AppState>) -> Json<DashboardFrame> {
    Json(state.frame().await)
}

/// GET /windows/:feed/:resolution - feed is `default`, `h45-k1` or `l12-5`
pub async fn get_window(
    State(state): State<AppState>,
    Path((feed, resolution)): Path<(String, String)>,
) -> Result<Json<WindowSnapshot>, (StatusCode, String)> {
    let feed = parse_feed(&feed)
        .ok_or((StatusCode::NOT_FOUND, format!("Unknown feed: {}", feed)))?;
    let resolution: Resolution = resolution
        .parse()
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("{}", e)))?;

    let engine = state.engine.lock().await;
    Ok(Json(engine.snapshot(feed, resolution)))
}

/// POST /events - body is a `UiEvent` tagged by `type`
pub async fn post_event(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<DashboardFrame>, (StatusCode, String)> {
    let event: UiEvent = serde_json::from_value(body)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid event: {}", e)))?;
    Ok(Json(state.apply(event).await))
}

pub async fn post_tick(State(state): State<AppState>) -> Json<DashboardFrame> {
    Json(state.advance().await)
}

pub async fn stream(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_stream(socket, state))
}

fn parse_feed(key: &str) -> Option<Feed> {
    if key.eq_ignore_ascii_case(Feed::Default.key()) {
        return Some(Feed::Default);
    }
    SatelliteId::from_key(key).map(Feed::from)
}

// ============================================================================
// Frame Stream
// ============================================================================

async fn handle_stream(socket: WebSocket, state: AppState) {
    info!("Frame stream client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut frames = state.subscribe();

    // Current frame first so clients don't wait a full tick
    let initial = state.frame().await;
    if send_frame(&mut sender, &initial).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(frame) => {
                    if send_frame(&mut sender, &frame).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Frame stream lagged, skipped {} frame(s)", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | None => {
                    info!("Frame stream closed by client");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
            },
        }
    }
}

async fn send_frame(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    frame: &DashboardFrame,
) -> Result<(), ()> {
    let json = serde_json::to_string(frame).map_err(|e| {
        error!("Failed to serialize frame {}: {}", frame.tick, e);
    })?;
    sender.send(Message::Text(json)).await.map_err(|e| {
        error!("Failed to send frame {}: {}", frame.tick, e);
    })
}

// ========== Router ==========

pub fn dashboard_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/satellites", get(list_satellites))
        .route("/frame", get(get_frame))
        .route("/windows/:feed/:resolution", get(get_window))
        .route("/events", post(post_event))
        .route("/tick", post(post_tick))
        .route("/stream", get(stream));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::sync::Arc;
    use telemetry_core::synthetic::{generate_trace_set, SyntheticConfig};
    use telemetry_core::{DashboardEngine, Metric, YAxisDomain, WINDOW_CAPACITY};
    use tower::ServiceExt;

    fn app() -> Router {
        let traces = generate_trace_set(&SyntheticConfig::default()).unwrap();
        let engine = DashboardEngine::new(Arc::new(traces)).unwrap();
        dashboard_routes(AppState::new(engine))
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, json: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["tick"], 0);
    }

    #[tokio::test]
    async fn test_satellites() {
        let (status, body) = send(&app(), get_req("/api/v1/satellites")).await;
        assert_eq!(status, StatusCode::OK);
        let sats: Vec<SatelliteInfo> = serde_json::from_slice(&body).unwrap();
        assert_eq!(sats.len(), 2);
        assert_eq!(sats[0].key, "h45-k1");
        assert_eq!(sats[1].key, "l12-5");
    }

    #[tokio::test]
    async fn test_initial_frame() {
        let (status, body) = send(&app(), get_req("/api/v1/frame")).await;
        assert_eq!(status, StatusCode::OK);
        let frame: DashboardFrame = serde_json::from_slice(&body).unwrap();
        assert_eq!(frame.tick, 0);
        assert!(frame.descriptor.active_metric.is_none());
        assert_eq!(frame.feed, Feed::Default);
    }

    #[tokio::test]
    async fn test_fuel_selection_flow() {
        let app = app();
        send(
            &app,
            post_json("/api/v1/events", r#"{"type":"satellite_selected","satellite":"l12-5"}"#),
        )
        .await;
        send(&app, Request::post("/api/v1/tick").body(Body::empty()).unwrap()).await;

        let (status, body) = send(
            &app,
            post_json("/api/v1/events", r#"{"type":"click_counters","counters":{"fuel":1}}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let frame: DashboardFrame = serde_json::from_slice(&body).unwrap();
        assert_eq!(frame.tick, 1);
        assert_eq!(frame.descriptor.active_metric, Some(Metric::Fuel));
        assert_eq!(frame.descriptor.title, "Fuel Histogram");
        assert_eq!(frame.descriptor.y_axis, YAxisDomain::Auto);
    }

    #[tokio::test]
    async fn test_unknown_metric_is_bad_request() {
        let (status, _) = send(
            &app(),
            post_json("/api/v1/events", r#"{"type":"metric_selected","metric":"altitude"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_window_snapshot() {
        let app = app();
        let (status, body) = send(&app, get_req("/api/v1/windows/h45-k1/hour")).await;
        assert_eq!(status, StatusCode::OK);
        let snap: WindowSnapshot = serde_json::from_slice(&body).unwrap();
        assert_eq!(snap.feed, Feed::H45K1);
        assert_eq!(snap.resolution, Resolution::Hour);
        assert_eq!(snap.series.len(), 7);
        assert!(snap.series.values().all(|s| s.len() == WINDOW_CAPACITY));
    }

    #[tokio::test]
    async fn test_window_bad_path() {
        let app = app();
        let (status, _) = send(&app, get_req("/api/v1/windows/voyager/minute")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, get_req("/api/v1/windows/default/decade")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
