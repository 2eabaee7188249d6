//! `/api` dispatch.
//!
//! Routing is by path prefix only: `/api/xbox/<op>` goes to the bridge,
//! every other `/api/<path>` is proxied to the TV.

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::config::validation::MAX_HOLD_TIME_MS;
use crate::http::server::AppState;

const XBOX_PREFIX: &str = "/api/xbox/";
const MAX_INPUT_BODY: usize = 64 * 1024;

/// Body of `POST /api/xbox/input`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InputRequest {
    pub key: String,
    pub hold_ms: Option<u64>,
}

impl InputRequest {
    /// Parse leniently: anything that is not a JSON object with the
    /// expected fields counts as `{}`.
    pub fn from_body(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::default();
        }
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    fn hold(&self) -> Option<Duration> {
        self.hold_ms
            .map(|ms| Duration::from_millis(ms.min(MAX_HOLD_TIME_MS)))
    }
}

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

pub async fn api_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let path = request.uri().path().to_string();

    if let Some(op) = path.strip_prefix(XBOX_PREFIX) {
        let (parts, body) = request.into_parts();
        return xbox_handler(&state, parts.method, op, body).await;
    }

    match *request.method() {
        Method::GET | Method::POST => {}
        _ => return not_found(),
    }

    let tv_path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(path.as_str())
        .strip_prefix("/api")
        .unwrap_or("/")
        .to_string();

    let (parts, body) = request.into_parts();
    match state.tv.forward(parts.method, &tv_path, body).await {
        Ok(upstream) => upstream.into_response(),
        Err(e) => e.into_response(),
    }
}

async fn xbox_handler(state: &AppState, method: Method, op: &str, body: Body) -> Response {
    tracing::debug!(method = %method, op = %op, "Xbox request");
    let bridge = &state.xbox;

    match (method, op) {
        (Method::GET, "status") => Json(bridge.status().await).into_response(),
        (Method::GET, "discover") => Json(bridge.discover().await).into_response(),
        (Method::GET | Method::POST, "wake") => Json(bridge.wake().await).into_response(),
        (Method::POST, "input") => {
            let bytes = axum::body::to_bytes(body, MAX_INPUT_BODY)
                .await
                .unwrap_or_default();
            let input = InputRequest::from_body(&bytes);
            Json(bridge.send_input(&input.key, input.hold()).await).into_response()
        }
        _ => not_found(),
    }
}
