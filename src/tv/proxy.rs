//! JointSpace pass-through.
//!
//! `/api/<tv-path>` is forwarded to `http://<host>:<port>/<tv-path>` with the
//! same method, a fixed JSON content type and (for POST) the same body.
//! Whatever the TV answers is mirrored; only transport failures are
//! rewritten, as HTTP 500 with `{"error": ...}`.

use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, Method, Request, Response, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde_json::json;
use tokio::time;

use crate::config::TvConfig;
use crate::observability::metrics;

/// Failures that never produced an upstream response.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("invalid upstream URI: {0}")]
    InvalidUri(#[from] axum::http::uri::InvalidUri),
    #[error("failed to build upstream request: {0}")]
    Request(#[from] axum::http::Error),
    #[error("failed to read request body: {0}")]
    RequestBody(#[source] axum::Error),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
    #[error("failed to read upstream body: {0}")]
    ResponseBody(#[source] axum::Error),
    #[error("upstream timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Upstream response, fully buffered.
#[derive(Debug)]
pub struct Upstream {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl IntoResponse for Upstream {
    fn into_response(self) -> axum::response::Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let content_type = if self.status.is_client_error() || self.status.is_server_error() {
            self.content_type
        } else {
            Some(HeaderValue::from_static("application/json"))
        };
        if let Some(value) = content_type {
            response.headers_mut().insert(header::CONTENT_TYPE, value);
        }
        response
    }
}

/// Client for one TV.
#[derive(Clone)]
pub struct TvProxy {
    client: Client<HttpConnector, Body>,
    base_url: String,
    timeout: Duration,
    max_body_bytes: usize,
}

impl TvProxy {
    pub fn new(config: &TvConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            client,
            base_url: config.base_url(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_body_bytes: config.max_body_bytes,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forward one request. `tv_path` keeps its query string.
    pub async fn forward(
        &self,
        method: Method,
        tv_path: &str,
        body: Body,
    ) -> Result<Upstream, ProxyError> {
        let start = Instant::now();
        let uri: Uri = format!("{}{}", self.base_url, tv_path).parse()?;

        let body = if method == Method::POST {
            let bytes = axum::body::to_bytes(body, self.max_body_bytes)
                .await
                .map_err(ProxyError::RequestBody)?;
            Body::from(bytes)
        } else {
            Body::empty()
        };

        let request = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)?;

        let result = time::timeout(self.timeout, self.exchange(request))
            .await
            .unwrap_or(Err(ProxyError::Timeout(self.timeout)));

        match &result {
            Ok(upstream) => {
                tracing::info!(
                    method = %method,
                    path = %tv_path,
                    status = %upstream.status,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "TV request proxied"
                );
                metrics::record_tv_request(method.as_str(), upstream.status.as_u16(), start);
            }
            Err(e) => {
                tracing::error!(method = %method, path = %tv_path, error = %e, "TV request failed");
                metrics::record_tv_request(method.as_str(), 500, start);
            }
        }
        result
    }

    async fn exchange(&self, request: Request<Body>) -> Result<Upstream, ProxyError> {
        let response = self.client.request(request).await?;
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), usize::MAX)
            .await
            .map_err(ProxyError::ResponseBody)?;

        Ok(Upstream {
            status: parts.status,
            content_type: parts.headers.get(header::CONTENT_TYPE).cloned(),
            body,
        })
    }
}
