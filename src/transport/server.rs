//! Server side of the `/geopose` endpoint
//!
//! GET answers a liveness probe, POST runs one localization exchange:
//! version gate, decode, validation, pose computation, response. The
//! actual pose computation sits behind [`PoseProvider`] so a visual
//! positioning backend can replace the configured stub.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use super::version::verify_accept;
use crate::core::{GeoPose, GeoPoseAccuracy};
use crate::protocol::{
    decode_request, encode_response, redacted_request_json, GeoPoseRequest, GeoPoseResponse,
};
use crate::utils::ServerConfig;
use crate::validation::validate_request;

/// Failure reported by a positioning backend
#[derive(Debug, Clone, PartialEq, Error)]
#[error("positioning failed: {reason}")]
pub struct PoseError {
    pub reason: String,
}

impl PoseError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Pose and accuracy produced for one request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseEstimate {
    pub geopose: GeoPose,
    pub accuracy: GeoPoseAccuracy,
}

/// Positioning backend behind the POST handler
pub trait PoseProvider: Send + Sync {
    /// Compute a pose for a decoded, validated request.
    fn locate(&self, request: &GeoPoseRequest) -> Result<PoseEstimate, PoseError>;
}

/// Backend answering every request with one fixed pose
pub struct StaticPoseProvider {
    estimate: PoseEstimate,
}

impl StaticPoseProvider {
    pub fn new(geopose: GeoPose, accuracy: GeoPoseAccuracy) -> Self {
        Self {
            estimate: PoseEstimate { geopose, accuracy },
        }
    }

    /// Backend serving the pose a config file carries.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.geopose, config.accuracy)
    }
}

impl PoseProvider for StaticPoseProvider {
    fn locate(&self, _request: &GeoPoseRequest) -> Result<PoseEstimate, PoseError> {
        Ok(self.estimate)
    }
}

/// State shared by the endpoint handlers
#[derive(Clone)]
pub struct EndpointState {
    provider: Arc<dyn PoseProvider>,
    require_version_header: bool,
}

impl EndpointState {
    pub fn new(provider: Arc<dyn PoseProvider>, require_version_header: bool) -> Self {
        Self {
            provider,
            require_version_header,
        }
    }

    /// State serving a config file through a [`StaticPoseProvider`].
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            Arc::new(StaticPoseProvider::from_config(config)),
            config.require_version_header,
        )
    }
}

/// Router serving GET and POST on `/geopose`.
pub fn router(state: EndpointState) -> Router {
    Router::new()
        .route("/geopose", get(status).post(localize))
        .with_state(state)
}

async fn status() -> Json<serde_json::Value> {
    Json(json!({ "status": "running" }))
}

async fn localize(
    State(state): State<EndpointState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    match handle_localize(&state, &headers, &body) {
        Ok(payload) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            payload,
        )
            .into_response(),
        Err(message) => {
            warn!("rejecting localization request: {message}");
            (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
        }
    }
}

// Every rejection becomes a 400 with the reason in the body; the protocol
// defines no other failure status.
fn handle_localize(
    state: &EndpointState,
    headers: &HeaderMap,
    body: &str,
) -> Result<String, String> {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok());
    verify_accept(accept, state.require_version_header).map_err(|e| e.to_string())?;

    let request = decode_request(body).map_err(|e| e.to_string())?;
    debug!(
        "localization request: {}",
        redacted_request_json(&request)
    );
    validate_request(&request).map_err(|e| e.to_string())?;

    let frame = request
        .camera_readings()
        .next()
        .ok_or_else(|| "request has no camera readings".to_string())?;
    if frame.image_bytes.is_empty() {
        return Err("request has no image".to_string());
    }

    let estimate = state.provider.locate(&request).map_err(|e| e.to_string())?;
    let response = GeoPoseResponse::new(request.id.clone(), request.timestamp, estimate.geopose)
        .with_accuracy(estimate.accuracy);
    let payload = encode_response(&response).map_err(|e| e.to_string())?;
    debug!("localization response: {payload}");
    Ok(payload)
}
