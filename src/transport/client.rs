//! Client side of the `/geopose` endpoint

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use thiserror::Error;

use super::version::ACCEPT_HEADER_VALUE;
use crate::protocol::{decode_response, encode_request, DecodeError, GeoPoseRequest, GeoPoseResponse};

/// Failures of a client exchange
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be serialized.
    #[error("cannot encode request: {0}")]
    Encode(#[source] serde_json::Error),
    /// The HTTP exchange itself failed.
    #[error("transport failure: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered but the payload did not decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The server rejected the request with an error body.
    #[error("server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// HTTP client for a GeoPose endpoint
pub struct GeoPoseClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeoPoseClient {
    /// Client for the endpoint at `base_url`, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/geopose", self.base_url)
    }

    /// Probe the endpoint and return the reported status string.
    pub async fn status(&self) -> Result<String, ClientError> {
        let value: serde_json::Value = self
            .http
            .get(self.endpoint())
            .send()
            .await?
            .json()
            .await?;
        let status = value
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or_default();
        Ok(status.to_string())
    }

    /// Run one localization exchange.
    pub async fn localize(&self, request: &GeoPoseRequest) -> Result<GeoPoseResponse, ClientError> {
        let body = encode_request(request).map_err(ClientError::Encode)?;
        let response = self
            .http
            .post(self.endpoint())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, ACCEPT_HEADER_VALUE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message: extract_error_message(&text).unwrap_or(text),
            });
        }
        Ok(decode_response(&text)?)
    }
}

// Rejection bodies carry {"error": "..."}; anything else is passed through raw.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|message| message.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GeoPose, GeoPoseAccuracy, Position, Quaternion};
    use crate::protocol::{CameraReading, ImageFormat, Reading, Sensor, SensorReading, SensorType};
    use crate::transport::server::{router, EndpointState, StaticPoseProvider};
    use std::sync::Arc;

    const JPEG_HEADER: [u8; 6] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

    fn camera_request() -> GeoPoseRequest {
        let frame = CameraReading {
            sequence_number: 0,
            image_format: ImageFormat::Jpg,
            size: [640, 480],
            image_bytes: JPEG_HEADER.to_vec(),
            image_orientation: None,
            params: None,
        };
        GeoPoseRequest::new()
            .with_sensor(Sensor::new(SensorType::Camera, "cam0"))
            .with_reading(SensorReading::new("cam0", Reading::Camera(frame)))
    }

    async fn spawn_endpoint() -> String {
        let pose = GeoPose::new(Position::new(47.4979, 19.0402, 120.0), Quaternion::identity());
        let provider = StaticPoseProvider::new(pose, GeoPoseAccuracy::new(2.5, 5.0));
        let state = EndpointState::new(Arc::new(provider), true);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = GeoPoseClient::new("http://localhost:8080/");
        assert_eq!(client.endpoint(), "http://localhost:8080/geopose");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            extract_error_message("{\"error\": \"boom\"}"),
            Some("boom".to_string())
        );
        assert_eq!(extract_error_message("plain text"), None);
        assert_eq!(extract_error_message("{\"status\": \"running\"}"), None);
    }

    #[tokio::test]
    async fn test_exchange_against_local_endpoint() {
        let base_url = spawn_endpoint().await;
        let client = GeoPoseClient::new(base_url);

        assert_eq!(client.status().await.unwrap(), "running");

        let request = camera_request();
        let response = client.localize(&request).await.unwrap();
        assert_eq!(response.id, request.id);
        assert_eq!(response.timestamp, request.timestamp);
        assert_eq!(response.geopose.position.lat, 47.4979);
        assert_eq!(response.accuracy.position, 2.5);
    }

    #[tokio::test]
    async fn test_rejection_surfaces_server_message() {
        let base_url = spawn_endpoint().await;
        let client = GeoPoseClient::new(base_url);

        let request = GeoPoseRequest::new();
        let err = client.localize(&request).await.unwrap_err();
        match err {
            ClientError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "request has no camera readings");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
