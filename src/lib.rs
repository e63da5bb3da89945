//! GeoPose Protocol
//!
//! An implementation of the OSCP GeoPose protocol for visual positioning:
//! typed request and response envelopes, the JSON wire codec, WGS84
//! coordinate transforms and an HTTP endpoint with a pluggable
//! positioning backend.

pub mod core;
pub mod geodesy;
pub mod protocol;
pub mod transport;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use core::{GeoPose, GeoPoseAccuracy, Position, Quaternion, Vector3};
pub use geodesy::{
    ecef_to_enu, ecef_to_geodetic, enu_to_ecef, enu_to_geodetic, geodetic_to_ecef, geodetic_to_enu,
};
pub use protocol::{
    decode_request, decode_response, encode_request, encode_response, CameraModel, CameraReading,
    DecodeError, GeoPoseRequest, GeoPoseResponse, ImageFormat, Reading, Sensor, SensorReading,
    SensorType,
};
pub use transport::{GeoPoseClient, PoseEstimate, PoseProvider, StaticPoseProvider};
pub use utils::{ConfigError, ServerConfig};
pub use validation::{validate_request, ValidationError};
