//! Structural validation of decoded requests

pub mod data;

pub use data::{validate_position, validate_quaternion, validate_request, ValidationError};
