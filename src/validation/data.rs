//! Structural checks applied to decoded requests before positioning runs
//!
//! The codec only guarantees schema validity; the cross-references between
//! readings and the sensor inventory are checked here. The server rejects a
//! request that fails any of these with a 400, it never crashes on one.

use std::collections::HashSet;

use thiserror::Error;

use crate::core::{Position, Quaternion};
use crate::protocol::types::GeoPoseRequest;

/// Allowed deviation of an orientation quaternion norm from 1
pub const QUATERNION_NORM_TOLERANCE: f64 = 1e-6;

/// Violations of the request structure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A reading references a sensor id that was never declared
    #[error("reading references undeclared sensor '{sensor_id}'")]
    UnknownSensorId { sensor_id: String },
    /// Two sensors share the same id
    #[error("duplicate sensor id '{sensor_id}'")]
    DuplicateSensorId { sensor_id: String },
    /// Readings are present but the sensor inventory is empty
    #[error("{reading_count} readings but no sensors declared")]
    NoSensors { reading_count: usize },
    /// Latitude outside [-90, 90] degrees
    #[error("latitude {lat} out of range")]
    LatitudeOutOfRange { lat: f64 },
    /// Longitude outside [-180, 180] degrees
    #[error("longitude {lon} out of range")]
    LongitudeOutOfRange { lon: f64 },
    /// Orientation quaternion is not unit length
    #[error("quaternion norm {norm} is not unit length")]
    NonUnitQuaternion { norm: f64 },
}

/// Check every reading against the declared sensor inventory.
///
/// Sensor ids must be unique and every `sensorId` must resolve. A request
/// with no readings passes regardless of its inventory.
pub fn validate_request(request: &GeoPoseRequest) -> Result<(), ValidationError> {
    let mut ids = HashSet::new();
    for sensor in &request.sensors {
        if !ids.insert(sensor.id.as_str()) {
            return Err(ValidationError::DuplicateSensorId { sensor_id: sensor.id.clone() });
        }
    }

    if !request.sensor_readings.is_empty() && ids.is_empty() {
        return Err(ValidationError::NoSensors { reading_count: request.sensor_readings.len() });
    }

    for reading in &request.sensor_readings {
        if !ids.contains(reading.sensor_id.as_str()) {
            return Err(ValidationError::UnknownSensorId {
                sensor_id: reading.sensor_id.clone(),
            });
        }
    }

    Ok(())
}

/// Range-check a geodetic position.
pub fn validate_position(position: &Position) -> Result<(), ValidationError> {
    if !position.lat.is_finite() || position.lat < -90.0 || position.lat > 90.0 {
        return Err(ValidationError::LatitudeOutOfRange { lat: position.lat });
    }
    if !position.lon.is_finite() || position.lon < -180.0 || position.lon > 180.0 {
        return Err(ValidationError::LongitudeOutOfRange { lon: position.lon });
    }
    Ok(())
}

/// Check that an orientation quaternion has unit norm within
/// [`QUATERNION_NORM_TOLERANCE`].
pub fn validate_quaternion(quaternion: &Quaternion) -> Result<(), ValidationError> {
    let norm =
        nalgebra::Quaternion::new(quaternion.w, quaternion.x, quaternion.y, quaternion.z).norm();
    if !norm.is_finite() || (norm - 1.0).abs() > QUATERNION_NORM_TOLERANCE {
        return Err(ValidationError::NonUnitQuaternion { norm });
    }
    Ok(())
}
