//! JSON wire codec for the protocol types
//!
//! The mapping is deterministic and lossless: encoding omits fields that
//! hold their "not provided" default (empty strings and lists, the UNKNOWN
//! camera model, an absent rig offset), and decoding treats the absent key
//! as exactly that default. Closed enum strings live in one bidirectional
//! table per enum; a string outside the table is a hard decode failure.
//! Sensor readings travel as a tagged envelope and are dispatched on the
//! `sensorType` tag before the payload is touched, because the inertial
//! payloads are field-identical. Camera frames travel as Base64 text.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{
    CameraModel, GeoPoseRequest, GeoPoseResponse, ImageFormat, Privacy, Reading, RigOffset,
    Sensor, SensorReading, SensorType,
};
use crate::core::{Quaternion, Vector3, IMAGE_REDACTION_PLACEHOLDER};

/// Errors produced while decoding protocol JSON
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body is not valid JSON or does not match the schema
    #[error("malformed protocol JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A closed enum received a string outside its table
    #[error("unknown {kind} value '{value}'")]
    UnknownEnum { kind: &'static str, value: String },
    /// A reading was tagged `unknown`, which cannot select a payload
    #[error("sensor reading cannot use the 'unknown' sensor type")]
    UnknownReadingTag,
}

impl SensorType {
    /// Wire spelling of this sensor type
    pub fn as_wire(&self) -> &'static str {
        match self {
            SensorType::Camera => "camera",
            SensorType::Geolocation => "geolocation",
            SensorType::Wifi => "wifi",
            SensorType::Bluetooth => "bluetooth",
            SensorType::Accelerometer => "accelerometer",
            SensorType::Gyroscope => "gyroscope",
            SensorType::Magnetometer => "magnetometer",
            SensorType::Unknown => "unknown",
        }
    }

    /// Parse the wire spelling; strings outside the table are rejected
    pub fn from_wire(value: &str) -> Result<Self, DecodeError> {
        match value {
            "camera" => Ok(SensorType::Camera),
            "geolocation" => Ok(SensorType::Geolocation),
            "wifi" => Ok(SensorType::Wifi),
            "bluetooth" => Ok(SensorType::Bluetooth),
            "accelerometer" => Ok(SensorType::Accelerometer),
            "gyroscope" => Ok(SensorType::Gyroscope),
            "magnetometer" => Ok(SensorType::Magnetometer),
            "unknown" => Ok(SensorType::Unknown),
            other => Err(DecodeError::UnknownEnum {
                kind: "sensorType",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl ImageFormat {
    /// Wire spelling of this image format
    pub fn as_wire(&self) -> &'static str {
        match self {
            ImageFormat::Rgba32 => "RGBA32",
            ImageFormat::Gray8 => "GRAY8",
            ImageFormat::Depth => "DEPTH",
            ImageFormat::Jpg => "JPG",
            ImageFormat::Unknown => "unknown",
        }
    }

    /// Parse the wire spelling; strings outside the table are rejected
    pub fn from_wire(value: &str) -> Result<Self, DecodeError> {
        match value {
            "RGBA32" => Ok(ImageFormat::Rgba32),
            "GRAY8" => Ok(ImageFormat::Gray8),
            "DEPTH" => Ok(ImageFormat::Depth),
            "JPG" => Ok(ImageFormat::Jpg),
            "unknown" => Ok(ImageFormat::Unknown),
            other => Err(DecodeError::UnknownEnum {
                kind: "imageFormat",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl CameraModel {
    /// Wire spelling of this camera model (COLMAP names)
    pub fn as_wire(&self) -> &'static str {
        match self {
            CameraModel::SimplePinhole => "SIMPLE_PINHOLE",
            CameraModel::Pinhole => "PINHOLE",
            CameraModel::SimpleRadial => "SIMPLE_RADIAL",
            CameraModel::Radial => "RADIAL",
            CameraModel::OpenCv => "OPENCV",
            CameraModel::OpenCvFisheye => "OPENCV_FISHEYE",
            CameraModel::FullOpenCv => "FULL_OPENCV",
            CameraModel::Fov => "FOV",
            CameraModel::SimpleRadialFisheye => "SIMPLE_RADIAL_FISHEYE",
            CameraModel::RadialFisheye => "RADIAL_FISHEYE",
            CameraModel::ThinPrismFisheye => "THIN_PRISM_FISHEYE",
            CameraModel::Unknown => "UNKNOWN",
        }
    }

    /// Parse the wire spelling; strings outside the table are rejected
    pub fn from_wire(value: &str) -> Result<Self, DecodeError> {
        match value {
            "SIMPLE_PINHOLE" => Ok(CameraModel::SimplePinhole),
            "PINHOLE" => Ok(CameraModel::Pinhole),
            "SIMPLE_RADIAL" => Ok(CameraModel::SimpleRadial),
            "RADIAL" => Ok(CameraModel::Radial),
            "OPENCV" => Ok(CameraModel::OpenCv),
            "OPENCV_FISHEYE" => Ok(CameraModel::OpenCvFisheye),
            "FULL_OPENCV" => Ok(CameraModel::FullOpenCv),
            "FOV" => Ok(CameraModel::Fov),
            "SIMPLE_RADIAL_FISHEYE" => Ok(CameraModel::SimpleRadialFisheye),
            "RADIAL_FISHEYE" => Ok(CameraModel::RadialFisheye),
            "THIN_PRISM_FISHEYE" => Ok(CameraModel::ThinPrismFisheye),
            "UNKNOWN" => Ok(CameraModel::Unknown),
            other => Err(DecodeError::UnknownEnum {
                kind: "cameraModel",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for CameraModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl Serialize for SensorType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for SensorType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        SensorType::from_wire(&value).map_err(de::Error::custom)
    }
}

impl Serialize for ImageFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for ImageFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        ImageFormat::from_wire(&value).map_err(de::Error::custom)
    }
}

impl Serialize for CameraModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for CameraModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        CameraModel::from_wire(&value).map_err(de::Error::custom)
    }
}

/// Serde adapter carrying binary fields as Base64 strings
pub(crate) mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text.as_bytes()).map_err(D::Error::custom)
    }
}

impl Serialize for Sensor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut len = 2;
        if !self.name.is_empty() {
            len += 1;
        }
        if !self.model.is_empty() {
            len += 1;
        }
        if self.rig.is_some() {
            len += 3;
        }

        let mut state = serializer.serialize_struct("Sensor", len)?;
        state.serialize_field("type", &self.sensor_type)?;
        state.serialize_field("id", &self.id)?;
        if !self.name.is_empty() {
            state.serialize_field("name", &self.name)?;
        }
        if !self.model.is_empty() {
            state.serialize_field("model", &self.model)?;
        }
        if let Some(rig) = &self.rig {
            state.serialize_field("rigIdentifier", &rig.identifier)?;
            state.serialize_field("rigRotation", &rig.rotation)?;
            state.serialize_field("rigTranslation", &rig.translation)?;
        }
        state.end()
    }
}

/// Flat wire form of [`Sensor`]; the rig trio folds into `Sensor::rig`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SensorWire {
    #[serde(rename = "type")]
    sensor_type: SensorType,
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    rig_identifier: String,
    #[serde(default)]
    rig_rotation: Option<Quaternion>,
    #[serde(default)]
    rig_translation: Option<Vector3>,
}

impl<'de> Deserialize<'de> for Sensor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = SensorWire::deserialize(deserializer)?;
        // a rig offset without an identifier is meaningless on the wire
        let rig = if wire.rig_identifier.is_empty() {
            None
        } else {
            Some(RigOffset {
                identifier: wire.rig_identifier,
                rotation: wire.rig_rotation.unwrap_or_default(),
                translation: wire.rig_translation.unwrap_or_default(),
            })
        };
        Ok(Sensor {
            sensor_type: wire.sensor_type,
            id: wire.id,
            name: wire.name,
            model: wire.model,
            rig,
        })
    }
}

impl Serialize for SensorReading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.privacy.is_empty() { 4 } else { 5 };
        let mut state = serializer.serialize_struct("SensorReading", len)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("sensorId", &self.sensor_id)?;
        if !self.privacy.is_empty() {
            state.serialize_field("privacy", &self.privacy)?;
        }
        state.serialize_field("sensorType", &self.reading.sensor_type())?;
        match &self.reading {
            Reading::Camera(r) => state.serialize_field("reading", r)?,
            Reading::Geolocation(r) => state.serialize_field("reading", r)?,
            Reading::Wifi(r) => state.serialize_field("reading", r)?,
            Reading::Bluetooth(r) => state.serialize_field("reading", r)?,
            Reading::Accelerometer(r) => state.serialize_field("reading", r)?,
            Reading::Gyroscope(r) => state.serialize_field("reading", r)?,
            Reading::Magnetometer(r) => state.serialize_field("reading", r)?,
        }
        state.end()
    }
}

/// Envelope wire form; the payload stays opaque until the tag is known
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SensorReadingWire {
    timestamp: u64,
    sensor_id: String,
    #[serde(default)]
    privacy: Privacy,
    sensor_type: SensorType,
    reading: serde_json::Value,
}

impl<'de> Deserialize<'de> for SensorReading {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = SensorReadingWire::deserialize(deserializer)?;
        let reading = reading_from_tag(wire.sensor_type, wire.reading).map_err(de::Error::custom)?;
        Ok(SensorReading {
            timestamp: wire.timestamp,
            sensor_id: wire.sensor_id,
            privacy: wire.privacy,
            reading,
        })
    }
}

/// Decode a reading payload according to an already-parsed tag
fn reading_from_tag(tag: SensorType, payload: serde_json::Value) -> Result<Reading, DecodeError> {
    let reading = match tag {
        SensorType::Camera => Reading::Camera(serde_json::from_value(payload)?),
        SensorType::Geolocation => Reading::Geolocation(serde_json::from_value(payload)?),
        SensorType::Wifi => Reading::Wifi(serde_json::from_value(payload)?),
        SensorType::Bluetooth => Reading::Bluetooth(serde_json::from_value(payload)?),
        SensorType::Accelerometer => Reading::Accelerometer(serde_json::from_value(payload)?),
        SensorType::Gyroscope => Reading::Gyroscope(serde_json::from_value(payload)?),
        SensorType::Magnetometer => Reading::Magnetometer(serde_json::from_value(payload)?),
        SensorType::Unknown => return Err(DecodeError::UnknownReadingTag),
    };
    Ok(reading)
}

/// Encode a request as compact JSON
pub fn encode_request(request: &GeoPoseRequest) -> Result<String, serde_json::Error> {
    serde_json::to_string(request)
}

/// Decode a request from JSON text
pub fn decode_request(json: &str) -> Result<GeoPoseRequest, DecodeError> {
    Ok(serde_json::from_str(json)?)
}

/// Encode a response as compact JSON
pub fn encode_response(response: &GeoPoseResponse) -> Result<String, serde_json::Error> {
    serde_json::to_string(response)
}

/// Decode a response from JSON text
pub fn decode_response(json: &str) -> Result<GeoPoseResponse, DecodeError> {
    Ok(serde_json::from_str(json)?)
}

/// Encode a request for logging, with every image payload replaced by a
/// placeholder
pub fn redacted_request_json(request: &GeoPoseRequest) -> String {
    let mut value = match serde_json::to_value(request) {
        Ok(value) => value,
        Err(_) => return String::from("{}"),
    };
    redact_image_bytes(&mut value);
    value.to_string()
}

fn redact_image_bytes(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if key == "imageBytes" {
                    *child = serde_json::Value::String(IMAGE_REDACTION_PLACEHOLDER.to_string());
                } else {
                    redact_image_bytes(child);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for child in items.iter_mut() {
                redact_image_bytes(child);
            }
        }
        _ => {}
    }
}
