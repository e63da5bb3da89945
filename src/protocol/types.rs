//! Data model of the GeoPose protocol
//!
//! Requests carry the client's sensor inventory plus a batch of readings;
//! responses carry the computed pose and its accuracy. The JSON mapping for
//! these types lives in [`super::codec`].

use serde::{Deserialize, Serialize};

use crate::core::{current_epoch_ms, GeoPose, GeoPoseAccuracy, Quaternion, Vector3, GEOPOSE_TYPE};

/// Kind of sensor that produced a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorType {
    Camera,
    Geolocation,
    Wifi,
    Bluetooth,
    Accelerometer,
    Gyroscope,
    Magnetometer,
    Unknown,
}

/// Pixel layout of a transported camera frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Rgba32,
    Gray8,
    Depth,
    Jpg,
    Unknown,
}

impl ImageFormat {
    pub fn is_unknown(&self) -> bool {
        matches!(self, ImageFormat::Unknown)
    }
}

/// Camera intrinsics model, following the COLMAP naming convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraModel {
    SimplePinhole,
    Pinhole,
    SimpleRadial,
    Radial,
    OpenCv,
    OpenCvFisheye,
    FullOpenCv,
    Fov,
    SimpleRadialFisheye,
    RadialFisheye,
    ThinPrismFisheye,
    Unknown,
}

impl CameraModel {
    pub fn is_unknown(&self) -> bool {
        matches!(self, CameraModel::Unknown)
    }

    /// Number of intrinsic parameters the model expects, per the COLMAP
    /// convention. The codec does not enforce this; callers that assemble
    /// `modelParams` lists can use it as a sanity check.
    pub fn param_count(&self) -> Option<usize> {
        match self {
            CameraModel::SimplePinhole => Some(3),
            CameraModel::Pinhole => Some(4),
            CameraModel::SimpleRadial => Some(4),
            CameraModel::Radial => Some(5),
            CameraModel::OpenCv => Some(8),
            CameraModel::OpenCvFisheye => Some(8),
            CameraModel::FullOpenCv => Some(12),
            CameraModel::Fov => Some(5),
            CameraModel::SimpleRadialFisheye => Some(4),
            CameraModel::RadialFisheye => Some(5),
            CameraModel::ThinPrismFisheye => Some(12),
            CameraModel::Unknown => None,
        }
    }
}

impl Default for CameraModel {
    fn default() -> Self {
        CameraModel::Unknown
    }
}

/// Mounting offset of a sensor relative to the rig origin
#[derive(Debug, Clone, PartialEq)]
pub struct RigOffset {
    /// Identifier of the rig this sensor is mounted on
    pub identifier: String,
    /// Rotation from the rig frame into the sensor frame
    pub rotation: Quaternion,
    /// Translation from the rig origin in meters
    pub translation: Vector3,
}

/// A sensor declared by the client; readings reference it by `id`
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub sensor_type: SensorType,
    pub id: String,
    /// Human-readable label, empty when not provided
    pub name: String,
    /// Hardware model string, empty when not provided
    pub model: String,
    /// Present only for sensors mounted on a multi-sensor rig
    pub rig: Option<RigOffset>,
}

impl Sensor {
    pub fn new(sensor_type: SensorType, id: impl Into<String>) -> Self {
        Self {
            sensor_type,
            id: id.into(),
            name: String::new(),
            model: String::new(),
            rig: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_rig(mut self, rig: RigOffset) -> Self {
        self.rig = Some(rig);
        self
    }
}

/// Data-handling constraints attached to a reading
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Privacy {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_retention: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_acceptable_use: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_sanitization_applied: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_sanitization_requested: Vec<String>,
}

impl Privacy {
    pub fn is_empty(&self) -> bool {
        self.data_retention.is_empty()
            && self.data_acceptable_use.is_empty()
            && self.data_sanitization_applied.is_empty()
            && self.data_sanitization_requested.is_empty()
    }
}

/// Intrinsic calibration accompanying a camera reading
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraParameters {
    #[serde(default, skip_serializing_if = "CameraModel::is_unknown")]
    pub model: CameraModel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub model_params: Vec<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub min_max_depth: Vec<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub min_max_disparity: Vec<f32>,
}

/// Orientation of the captured frame relative to the sensor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageOrientation {
    #[serde(default)]
    pub mirrored: bool,
    /// Clockwise rotation in degrees
    #[serde(default)]
    pub rotation: f32,
}

/// A single camera frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraReading {
    #[serde(default)]
    pub sequence_number: u32,
    pub image_format: ImageFormat,
    /// Frame width and height in pixels
    pub size: [u32; 2],
    /// Raw frame buffer; travels Base64-encoded on the wire
    #[serde(with = "super::codec::base64_bytes")]
    pub image_bytes: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_orientation: Option<ImageOrientation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<CameraParameters>,
}

/// A satellite or network position fix, W3C geolocation semantics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeolocationReading {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

/// One observed WiFi access point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WiFiReading {
    #[serde(rename = "BSSID")]
    pub bssid: String,
    /// Channel frequency in MHz
    pub frequency: f32,
    #[serde(rename = "RSSI")]
    pub rssi: f32,
    #[serde(rename = "SSID")]
    pub ssid: String,
    #[serde(rename = "scanTimeStart")]
    pub scan_time_start: u64,
    #[serde(rename = "scanTimeEnd")]
    pub scan_time_end: u64,
}

/// One observed Bluetooth beacon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BluetoothReading {
    pub address: String,
    #[serde(rename = "RSSI")]
    pub rssi: f32,
    pub name: String,
}

/// Linear acceleration sample (m/s^2)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerometerReading {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Angular velocity sample (rad/s)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GyroscopeReading {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Magnetic field sample (uT)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnetometerReading {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Payload of a sensor reading; the active variant determines the wire tag
///
/// The accelerometer, gyroscope and magnetometer payloads carry identical
/// fields, so decoding always dispatches on the tag before touching the
/// payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Camera(CameraReading),
    Geolocation(GeolocationReading),
    Wifi(WiFiReading),
    Bluetooth(BluetoothReading),
    Accelerometer(AccelerometerReading),
    Gyroscope(GyroscopeReading),
    Magnetometer(MagnetometerReading),
}

impl Reading {
    /// Wire tag of the active variant
    pub fn sensor_type(&self) -> SensorType {
        match self {
            Reading::Camera(_) => SensorType::Camera,
            Reading::Geolocation(_) => SensorType::Geolocation,
            Reading::Wifi(_) => SensorType::Wifi,
            Reading::Bluetooth(_) => SensorType::Bluetooth,
            Reading::Accelerometer(_) => SensorType::Accelerometer,
            Reading::Gyroscope(_) => SensorType::Gyroscope,
            Reading::Magnetometer(_) => SensorType::Magnetometer,
        }
    }
}

/// Envelope shared by every reading: capture time, the producing sensor and
/// optional privacy constraints around the tagged payload
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// Capture time, milliseconds since the Unix epoch
    pub timestamp: u64,
    /// References a `Sensor::id` declared in the same request
    pub sensor_id: String,
    pub privacy: Privacy,
    pub reading: Reading,
}

impl SensorReading {
    /// New reading stamped with the current time
    pub fn new(sensor_id: impl Into<String>, reading: Reading) -> Self {
        Self {
            timestamp: current_epoch_ms(),
            sensor_id: sensor_id.into(),
            privacy: Privacy::default(),
            reading,
        }
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_privacy(mut self, privacy: Privacy) -> Self {
        self.privacy = privacy;
        self
    }
}

/// Localization request: sensor inventory plus a batch of readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoseRequest {
    #[serde(rename = "type")]
    pub kind: String,
    /// Client-chosen request identifier, echoed by the server
    pub id: String,
    /// Request creation time, milliseconds since the Unix epoch
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sensors: Vec<Sensor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sensor_readings: Vec<SensorReading>,
    /// Poses previously returned to this client, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prior_poses: Vec<GeoPoseResponse>,
}

impl GeoPoseRequest {
    /// New empty request with a fresh UUID and the current time
    pub fn new() -> Self {
        Self {
            kind: GEOPOSE_TYPE.to_string(),
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: current_epoch_ms(),
            sensors: Vec::new(),
            sensor_readings: Vec::new(),
            prior_poses: Vec::new(),
        }
    }

    pub fn with_sensor(mut self, sensor: Sensor) -> Self {
        self.sensors.push(sensor);
        self
    }

    pub fn with_reading(mut self, reading: SensorReading) -> Self {
        self.sensor_readings.push(reading);
        self
    }

    pub fn with_prior_pose(mut self, pose: GeoPoseResponse) -> Self {
        self.prior_poses.push(pose);
        self
    }

    /// Iterator over the camera frames in this request
    pub fn camera_readings(&self) -> impl Iterator<Item = &CameraReading> {
        self.sensor_readings.iter().filter_map(|r| match &r.reading {
            Reading::Camera(camera) => Some(camera),
            _ => None,
        })
    }
}

impl Default for GeoPoseRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Localization answer: the computed pose and its accuracy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoseResponse {
    #[serde(rename = "type")]
    pub kind: String,
    /// Identifier of the request this answers
    pub id: String,
    /// Echo of the request timestamp
    pub timestamp: u64,
    #[serde(default)]
    pub accuracy: GeoPoseAccuracy,
    pub geopose: GeoPose,
}

impl GeoPoseResponse {
    /// Response for the given request id and timestamp
    pub fn new(id: impl Into<String>, timestamp: u64, geopose: GeoPose) -> Self {
        Self {
            kind: GEOPOSE_TYPE.to_string(),
            id: id.into(),
            timestamp,
            accuracy: GeoPoseAccuracy::default(),
            geopose,
        }
    }

    pub fn with_accuracy(mut self, accuracy: GeoPoseAccuracy) -> Self {
        self.accuracy = accuracy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_assigns_id_and_timestamp() {
        let request = GeoPoseRequest::new();
        assert_eq!(request.kind, "geopose");
        assert_eq!(request.id.len(), 36); // canonical UUID text form
        assert!(request.timestamp > 0);
        assert!(request.sensors.is_empty());
    }

    #[test]
    fn test_camera_reading_iterator_skips_other_variants() {
        let camera = CameraReading {
            sequence_number: 1,
            image_format: ImageFormat::Jpg,
            size: [640, 480],
            image_bytes: vec![0xFF, 0xD8],
            image_orientation: None,
            params: None,
        };
        let request = GeoPoseRequest::new()
            .with_reading(SensorReading::new("cam0", Reading::Camera(camera)))
            .with_reading(SensorReading::new(
                "imu0",
                Reading::Gyroscope(GyroscopeReading { x: 0.0, y: 0.0, z: 0.1 }),
            ));

        assert_eq!(request.camera_readings().count(), 1);
    }

    #[test]
    fn test_reading_reports_its_tag() {
        let reading = Reading::Magnetometer(MagnetometerReading { x: 1.0, y: 2.0, z: 3.0 });
        assert_eq!(reading.sensor_type(), SensorType::Magnetometer);
    }

    #[test]
    fn test_camera_model_param_counts() {
        assert_eq!(CameraModel::SimplePinhole.param_count(), Some(3));
        assert_eq!(CameraModel::FullOpenCv.param_count(), Some(12));
        assert_eq!(CameraModel::Unknown.param_count(), None);
    }
}
