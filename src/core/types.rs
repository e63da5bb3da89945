//! Core data types shared by the wire model and the geodesy routines

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Geodetic position on the WGS84 ellipsoid
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees, positive north
    pub lat: f64,
    /// Longitude in degrees, positive east
    pub lon: f64,
    /// Ellipsoidal height in meters
    pub h: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64, h: f64) -> Self {
        Self { lat, lon, h }
    }
}

/// Orientation quaternion, defaults to identity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// The identity rotation (0, 0, 0, 1)
    pub fn identity() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

/// Plain 3D vector (meters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A geodetic pose: WGS84 position plus orientation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPose {
    pub position: Position,
    pub quaternion: Quaternion,
}

impl GeoPose {
    pub fn new(position: Position, quaternion: Quaternion) -> Self {
        Self { position, quaternion }
    }
}

/// Pose accuracy estimate; `f32::MAX` means unknown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoseAccuracy {
    /// Position accuracy in meters
    pub position: f32,
    /// Orientation accuracy in degrees
    pub orientation: f32,
}

impl GeoPoseAccuracy {
    pub fn new(position: f32, orientation: f32) -> Self {
        Self { position, orientation }
    }

    /// True when neither component has been estimated
    pub fn is_unknown(&self) -> bool {
        self.position == f32::MAX && self.orientation == f32::MAX
    }
}

impl Default for GeoPoseAccuracy {
    fn default() -> Self {
        Self { position: f32::MAX, orientation: f32::MAX }
    }
}

/// Milliseconds since the Unix epoch
pub fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
