//! Server configuration loading
//!
//! The stub server answers every request with a pose taken from a JSON
//! config file, so a deployment can fake a localization service for client
//! development without any vision pipeline behind it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::core::{GeoPose, GeoPoseAccuracy};
use crate::validation::{validate_position, validate_quaternion, ValidationError};

/// Configuration errors with the offending file attached
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io { path: String, source: std::io::Error },
    #[error("failed to parse config file '{path}': {source}")]
    Parse { path: String, source: serde_json::Error },
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

/// Server settings, loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Pose returned for every localization request
    pub geopose: GeoPose,
    /// Accuracy attached to every response; defaults to unknown
    #[serde(default)]
    pub accuracy: GeoPoseAccuracy,
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Reject requests without an Accept header carrying the protocol
    /// version; present headers are always validated
    #[serde(default = "default_require_version_header")]
    pub require_version_header: bool,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_require_version_header() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            geopose: GeoPose::default(),
            accuracy: GeoPoseAccuracy::default(),
            bind: default_bind(),
            require_version_header: default_require_version_header(),
        }
    }
}

impl ServerConfig {
    /// Load and validate a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path_str.clone(),
            source: e,
        })?;

        let config: ServerConfig = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path_str,
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Range-check the configured pose before it is served.
    ///
    /// A non-finite quaternion is rejected; a finite but slightly off-unit
    /// one (common in hand-edited files) is tolerated with a warning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_position(&self.geopose.position)?;

        if let Err(err) = validate_quaternion(&self.geopose.quaternion) {
            let q = &self.geopose.quaternion;
            if !(q.x.is_finite() && q.y.is_finite() && q.z.is_finite() && q.w.is_finite()) {
                return Err(err.into());
            }
            warn!("configured quaternion is not unit length: {err}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_reference_shaped_config() {
        let file = write_config(
            r#"{
                "geopose": {
                    "position": {"lat": 48.2082, "lon": 16.3738, "h": 171.0},
                    "quaternion": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0}
                }
            }"#,
        );

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.geopose.position.lat, 48.2082);
        // unspecified fields fall back to defaults
        assert_eq!(config.bind, "0.0.0.0:8080");
        assert!(config.require_version_header);
        assert!(config.accuracy.is_unknown());
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"{
                "geopose": {
                    "position": {"lat": 48.2082, "lon": 16.3738, "h": 171.0},
                    "quaternion": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0}
                },
                "accuracy": {"position": 2.5, "orientation": 10.0},
                "bind": "127.0.0.1:9090",
                "require_version_header": false
            }"#,
        );

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.accuracy.position, 2.5);
        assert_eq!(config.bind, "127.0.0.1:9090");
        assert!(!config.require_version_header);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = ServerConfig::from_file("/nonexistent/geopose-server.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/geopose-server.json"));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let file = write_config("{\"geopose\": ");
        let err = ServerConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_out_of_range_position_is_rejected() {
        let file = write_config(
            r#"{
                "geopose": {
                    "position": {"lat": 95.0, "lon": 0.0, "h": 0.0},
                    "quaternion": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0}
                }
            }"#,
        );

        let err = ServerConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_off_unit_quaternion_is_tolerated() {
        let config = ServerConfig {
            geopose: GeoPose {
                quaternion: crate::core::Quaternion::new(0.0, 0.0, 0.0, 0.999),
                ..GeoPose::default()
            },
            ..ServerConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_finite_quaternion_is_rejected() {
        let config = ServerConfig {
            geopose: GeoPose {
                quaternion: crate::core::Quaternion::new(f64::NAN, 0.0, 0.0, 1.0),
                ..GeoPose::default()
            },
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
