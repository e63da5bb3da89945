//! Protocol-level constants

/// Media type negotiated in the Accept header
pub const OSCP_MEDIA_TYPE: &str = "application/vnd.oscp+json";

/// Protocol version this crate speaks (major, minor)
pub const PROTOCOL_VERSION: (u32, u32) = (2, 0);

/// Value of the `type` field on requests and responses
pub const GEOPOSE_TYPE: &str = "geopose";

/// Placeholder substituted for image payloads in logs
pub const IMAGE_REDACTION_PLACEHOLDER: &str = "<IMAGE_BASE64>";
