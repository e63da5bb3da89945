//! Protocol version negotiation over the HTTP Accept header

use thiserror::Error;

use crate::core::constants::{OSCP_MEDIA_TYPE, PROTOCOL_VERSION};

/// Canonical Accept header value clients send with every request.
pub const ACCEPT_HEADER_VALUE: &str = "application/vnd.oscp+json; version=2.0";

/// Rejection reasons for the Accept header gate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VersionError {
    /// The request carried no Accept header at all.
    #[error("request carries no Accept header")]
    MissingHeader,
    /// The Accept header named some other media type.
    #[error("Accept header does not contain application/vnd.oscp+json")]
    MissingMediaType,
    /// The media type was present but carried no version parameter.
    #[error("Accept header does not carry a version parameter")]
    MissingVersion,
    /// The version parameter was not a numeric major.minor pair.
    #[error("cannot parse protocol version '{value}'")]
    UnparsableVersion { value: String },
    /// The version parsed but is not one this implementation speaks.
    #[error("only version=2.0 is served, got {major}.{minor}")]
    UnsupportedVersion { major: u32, minor: u32 },
}

/// Checks an Accept header against the protocol version this crate speaks.
///
/// A missing header is rejected when `required` is set and waved through
/// otherwise. A present header must name the OSCP media type and carry a
/// version parameter equal to 2.0; a bare major (`version=2`) counts as
/// minor 0.
pub fn verify_accept(accept: Option<&str>, required: bool) -> Result<(), VersionError> {
    let header = match accept {
        Some(header) => header,
        None if required => return Err(VersionError::MissingHeader),
        None => return Ok(()),
    };

    if !header.contains(OSCP_MEDIA_TYPE) {
        return Err(VersionError::MissingMediaType);
    }
    let after_marker = match header.split_once("version=") {
        Some((_, rest)) => rest,
        None => return Err(VersionError::MissingVersion),
    };
    let token: String = after_marker
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let (major, minor) = parse_version(&token)?;
    if (major, minor) != PROTOCOL_VERSION {
        return Err(VersionError::UnsupportedVersion { major, minor });
    }
    Ok(())
}

fn parse_version(token: &str) -> Result<(u32, u32), VersionError> {
    let unparsable = || VersionError::UnparsableVersion {
        value: token.to_string(),
    };
    match token.split_once('.') {
        Some((major, minor)) => Ok((
            major.parse().map_err(|_| unparsable())?,
            minor.parse().map_err(|_| unparsable())?,
        )),
        None => Ok((token.parse().map_err(|_| unparsable())?, 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_header_accepted() {
        assert!(ACCEPT_HEADER_VALUE.starts_with(OSCP_MEDIA_TYPE));
        assert_eq!(verify_accept(Some(ACCEPT_HEADER_VALUE), true), Ok(()));
    }

    #[test]
    fn test_trailing_parameters_ignored() {
        let header = "application/vnd.oscp+json; version=2.0; charset=utf-8";
        assert_eq!(verify_accept(Some(header), true), Ok(()));
    }

    #[test]
    fn test_bare_major_counts_as_minor_zero() {
        let header = "application/vnd.oscp+json; version=2";
        assert_eq!(verify_accept(Some(header), true), Ok(()));
    }

    #[test]
    fn test_older_version_rejected() {
        let header = "application/vnd.oscp+json; version=1.0";
        assert_eq!(
            verify_accept(Some(header), true),
            Err(VersionError::UnsupportedVersion { major: 1, minor: 0 })
        );
    }

    #[test]
    fn test_newer_version_rejected() {
        let header = "application/vnd.oscp+json; version=3.0";
        assert_eq!(
            verify_accept(Some(header), true),
            Err(VersionError::UnsupportedVersion { major: 3, minor: 0 })
        );
    }

    #[test]
    fn test_wrong_media_type_rejected() {
        let header = "application/json; version=2.0";
        assert_eq!(
            verify_accept(Some(header), true),
            Err(VersionError::MissingMediaType)
        );
    }

    #[test]
    fn test_version_parameter_required() {
        let header = "application/vnd.oscp+json";
        assert_eq!(
            verify_accept(Some(header), true),
            Err(VersionError::MissingVersion)
        );
    }

    #[test]
    fn test_garbage_version_rejected() {
        let header = "application/vnd.oscp+json; version=two";
        assert_eq!(
            verify_accept(Some(header), true),
            Err(VersionError::UnparsableVersion {
                value: String::new()
            })
        );
    }

    #[test]
    fn test_missing_header_policy() {
        assert_eq!(verify_accept(None, true), Err(VersionError::MissingHeader));
        assert_eq!(verify_accept(None, false), Ok(()));
    }
}
