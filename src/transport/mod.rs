//! HTTP transport for the GeoPose protocol
//!
//! The server side exposes the `/geopose` endpoint and delegates pose
//! computation to a [`PoseProvider`]. The client side wraps the same
//! endpoint for callers. Version negotiation over the `Accept` header
//! lives in [`version`] and is shared by both sides.

pub mod client;
pub mod server;
pub mod version;

pub use client::{ClientError, GeoPoseClient};
pub use server::{
    router, EndpointState, PoseError, PoseEstimate, PoseProvider, StaticPoseProvider,
};
pub use version::{verify_accept, VersionError, ACCEPT_HEADER_VALUE};
