//! Core types and constants for the GeoPose protocol

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
