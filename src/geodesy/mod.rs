//! Geodetic coordinate transformations

pub mod transforms;

pub use transforms::*;
