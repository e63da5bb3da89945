//! GeoPose protocol wire model and JSON codec

pub mod types;
pub mod codec;

pub use types::*;
pub use codec::{
    decode_request, decode_response, encode_request, encode_response, redacted_request_json,
    DecodeError,
};
