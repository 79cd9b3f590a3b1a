//! JSON codec shared by every request and response.
//!
//! The rules are serde's defaults, kept in one place so every call agrees:
//! unknown input fields are ignored, `null` bound to a non-`Option` field is
//! rejected, and absent values are `Option`s skipped on output.
//!
//! Timestamps are integer epoch values, never fractional. Timestamps the
//! client originates are written as epoch milliseconds; no request payload
//! currently carries one. Provider records such as
//! [`Sender`](crate::types::sender::Sender) keep SendGrid's own wire form,
//! epoch seconds, in both directions so a record re-encoded by the client
//! reads back unchanged.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{SendGridError, SendGridResult};

/// Content type of every request body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Encodes a request body.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> SendGridResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| SendGridError::Serialization {
        message: format!("Failed to encode request body: {}", e),
    })
}

/// Decodes a response body.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> SendGridResult<T> {
    serde_json::from_slice(body).map_err(|e| SendGridError::Serialization {
        message: format!("Failed to decode response body: {}", e),
    })
}
