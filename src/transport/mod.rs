//! HTTP transport layer for the SendGrid client.
//!
//! Provides the HTTP transport abstraction, the reqwest-backed
//! implementation bound to one base URL, and the shared JSON codec.

pub mod codec;
mod http;

pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, HttpTransportImpl};

use std::time::Duration;

/// Transport error types.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport cannot be built from the given settings.
    #[error("Invalid transport configuration: {message}")]
    InvalidConfiguration {
        /// Error message.
        message: String,
    },

    /// Connection error.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Timeout error.
    #[error("Timeout after {timeout:?}")]
    Timeout {
        /// Timeout duration.
        timeout: Duration,
    },

    /// Invalid response.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },
}

impl From<TransportError> for crate::errors::SendGridError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout { timeout } => crate::errors::SendGridError::Timeout { timeout },
            TransportError::InvalidConfiguration { message } => {
                crate::errors::SendGridError::Configuration { message }
            }
            other => crate::errors::SendGridError::Network {
                message: other.to_string(),
            },
        }
    }
}
