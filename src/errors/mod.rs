//! Error types for the SendGrid client.
//!
//! Maps SendGrid's status-code contract onto a small domain taxonomy:
//! invalid input, conflicts, missing senders, unclassified failures and
//! local invariant violations, plus the transport-level failures that can
//! happen before a status code is ever seen.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for SendGrid operations.
pub type SendGridResult<T> = Result<T, SendGridError>;

/// Error message SendGrid returns when a sender nickname is already taken.
pub const DUPLICATE_NICKNAME_ERROR_MESSAGE: &str = "DUPLICATE_NICKNAME_ERROR_MESSAGE";

/// Error type for SendGrid client operations.
#[derive(Debug, Error)]
pub enum SendGridError {
    /// Configuration error (missing API key, bad base URL, etc.)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// SendGrid rejected the sender fields (HTTP 400).
    #[error("Invalid sender, SendGrid error response: {payload}")]
    InvalidSender {
        /// The error list returned by SendGrid.
        payload: ErrorPayload,
    },

    /// A sender with this nickname already exists.
    #[error("Sender with nickname '{nickname}' already exists")]
    SenderAlreadyExists {
        /// Client-chosen sender nickname.
        nickname: String,
    },

    /// The sender has already been verified.
    #[error("Sender '{sender_id}' is already verified")]
    SenderAlreadyVerified {
        /// SendGrid sender id.
        sender_id: String,
    },

    /// The sender does not exist (HTTP 404).
    #[error("Sender '{sender_id}' does not exist")]
    SenderDoesNotExist {
        /// SendGrid sender id.
        sender_id: String,
    },

    /// Any other non-2xx response, surfaced without interpretation.
    #[error("Unexpected SendGrid response (HTTP {status}): {body}")]
    Unclassified {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// SendGrid answered in a way the client cannot reconcile with its own
    /// assumptions about the API. Never retried.
    #[error("Invariant violation: {0}")]
    InvariantViolation(InvariantViolation),

    /// Network/connection error.
    #[error("Network error: {message}")]
    Network {
        /// Error message.
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {timeout:?}")]
    Timeout {
        /// Configured timeout.
        timeout: Duration,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },
}

/// Local invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The duplicate-nickname lookup found no sender with the nickname.
    NoSenderWithNickname {
        /// Nickname searched for.
        nickname: String,
    },
    /// The duplicate-nickname lookup found more than one sender.
    AmbiguousNickname {
        /// Nickname searched for.
        nickname: String,
        /// Number of senders carrying the nickname.
        matches: usize,
    },
    /// A sender record came back without `verified.status`.
    MissingVerificationStatus {
        /// SendGrid sender id.
        sender_id: String,
    },
    /// A 2xx sender response could not be decoded.
    MalformedSender {
        /// Decoder message.
        message: String,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSenderWithNickname { nickname } => {
                write!(f, "no sender with nickname '{}'", nickname)
            }
            Self::AmbiguousNickname { nickname, matches } => {
                write!(f, "{} senders share nickname '{}'", matches, nickname)
            }
            Self::MissingVerificationStatus { sender_id } => {
                write!(f, "sender '{}' has no verification status", sender_id)
            }
            Self::MalformedSender { message } => write!(f, "malformed sender record: {}", message),
        }
    }
}

impl SendGridError {
    /// Returns true if the target sender is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SendGridError::SenderDoesNotExist { .. })
    }

    /// Returns true for the "already exists" and "already verified" conflicts.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            SendGridError::SenderAlreadyExists { .. } | SendGridError::SenderAlreadyVerified { .. }
        )
    }

    /// Returns true for fatal local invariant violations.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, SendGridError::InvariantViolation(_))
    }

    /// Returns the HTTP status for errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            SendGridError::InvalidSender { .. } | SendGridError::SenderAlreadyVerified { .. } => {
                Some(400)
            }
            SendGridError::SenderDoesNotExist { .. } => Some(404),
            SendGridError::Unclassified { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Creates an unclassified error from a raw status and body.
    pub fn unclassified(status: u16, body: &[u8]) -> Self {
        SendGridError::Unclassified {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }
}

/// Error response body returned by SendGrid on HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Error entries, in the order SendGrid reported them.
    #[serde(default)]
    pub errors: Vec<ProviderError>,
}

/// A single SendGrid error entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    /// Error message.
    pub message: String,
    /// Offending field, when SendGrid names one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorPayload {
    /// Returns the messages in order.
    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }

    /// Returns true when the only error is the duplicate-nickname conflict.
    pub fn is_duplicate_nickname(&self) -> bool {
        self.messages() == [DUPLICATE_NICKNAME_ERROR_MESSAGE]
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.messages().join("; "))
    }
}

impl From<serde_json::Error> for SendGridError {
    fn from(err: serde_json::Error) -> Self {
        SendGridError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for SendGridError {
    fn from(err: url::ParseError) -> Self {
        SendGridError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}

impl From<InvariantViolation> for SendGridError {
    fn from(violation: InvariantViolation) -> Self {
        SendGridError::InvariantViolation(violation)
    }
}
