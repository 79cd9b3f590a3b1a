//! Authentication for SendGrid requests.
//!
//! SendGrid authenticates every call with `Authorization: Bearer <api key>`.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;

use crate::errors::{SendGridError, SendGridResult};

/// Header carrying the credentials.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Adds credentials to outgoing requests.
pub trait AuthProvider: Send + Sync {
    /// Inserts the credential header.
    fn apply_auth(&self, headers: &mut HashMap<String, String>);

    /// Checked once when the client is built.
    fn validate(&self) -> SendGridResult<()>;
}

/// Last four characters of a key for logs, `****` when the key is too short
/// to reveal any of it.
pub(crate) fn key_hint(key: &str) -> String {
    if key.chars().count() <= 4 {
        return "****".to_string();
    }
    let mut tail: Vec<char> = key.chars().rev().take(4).collect();
    tail.reverse();
    format!("...{}", tail.into_iter().collect::<String>())
}

/// Bearer authentication with a SendGrid API key.
pub struct ApiKeyAuth {
    api_key: SecretString,
}

impl ApiKeyAuth {
    /// Wraps an API key.
    pub fn new(api_key: SecretString) -> Self {
        Self { api_key }
    }
}

impl AuthProvider for ApiKeyAuth {
    fn apply_auth(&self, headers: &mut HashMap<String, String>) {
        headers.insert(
            AUTHORIZATION_HEADER.to_string(),
            format!("Bearer {}", self.api_key.expose_secret()),
        );
    }

    fn validate(&self) -> SendGridResult<()> {
        let key = self.api_key.expose_secret();
        if key.is_empty() {
            return Err(SendGridError::Configuration {
                message: "API key cannot be empty".to_string(),
            });
        }
        // Rejected here rather than as an opaque request-builder failure on
        // the first call.
        if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(SendGridError::Configuration {
                message: format!(
                    "API key {} contains characters not allowed in a header",
                    key_hint(key)
                ),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("api_key", &key_hint(self.api_key.expose_secret()))
            .finish()
    }
}
