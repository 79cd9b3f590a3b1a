//! Configuration module for the SendGrid client.
//!
//! Holds the API key, base URL, connection limit, timeout and logical name
//! the transport is built from. All values are fixed once the client exists.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::auth::key_hint;
use crate::errors::{SendGridError, SendGridResult};

/// Default base URL for the SendGrid v3 API.
pub const DEFAULT_BASE_URL: &str = "https://api.sendgrid.com/v3";

/// Default connect/request timeout (10 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default maximum number of concurrent connections.
pub const DEFAULT_MAX_CONNECTIONS: usize = 16;

/// Default logical client name.
pub const DEFAULT_NAME: &str = "SendGridClient";

/// Configuration for the SendGrid client.
#[derive(Clone)]
pub struct SendGridConfig {
    /// API key for authentication (stored securely).
    pub(crate) api_key: SecretString,
    /// Base URL for API requests.
    pub base_url: String,
    /// Maximum number of concurrent connections.
    pub max_connections: usize,
    /// Connect and request timeout.
    pub timeout: Duration,
    /// Logical name of the transport.
    pub name: String,
}

impl SendGridConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> SendGridConfigBuilder {
        SendGridConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SENDGRID_API_KEY` (required): API key for authentication
    /// - `SENDGRID_BASE_URL` (optional): Custom base URL
    /// - `SENDGRID_CONNECTIONS` (optional): Maximum concurrent connections
    /// - `SENDGRID_TIMEOUT` (optional): Timeout in seconds
    pub fn from_env() -> SendGridResult<Self> {
        let api_key = std::env::var("SENDGRID_API_KEY").map_err(|_| SendGridError::Configuration {
            message: "SENDGRID_API_KEY environment variable not set".to_string(),
        })?;

        let mut builder = SendGridConfigBuilder::new().api_key(api_key);

        if let Ok(base_url) = std::env::var("SENDGRID_BASE_URL") {
            builder = builder.base_url(base_url);
        }

        if let Ok(connections) = std::env::var("SENDGRID_CONNECTIONS") {
            let connections = connections
                .parse::<usize>()
                .map_err(|e| SendGridError::Configuration {
                    message: format!("SENDGRID_CONNECTIONS is not a number: {}", e),
                })?;
            builder = builder.max_connections(connections);
        }

        if let Ok(timeout) = std::env::var("SENDGRID_TIMEOUT") {
            let secs = timeout
                .parse::<u64>()
                .map_err(|e| SendGridError::Configuration {
                    message: format!("SENDGRID_TIMEOUT is not a number of seconds: {}", e),
                })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }

    /// Returns the API key (exposing the secret).
    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Returns the API key hint (last 4 characters) for debugging.
    pub fn api_key_hint(&self) -> String {
        key_hint(self.api_key.expose_secret())
    }
}

impl std::fmt::Debug for SendGridConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("max_connections", &self.max_connections)
            .field("timeout", &self.timeout)
            .field("name", &self.name)
            .finish()
    }
}

/// Builder for `SendGridConfig`.
#[derive(Default)]
pub struct SendGridConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    max_connections: Option<usize>,
    timeout: Option<Duration>,
    name: Option<String>,
}

impl SendGridConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the maximum number of concurrent connections.
    pub fn max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = Some(max_connections);
        self
    }

    /// Sets the connect/request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the logical transport name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> SendGridResult<SendGridConfig> {
        let api_key = self.api_key.ok_or_else(|| SendGridError::Configuration {
            message: "API key is required".to_string(),
        })?;

        if api_key.is_empty() {
            return Err(SendGridError::Configuration {
                message: "API key cannot be empty".to_string(),
            });
        }

        if !api_key.starts_with("SG.") {
            tracing::warn!("API key does not match expected SendGrid format (SG.*)");
        }

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let parsed = url::Url::parse(&base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SendGridError::Configuration {
                message: format!("Unsupported base URL scheme: {}", parsed.scheme()),
            });
        }

        let max_connections = self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS);
        if max_connections == 0 {
            return Err(SendGridError::Configuration {
                message: "At least one connection is required".to_string(),
            });
        }
        if max_connections > Semaphore::MAX_PERMITS {
            return Err(SendGridError::Configuration {
                message: format!(
                    "At most {} connections are supported, got {}",
                    Semaphore::MAX_PERMITS,
                    max_connections
                ),
            });
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(SendGridError::Configuration {
                message: "Timeout must be greater than zero".to_string(),
            });
        }

        Ok(SendGridConfig {
            api_key: SecretString::new(api_key),
            base_url,
            max_connections,
            timeout,
            name: self.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
        })
    }
}
