//! SendGrid API client.
//!
//! Provides the main client interface: templated mail sending and verified
//! sender management over one shared transport.

use std::sync::Arc;

use crate::auth::{ApiKeyAuth, AuthProvider};
use crate::config::{SendGridConfig, SendGridConfigBuilder};
use crate::errors::{SendGridError, SendGridResult};
use crate::services::{MailService, SendersService};
use crate::transport::{HttpTransport, HttpTransportImpl};

/// The main SendGrid client.
///
/// Safe to share between tasks; each call is independent and dropping a
/// call's future cancels its in-flight request.
///
/// # Example
///
/// ```rust,no_run
/// use sendgrid_client::{Email, SendGridClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = SendGridClient::builder()
///         .api_key("SG.your_api_key")
///         .build()?;
///
///     let email = Email::new("d-template", "noreply@example.com", "jane@example.com")
///         .with_parameter("subject", "Welcome");
///
///     client.mail().send(&email).await?;
///     Ok(())
/// }
/// ```
pub struct SendGridClient {
    config: SendGridConfig,
    mail_service: MailService,
    senders_service: SendersService,
}

impl SendGridClient {
    /// Creates a new client builder.
    pub fn builder() -> SendGridClientBuilder {
        SendGridClientBuilder::new()
    }

    /// Creates a client from environment variables.
    ///
    /// Reads `SENDGRID_API_KEY` and optionally `SENDGRID_BASE_URL`,
    /// `SENDGRID_CONNECTIONS` and `SENDGRID_TIMEOUT`.
    pub fn from_env() -> SendGridResult<Self> {
        let config = SendGridConfig::from_env()?;
        SendGridClientBuilder::from_config(config).build()
    }

    /// Returns the mail service.
    pub fn mail(&self) -> &MailService {
        &self.mail_service
    }

    /// Returns the senders service.
    pub fn senders(&self) -> &SendersService {
        &self.senders_service
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SendGridConfig {
        &self.config
    }
}

impl std::fmt::Debug for SendGridClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridClient")
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for the SendGrid client.
pub struct SendGridClientBuilder {
    config_builder: SendGridConfigBuilder,
    config: Option<SendGridConfig>,
    transport: Option<Arc<dyn HttpTransport>>,
    auth: Option<Arc<dyn AuthProvider>>,
}

impl SendGridClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self {
            config_builder: SendGridConfigBuilder::new(),
            config: None,
            transport: None,
            auth: None,
        }
    }

    /// Creates a builder from an existing configuration.
    pub fn from_config(config: SendGridConfig) -> Self {
        Self {
            config: Some(config),
            ..Self::new()
        }
    }

    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.api_key(api_key);
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(base_url);
        self
    }

    /// Sets the maximum number of concurrent connections.
    pub fn max_connections(mut self, max_connections: usize) -> Self {
        self.config_builder = self.config_builder.max_connections(max_connections);
        self
    }

    /// Sets the connect/request timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the logical transport name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.name(name);
        self
    }

    /// Sets a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets a custom auth provider.
    pub fn auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Builds the client.
    pub fn build(self) -> SendGridResult<SendGridClient> {
        let config = match self.config {
            Some(config) => config,
            None => self.config_builder.build()?,
        };

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(
                HttpTransportImpl::new(
                    &config.name,
                    &config.base_url,
                    config.max_connections,
                    config.timeout,
                )
                .map_err(|e| SendGridError::Configuration {
                    message: e.to_string(),
                })?,
            ),
        };

        let auth: Arc<dyn AuthProvider> = match self.auth {
            Some(a) => a,
            None => Arc::new(ApiKeyAuth::new(config.api_key.clone())),
        };
        auth.validate()?;

        Ok(SendGridClient {
            mail_service: MailService::new(Arc::clone(&transport), Arc::clone(&auth)),
            senders_service: SendersService::new(transport, auth),
            config,
        })
    }
}

impl Default for SendGridClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
