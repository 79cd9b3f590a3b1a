//! SendGrid Client Library
//!
//! A Rust client for the SendGrid v3 API covering templated mail sending and
//! the lifecycle of verified senders, with SendGrid's responses mapped onto a
//! small error taxonomy.
//!
//! # Features
//!
//! - **Mail**: dynamic-template emails with one recipient and an optional attachment
//! - **Senders**: create, update, delete, verification status, resend verification
//! - **Recovery**: a create that collides with an existing nickname deletes the
//!   stale sender and retries exactly once
//! - **Transport**: one pooled reqwest client per named endpoint with a fixed
//!   timeout and connection limit
//! - **Observability**: `tracing` spans around every call
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sendgrid_client::{SendGridClient, SenderDetails};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SendGridClient::from_env()?;
//!
//!     let details = SenderDetails::new(
//!         "Jane Doe",
//!         "jane.doe@example.com",
//!         "Oxford street 23",
//!         "Dublin",
//!         "Ireland",
//!     );
//!
//!     let id = client.senders().create("jane", &details).await?;
//!     if !client.senders().fetch_verification_status(&id).await? {
//!         client.senders().resend_verification_email(&id).await?;
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod services;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::{SendGridClient, SendGridClientBuilder};
pub use config::SendGridConfig;
pub use errors::{
    ErrorPayload, InvariantViolation, ProviderError, SendGridError, SendGridResult,
};

// Type re-exports
pub use types::email::{Attachment, Email};
pub use types::sender::{Sender, SenderDetails, Verification};

/// Mock implementations for testing.
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
