//! Mail service.

use std::sync::Arc;
use tracing::instrument;

use crate::auth::AuthProvider;
use crate::errors::{SendGridError, SendGridResult};
use crate::transport::{codec, HttpRequest, HttpTransport};
use crate::types::email::{Email, MailSendRequest};

use super::prepare;

const MAIL_SEND_ENDPOINT: &str = "mail/send";

/// Sends templated mail through `mail/send`.
pub struct MailService {
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn AuthProvider>,
}

impl MailService {
    /// Creates a new mail service.
    pub fn new(transport: Arc<dyn HttpTransport>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { transport, auth }
    }

    /// Sends one email. Any 2xx is success; everything else is surfaced
    /// as [`SendGridError::Unclassified`].
    #[instrument(skip(self, email), fields(template_id = %email.template_id))]
    pub async fn send(&self, email: &Email) -> SendGridResult<()> {
        let body = codec::encode(&MailSendRequest::from(email))?;
        let request = prepare(
            self.auth.as_ref(),
            HttpRequest::post(MAIL_SEND_ENDPOINT).with_body(body),
            false,
        );

        let response = self.transport.send(request).await?;

        if response.is_success() {
            Ok(())
        } else {
            Err(SendGridError::unclassified(response.status, &response.body))
        }
    }
}

impl std::fmt::Debug for MailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailService").finish()
    }
}
