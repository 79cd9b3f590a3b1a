//! Verified senders service.

use std::sync::Arc;
use tracing::instrument;

use crate::auth::AuthProvider;
use crate::errors::{ErrorPayload, InvariantViolation, SendGridError, SendGridResult};
use crate::transport::{codec, HttpRequest, HttpResponse, HttpTransport};
use crate::types::sender::{CreateSenderRequest, Sender, SenderDetails, UpdateSenderRequest};

use super::{path_with_segments, prepare};

const SENDERS_ENDPOINT: &str = "marketing/senders";
const RESEND_VERIFICATION: &str = "resend_verification";

/// A create that hits a duplicate nickname gets one cleanup-and-retry.
const MAX_CREATE_ATTEMPTS: u32 = 2;

/// Manages verified senders under `marketing/senders`.
///
/// Sender state is owned by SendGrid; nothing is cached here.
pub struct SendersService {
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn AuthProvider>,
}

impl SendersService {
    /// Creates a new senders service.
    pub fn new(transport: Arc<dyn HttpTransport>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { transport, auth }
    }

    /// Creates a sender and returns its SendGrid id.
    ///
    /// If the nickname is already taken, the existing sender is looked up,
    /// deleted, and the create is retried once. A second conflict is
    /// returned as [`SendGridError::SenderAlreadyExists`].
    #[instrument(skip(self, details), fields(nickname = %nickname))]
    pub async fn create(&self, nickname: &str, details: &SenderDetails) -> SendGridResult<String> {
        let body = codec::encode(&CreateSenderRequest::new(nickname, details))?;

        let mut attempt = 1;
        loop {
            match self.try_create(nickname, body.clone()).await {
                Err(SendGridError::SenderAlreadyExists { .. }) if attempt < MAX_CREATE_ATTEMPTS => {
                    tracing::info!(
                        attempt,
                        "Sender nickname already taken, deleting the existing sender and retrying"
                    );
                    self.delete_by_nickname(nickname).await?;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Updates a sender's identity fields.
    #[instrument(skip(self, details), fields(sender_id = %sender_id))]
    pub async fn update(&self, sender_id: &str, details: &SenderDetails) -> SendGridResult<()> {
        let body = codec::encode(&UpdateSenderRequest::from(details))?;
        let request = HttpRequest::patch(path_with_segments(SENDERS_ENDPOINT, &[sender_id]))
            .with_body(body);

        let response = self.execute(request, true).await?;

        match response.status {
            200..=299 => Ok(()),
            400 => Err(invalid_sender(&response)),
            404 => Err(does_not_exist(sender_id)),
            status => Err(SendGridError::unclassified(status, &response.body)),
        }
    }

    /// Deletes a sender. A sender that is already gone counts as deleted.
    #[instrument(skip(self), fields(sender_id = %sender_id))]
    pub async fn delete(&self, sender_id: &str) -> SendGridResult<()> {
        let request = HttpRequest::delete(path_with_segments(SENDERS_ENDPOINT, &[sender_id]));

        let response = self.execute(request, false).await?;

        match response.status {
            200..=299 => Ok(()),
            404 => {
                tracing::debug!("Sender already absent");
                Ok(())
            }
            status => Err(SendGridError::unclassified(status, &response.body)),
        }
    }

    /// Returns whether the sender's address has been verified.
    ///
    /// A 2xx response without a boolean `verified.status` is an
    /// [`InvariantViolation`].
    #[instrument(skip(self), fields(sender_id = %sender_id))]
    pub async fn fetch_verification_status(&self, sender_id: &str) -> SendGridResult<bool> {
        let response = self.fetch_sender(sender_id).await?;

        let sender: Sender = codec::decode(&response.body).map_err(|e| {
            InvariantViolation::MalformedSender {
                message: e.to_string(),
            }
        })?;

        sender.verification_status().ok_or_else(|| {
            InvariantViolation::MissingVerificationStatus {
                sender_id: sender_id.to_string(),
            }
            .into()
        })
    }

    /// Asks SendGrid to send the verification email again.
    #[instrument(skip(self), fields(sender_id = %sender_id))]
    pub async fn resend_verification_email(&self, sender_id: &str) -> SendGridResult<()> {
        let request = HttpRequest::post(path_with_segments(
            SENDERS_ENDPOINT,
            &[sender_id, RESEND_VERIFICATION],
        ));

        let response = self.execute(request, false).await?;

        match response.status {
            200..=299 => Ok(()),
            400 => Err(SendGridError::SenderAlreadyVerified {
                sender_id: sender_id.to_string(),
            }),
            404 => Err(does_not_exist(sender_id)),
            status => Err(SendGridError::unclassified(status, &response.body)),
        }
    }

    /// Fetches one sender.
    #[instrument(skip(self), fields(sender_id = %sender_id))]
    pub async fn get(&self, sender_id: &str) -> SendGridResult<Sender> {
        let response = self.fetch_sender(sender_id).await?;
        codec::decode(&response.body)
    }

    /// Lists every sender of the account.
    #[instrument(skip(self))]
    pub async fn list(&self) -> SendGridResult<Vec<Sender>> {
        let response = self
            .execute(HttpRequest::get(SENDERS_ENDPOINT), true)
            .await?;

        if !response.is_success() {
            return Err(SendGridError::unclassified(response.status, &response.body));
        }

        codec::decode(&response.body)
    }

    /// Finds the single sender carrying `nickname`.
    ///
    /// Zero or several matches are invariant violations: nicknames are
    /// unique per account.
    #[instrument(skip(self), fields(nickname = %nickname))]
    pub async fn find_by_nickname(&self, nickname: &str) -> SendGridResult<Sender> {
        let mut matching: Vec<Sender> = self
            .list()
            .await?
            .into_iter()
            .filter(|sender| sender.nickname == nickname)
            .collect();

        match matching.len() {
            1 => Ok(matching.remove(0)),
            0 => Err(InvariantViolation::NoSenderWithNickname {
                nickname: nickname.to_string(),
            }
            .into()),
            matches => Err(InvariantViolation::AmbiguousNickname {
                nickname: nickname.to_string(),
                matches,
            }
            .into()),
        }
    }

    async fn try_create(&self, nickname: &str, body: Vec<u8>) -> SendGridResult<String> {
        let request = HttpRequest::post(SENDERS_ENDPOINT).with_body(body);

        let response = self.execute(request, true).await?;

        match response.status {
            200..=299 => codec::decode::<Sender>(&response.body).map(|sender| sender.id),
            400 => match codec::decode::<ErrorPayload>(&response.body) {
                Ok(payload) if payload.is_duplicate_nickname() => {
                    Err(SendGridError::SenderAlreadyExists {
                        nickname: nickname.to_string(),
                    })
                }
                Ok(payload) => Err(SendGridError::InvalidSender { payload }),
                Err(_) => Err(SendGridError::unclassified(400, &response.body)),
            },
            status => Err(SendGridError::unclassified(status, &response.body)),
        }
    }

    async fn delete_by_nickname(&self, nickname: &str) -> SendGridResult<()> {
        let existing = self.find_by_nickname(nickname).await?;
        self.delete(&existing.id).await
    }

    /// GETs a sender record, classifying everything but 2xx.
    async fn fetch_sender(&self, sender_id: &str) -> SendGridResult<HttpResponse> {
        let request = HttpRequest::get(path_with_segments(SENDERS_ENDPOINT, &[sender_id]));

        let response = self.execute(request, true).await?;

        match response.status {
            200..=299 => Ok(response),
            404 => Err(does_not_exist(sender_id)),
            status => Err(SendGridError::unclassified(status, &response.body)),
        }
    }

    async fn execute(&self, request: HttpRequest, accept_json: bool) -> SendGridResult<HttpResponse> {
        let request = prepare(self.auth.as_ref(), request, accept_json);
        Ok(self.transport.send(request).await?)
    }
}

fn does_not_exist(sender_id: &str) -> SendGridError {
    SendGridError::SenderDoesNotExist {
        sender_id: sender_id.to_string(),
    }
}

fn invalid_sender(response: &HttpResponse) -> SendGridError {
    match codec::decode::<ErrorPayload>(&response.body) {
        Ok(payload) => SendGridError::InvalidSender { payload },
        Err(_) => SendGridError::unclassified(response.status, &response.body),
    }
}

impl std::fmt::Debug for SendersService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendersService").finish()
    }
}
