//! Verified sender records and payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Sender identity fields supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderDetails {
    /// Display name.
    pub name: String,
    /// Sender address, also used as reply-to.
    pub email: String,
    /// Postal address.
    pub address: String,
    /// City.
    pub city: String,
    /// Country.
    pub country: String,
}

impl SenderDetails {
    /// Creates sender details.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            address: address.into(),
            city: city.into(),
            country: country.into(),
        }
    }

    fn email_form(&self) -> EmailForm {
        EmailForm {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Name/email pair used for `from` and `reply_to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailForm {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Email address.
    pub email: String,
}

/// Body of `POST marketing/senders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSenderRequest {
    /// Client-chosen nickname, unique per account.
    pub nickname: String,
    /// Sender address.
    pub from: EmailForm,
    /// Reply-to address.
    pub reply_to: EmailForm,
    /// Postal address.
    pub address: String,
    /// City.
    pub city: String,
    /// Country.
    pub country: String,
}

impl CreateSenderRequest {
    /// Builds the payload; `from` and `reply_to` are the same form.
    pub fn new(nickname: impl Into<String>, details: &SenderDetails) -> Self {
        Self {
            nickname: nickname.into(),
            from: details.email_form(),
            reply_to: details.email_form(),
            address: details.address.clone(),
            city: details.city.clone(),
            country: details.country.clone(),
        }
    }
}

/// Body of `PATCH marketing/senders/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSenderRequest {
    /// Sender address.
    pub from: EmailForm,
    /// Reply-to address.
    pub reply_to: EmailForm,
    /// Postal address.
    pub address: String,
    /// City.
    pub city: String,
    /// Country.
    pub country: String,
}

impl From<&SenderDetails> for UpdateSenderRequest {
    fn from(details: &SenderDetails) -> Self {
        Self {
            from: details.email_form(),
            reply_to: details.email_form(),
            address: details.address.clone(),
            city: details.city.clone(),
            country: details.country.clone(),
        }
    }
}

/// A sender as SendGrid reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// SendGrid-assigned id, normalized to a string.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Client-chosen nickname.
    pub nickname: String,
    /// Sender address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<EmailForm>,
    /// Reply-to address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<EmailForm>,
    /// Postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Country.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Verification state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<Verification>,
    /// Locked senders are in use by a campaign and cannot be edited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    /// Creation time, epoch seconds on the wire.
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time, epoch seconds on the wire.
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Sender {
    /// Returns `verified.status` when SendGrid reported one.
    pub fn verification_status(&self) -> Option<bool> {
        self.verified.as_ref().and_then(|v| v.status)
    }
}

/// Verification block of a sender record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    /// Whether the sender address is verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    /// Reason reported alongside the status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        Text(String),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Number(n) => n.to_string(),
        Id::Text(s) => s,
    })
}
