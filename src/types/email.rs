//! Templated email and its `mail/send` wire form.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Template parameter whose value, when present, becomes the display name of
/// the `from` and `reply_to` addresses.
pub const SENDER_SIGNATURE_NAME: &str = "senderSignatureName";

/// An email rendered by a SendGrid dynamic template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// SendGrid dynamic template id.
    pub template_id: String,
    /// Address used for `from` and `reply_to`.
    pub sender_email: String,
    /// Single recipient.
    pub recipient_email: String,
    /// Dynamic template data.
    #[serde(default)]
    pub template_parameters: HashMap<String, String>,
    /// Optional attachment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

impl Email {
    /// Creates an email without template parameters or attachment.
    pub fn new(
        template_id: impl Into<String>,
        sender_email: impl Into<String>,
        recipient_email: impl Into<String>,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            sender_email: sender_email.into(),
            recipient_email: recipient_email.into(),
            template_parameters: HashMap::new(),
            attachment: None,
        }
    }

    /// Adds a template parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.template_parameters.insert(key.into(), value.into());
        self
    }

    /// Replaces all template parameters.
    pub fn with_parameters(mut self, parameters: HashMap<String, String>) -> Self {
        self.template_parameters = parameters;
        self
    }

    /// Attaches a file.
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Display name for the sender, taken from the template parameters.
    pub fn sender_name(&self) -> Option<&str> {
        self.template_parameters
            .get(SENDER_SIGNATURE_NAME)
            .map(String::as_str)
    }
}

/// A base64-encoded file attached to an email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Base64-encoded content.
    pub content: String,
    /// File name shown to the recipient.
    pub file_name: String,
    /// MIME type.
    pub file_type: String,
}

impl Attachment {
    /// Creates an attachment from already base64-encoded content.
    pub fn new(
        content: impl Into<String>,
        file_name: impl Into<String>,
        file_type: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            file_name: file_name.into(),
            file_type: file_type.into(),
        }
    }

    /// Creates an attachment from raw bytes.
    pub fn from_bytes(
        bytes: impl AsRef<[u8]>,
        file_name: impl Into<String>,
        file_type: impl Into<String>,
    ) -> Self {
        Self::new(STANDARD.encode(bytes), file_name, file_type)
    }
}

/// `mail/send` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailSendRequest {
    /// Dynamic template id.
    pub template_id: String,
    /// Sender address.
    pub from: MailAddress,
    /// Reply-to address.
    pub reply_to: MailAddress,
    /// One entry per recipient group.
    pub personalizations: Vec<Personalization>,
    /// Attachments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<MailAttachment>,
}

/// An address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailAddress {
    /// Email address.
    pub email: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Per-recipient template data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personalization {
    /// Recipients.
    pub to: Vec<MailAddress>,
    /// Values substituted into the template.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub dynamic_template_data: HashMap<String, String>,
}

/// Attachment as SendGrid expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailAttachment {
    /// Base64-encoded content.
    pub content: String,
    /// File name.
    pub filename: String,
    /// MIME type.
    #[serde(rename = "type")]
    pub file_type: String,
}

impl From<&Email> for MailSendRequest {
    fn from(email: &Email) -> Self {
        let sender = MailAddress {
            email: email.sender_email.clone(),
            name: email.sender_name().map(str::to_string),
        };

        MailSendRequest {
            template_id: email.template_id.clone(),
            from: sender.clone(),
            reply_to: sender,
            personalizations: vec![Personalization {
                to: vec![MailAddress {
                    email: email.recipient_email.clone(),
                    name: None,
                }],
                dynamic_template_data: email.template_parameters.clone(),
            }],
            attachments: email
                .attachment
                .iter()
                .map(|a| MailAttachment {
                    content: a.content.clone(),
                    filename: a.file_name.clone(),
                    file_type: a.file_type.clone(),
                })
                .collect(),
        }
    }
}
