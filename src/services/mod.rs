//! Service implementations for the SendGrid API.
//!
//! `MailService` sends templated mail; `SendersService` manages verified
//! senders. Both share the transport and auth provider of the client.

mod mail;
mod senders;

pub use mail::MailService;
pub use senders::SendersService;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::auth::AuthProvider;
use crate::transport::codec::JSON_CONTENT_TYPE;
use crate::transport::HttpRequest;

/// Characters left unescaped in a path segment (RFC 3986 unreserved).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Joins an endpoint with percent-encoded path segments.
pub(crate) fn path_with_segments(endpoint: &str, segments: &[&str]) -> String {
    segments.iter().fold(endpoint.to_string(), |mut path, segment| {
        path.push('/');
        path.extend(utf8_percent_encode(segment, PATH_SEGMENT));
        path
    })
}

/// Adds auth, and content negotiation headers where needed.
pub(crate) fn prepare(
    auth: &dyn AuthProvider,
    mut request: HttpRequest,
    accept_json: bool,
) -> HttpRequest {
    auth.apply_auth(&mut request.headers);

    if request.body.is_some() {
        request
            .headers
            .insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
    }
    if accept_json {
        request
            .headers
            .insert("Accept".to_string(), JSON_CONTENT_TYPE.to_string());
    }

    request
}
