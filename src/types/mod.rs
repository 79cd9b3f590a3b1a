//! Type definitions for the SendGrid API.
//!
//! Domain values supplied by callers (`Email`, `SenderDetails`) and the wire
//! payloads they are translated into.

pub mod email;
pub mod sender;
