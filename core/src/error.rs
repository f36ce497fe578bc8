//! Failure taxonomy of a call.
//!
//! # Design
//! Every way a call can fail is a `CallError` variant. None of them ever
//! escapes `ApiCall::execute`; they travel inside `CallResult::cause` next to
//! the human-readable message. The `Display` text of each variant is the
//! message callers see when no better one can be extracted from the body.

use thiserror::Error;

/// Why a response body could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// The body is not well-formed JSON.
    Syntax,
    /// The body is JSON but does not match the expected type.
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// Authentication was required but no token was supplied.
    #[error("Invalid token, please login")]
    AuthRequired,

    /// No HTTP response was obtained.
    #[error("Connection error: {message} ResponseCode: {status}")]
    Connection { status: u16, message: String },

    /// A response arrived with a status the transport flagged as failure.
    #[error("HTTP error, status code {status}: {message}")]
    Protocol { status: u16, message: String },

    /// The transport reported success with a status outside `200..300`.
    #[error("Unexpected response code: {0}")]
    UnexpectedStatus(u16),

    #[error("{}", decode_message(*kind, message))]
    Decode {
        kind: DecodeErrorKind,
        message: String,
    },

    /// Anything else, including request construction failures and panics in
    /// payload code.
    #[error("Exception during web request: {0}")]
    Unhandled(String),
}

fn decode_message(kind: DecodeErrorKind, message: &str) -> String {
    match kind {
        DecodeErrorKind::Syntax => format!("Couldn't parse the JSON response: {message}"),
        DecodeErrorKind::Data => format!("Error in JSON deserialization: {message}"),
    }
}

impl From<serde_json::Error> for CallError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        let kind = match err.classify() {
            Category::Data => DecodeErrorKind::Data,
            Category::Syntax | Category::Eof | Category::Io => DecodeErrorKind::Syntax,
        };
        CallError::Decode {
            kind,
            message: err.to_string(),
        }
    }
}
