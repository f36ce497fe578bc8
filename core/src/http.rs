//! Wire types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. `ApiCall` builds an `HttpRequest`
//! and classifies an `HttpResponse`; the `Transport` implementation in
//! between is the only code that touches the network. Tests swap in an
//! in-memory transport without changing anything else.
//!
//! A transport never returns an error type. Whether a round trip failed
//! before a response arrived, arrived with a failing status, or succeeded is
//! carried in `HttpResponse::outcome`, so classification stays in one place.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::form::MultipartForm;

/// HTTP verb of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }

    /// Whether a payload is sent as a request body for this verb.
    pub fn carries_body(&self) -> bool {
        matches!(self, Verb::Post | Verb::Put)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header list. Names compare case-insensitively.
pub type Headers = Vec<(String, String)>;

/// Insert `name: value`, replacing any existing header with the same name.
pub fn set_header(headers: &mut Headers, name: &str, value: impl Into<String>) {
    let value = value.into();
    match headers
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
    {
        Some(slot) => slot.1 = value,
        None => headers.push((name.to_string(), value)),
    }
}

/// Look up a header value by case-insensitive name.
pub fn header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Body of an outgoing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(String),
    Multipart(MultipartForm),
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Verb,
    pub url: String,
    pub headers: Headers,
    pub body: RequestBody,
}

/// How the transport finished the round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportOutcome {
    /// A response arrived and the transport did not flag it.
    Success,
    /// No HTTP response was obtained (DNS, refused connection, broken body).
    ConnectionError,
    /// A response arrived with a status the transport treats as failure.
    ProtocolError,
}

/// The result of one round trip, described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// Status code, or 0 when no response line was received.
    pub status: u16,
    pub outcome: TransportOutcome,
    pub body: Option<String>,
    /// Transport-level error text, if any.
    pub error: Option<String>,
}

impl HttpResponse {
    pub fn success(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            outcome: TransportOutcome::Success,
            body: Some(body.into()),
            error: None,
        }
    }

    pub fn protocol_error(status: u16, error: impl Into<String>, body: Option<String>) -> Self {
        Self {
            status,
            outcome: TransportOutcome::ProtocolError,
            body,
            error: Some(error.into()),
        }
    }

    pub fn connection_error(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            outcome: TransportOutcome::ConnectionError,
            body: None,
            error: Some(error.into()),
        }
    }
}

/// Performs one HTTP round trip.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> HttpResponse;
}
