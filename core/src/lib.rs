//! Typed HTTP request/response pipeline.
//!
//! # Overview
//! Issues REST calls (GET/POST/PUT/DELETE, including multipart uploads) and
//! folds every outcome, from a missing token to an unreachable host to a
//! malformed body, into a single `CallResult<T>`. Callers branch on
//! `is_success()` instead of handling transport errors, inconsistent error
//! shapes or JSON failures themselves.
//!
//! # Design
//! - `ApiClient` is the facade: one entry point per verb, each running a
//!   fresh `ApiService` for that verb.
//! - `ApiService` runs one `ApiCall`, reports failures through `tracing`,
//!   and prefers a `message` embedded in the error text when present.
//! - `ApiCall` is split into `build_request` and `parse_response` around a
//!   `Transport`, so everything except the round trip is plain data and
//!   testable without a network. `ReqwestTransport` is the default.
//! - Payloads that implement `FormContributor` upload as multipart forms on
//!   POST; every other body is JSON.

pub mod call;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod form;
pub mod http;
pub mod payload;
pub mod result;
pub mod service;
pub mod transport;

pub use call::{parse_response, ApiCall, CallSpec};
pub use client::{ApiClient, CallOptions};
pub use config::ServiceConfig;
pub use error::{CallError, DecodeErrorKind};
pub use extract::{extract_embedded_message, extract_error_message, refine_error_message};
pub use form::{FormContributor, FormPart, MultipartForm, PartValue};
pub use http::{header, set_header, Headers, HttpRequest, HttpResponse, RequestBody, Transport, TransportOutcome, Verb};
pub use payload::Payload;
pub use result::CallResult;
pub use service::ApiService;
pub use transport::ReqwestTransport;
