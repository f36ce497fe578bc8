//! Single-request execution: build, send, classify, decode.
//!
//! # Design
//! `ApiCall` owns one `CallSpec` and is consumed by `execute`, so nothing
//! about a request outlives it. Execution is split the same way as the rest
//! of the crate: `build_request` produces plain request data, a `Transport`
//! performs the round trip, and `parse_response` classifies the plain
//! response. Every failure, including a panic in payload code, comes back
//! as a failed `CallResult`.

use std::panic::{catch_unwind, AssertUnwindSafe};

use mime_guess::mime::Mime;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::error::CallError;
use crate::extract::extract_error_message;
use crate::form::{MultipartForm, PartValue};
use crate::http::{
    set_header, Headers, HttpRequest, HttpResponse, RequestBody, Transport, TransportOutcome, Verb,
};
use crate::payload::Payload;
use crate::result::CallResult;

const NO_RESPONSE_TEXT: &str = "No response text available";

/// Immutable description of one request.
#[derive(Debug)]
pub struct CallSpec {
    pub target: String,
    pub verb: Verb,
    pub payload: Option<Payload>,
    pub requires_auth: bool,
    pub token: Option<String>,
}

impl CallSpec {
    pub fn new(verb: Verb, target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            verb,
            payload: None,
            requires_auth: false,
            token: None,
        }
    }

    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn requires_auth(mut self, requires_auth: bool) -> Self {
        self.requires_auth = requires_auth;
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }
}

/// Executes exactly one `CallSpec`.
#[derive(Debug)]
pub struct ApiCall {
    spec: CallSpec,
}

impl ApiCall {
    pub fn new(spec: CallSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &CallSpec {
        &self.spec
    }

    /// Build the wire request for this call.
    ///
    /// A POST whose payload is a form contributor becomes a multipart body.
    /// Any other POST or PUT payload is serialized to JSON. Caller headers
    /// are applied last and override the defaults.
    ///
    /// The target URL, every header, and the content type of every file part
    /// are checked here, so a request that cannot be encoded fails as
    /// `Unhandled` and never reaches the transport.
    pub fn build_request(&self, extra_headers: Option<&Headers>) -> Result<HttpRequest, CallError> {
        let spec = &self.spec;
        check_target(&spec.target)?;

        let mut headers = Headers::new();

        let body = match (&spec.payload, spec.verb) {
            (Some(payload), Verb::Post) if payload.form_contributor().is_some() => {
                RequestBody::Multipart(build_form(payload)?)
            }
            (Some(payload), verb) if verb.carries_body() => {
                let json = payload.to_json().map_err(construction_error)?;
                set_header(&mut headers, "content-type", "application/json");
                RequestBody::Json(json)
            }
            _ => RequestBody::Empty,
        };

        set_header(&mut headers, "accept", "application/json");
        if let Some(token) = spec.bearer_token() {
            set_header(&mut headers, "authorization", format!("Bearer {token}"));
        }
        for (name, value) in extra_headers.into_iter().flatten() {
            set_header(&mut headers, name, value.clone());
        }
        check_headers(&headers)?;

        Ok(HttpRequest {
            method: spec.verb,
            url: spec.target.clone(),
            headers,
            body,
        })
    }

    /// Run the call to completion against `transport`.
    pub async fn execute<T: DeserializeOwned>(
        self,
        transport: &dyn Transport,
        extra_headers: Option<&Headers>,
    ) -> CallResult<T> {
        let verb = self.spec.verb;

        if self.spec.requires_auth && self.spec.bearer_token().is_none() {
            return CallResult::from_error(verb, CallError::AuthRequired, None);
        }

        let request = match self.build_request(extra_headers) {
            Ok(request) => request,
            Err(err) => return CallResult::from_error(verb, err, None),
        };

        tracing::debug!(method = %verb, url = %request.url, "sending request");
        let response = transport.send(request).await;
        parse_response(verb, response)
    }
}

fn build_form(payload: &Payload) -> Result<MultipartForm, CallError> {
    let mut form = MultipartForm::new();
    let Some(contributor) = payload.form_contributor() else {
        return Ok(form);
    };
    catch_unwind(AssertUnwindSafe(|| contributor.append_to(&mut form)))
        .map_err(|panic| construction_error(panic_message(&*panic)))?;

    for part in form.parts() {
        if let PartValue::File { content_type, .. } = &part.value {
            content_type.parse::<Mime>().map_err(|err| {
                construction_error(format!("invalid content type {content_type:?} for part {:?}: {err}", part.name))
            })?;
        }
    }
    Ok(form)
}

fn construction_error(err: impl std::fmt::Display) -> CallError {
    CallError::Unhandled(format!("Error in request construction: {err}"))
}

fn check_target(target: &str) -> Result<(), CallError> {
    let url = Url::parse(target).map_err(|err| construction_error(format!("invalid URL {target:?}: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(construction_error(format!("unsupported URL scheme {scheme:?}"))),
    }
}

fn check_headers(headers: &Headers) -> Result<(), CallError> {
    for (name, value) in headers {
        HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| construction_error(format!("invalid header name {name:?}: {err}")))?;
        HeaderValue::from_str(value)
            .map_err(|err| construction_error(format!("invalid value for header {name:?}: {err}")))?;
    }
    Ok(())
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Classify a transport response and decode a successful body into `T`.
pub fn parse_response<T: DeserializeOwned>(verb: Verb, response: HttpResponse) -> CallResult<T> {
    let HttpResponse {
        status,
        outcome,
        body,
        error,
    } = response;

    match outcome {
        TransportOutcome::ConnectionError => {
            let cause = CallError::Connection {
                status,
                message: error.unwrap_or_default(),
            };
            CallResult::from_error(verb, cause, body)
        }
        TransportOutcome::ProtocolError => {
            let extracted = extract_error_message(body.as_deref());
            let response_text = body.as_deref().unwrap_or(NO_RESPONSE_TEXT);
            let message = format!("HTTP error, status code {status}: {extracted}. Response: {response_text}");
            tracing::debug!(status, transport_error = ?error, "protocol error");
            let cause = CallError::Protocol {
                status,
                message: extracted,
            };
            CallResult::failure(verb, message, Some(cause), body)
        }
        TransportOutcome::Success if !(200..300).contains(&status) => {
            CallResult::from_error(verb, CallError::UnexpectedStatus(status), body)
        }
        TransportOutcome::Success => decode_success(verb, status, body),
    }
}

fn decode_success<T: DeserializeOwned>(verb: Verb, status: u16, body: Option<String>) -> CallResult<T> {
    let has_content = status != 204 && body.as_deref().is_some_and(|text| !text.trim().is_empty());
    if !has_content {
        return CallResult::success(verb, None, body);
    }

    let decoded = serde_json::from_str::<T>(body.as_deref().unwrap_or_default());
    match decoded {
        Ok(data) => CallResult::success(verb, Some(data), body),
        Err(err) => CallResult::from_error(verb, err.into(), body),
    }
}
