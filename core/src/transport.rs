//! `Transport` backed by `reqwest`.
//!
//! Maps plain `HttpRequest` values onto a shared `reqwest::Client` and
//! classifies what comes back: a failed send or unreadable body is a
//! connection error, a 4xx/5xx status is a protocol error, anything else is
//! handed to the caller as a success. No timeout is set beyond the
//! client's own defaults.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::form::{MultipartForm, PartValue};
use crate::http::{HttpRequest, HttpResponse, RequestBody, Transport, Verb};

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn method(verb: Verb) -> Method {
    match verb {
        Verb::Get => Method::GET,
        Verb::Post => Method::POST,
        Verb::Put => Method::PUT,
        Verb::Delete => Method::DELETE,
    }
}

fn multipart_form(form: MultipartForm) -> Result<Form, reqwest::Error> {
    let mut encoded = Form::new();
    for part in form.parts() {
        encoded = match &part.value {
            PartValue::Text(text) => encoded.text(part.name.clone(), text.clone()),
            PartValue::File {
                file_name,
                content_type,
                bytes,
            } => {
                let file = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(content_type)?;
                encoded.part(part.name.clone(), file)
            }
        };
    }
    Ok(encoded)
}

/// reqwest's `Display` stops at the outermost error ("error sending
/// request", "builder error"), so append the source chain.
fn describe(err: &reqwest::Error) -> String {
    let mut text = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> HttpResponse {
        let mut builder = self.client.request(method(request.method), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(json) => builder.body(json),
            // `ApiCall::build_request` rejects bad content types, so only
            // hand-built requests reach this error.
            RequestBody::Multipart(form) => match multipart_form(form) {
                Ok(form) => builder.multipart(form),
                Err(err) => return HttpResponse::connection_error(0, describe(&err)),
            },
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                let status = err.status().map(|s| s.as_u16()).unwrap_or(0);
                return HttpResponse::connection_error(status, describe(&err));
            }
        };

        let status = response.status();
        let version = response.version();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return HttpResponse::connection_error(status.as_u16(), describe(&err)),
        };

        if status.is_client_error() || status.is_server_error() {
            let reason = status.canonical_reason().unwrap_or("");
            let error = format!("{version:?} {} {reason}", status.as_u16());
            let body = (!body.is_empty()).then_some(body);
            return HttpResponse::protocol_error(status.as_u16(), error.trim_end(), body);
        }
        HttpResponse::success(status.as_u16(), body)
    }
}
