//! Per-verb orchestration around `ApiCall`.
//!
//! # Design
//! An `ApiService` is bound to one verb. It runs a fresh `ApiCall` per
//! invocation, observes the outcome (failure reports, optional raw body
//! logging) and rewraps the result for the caller, replacing a failure
//! message with the `message` of an embedded JSON error when one exists.
//! Observation never changes the returned result.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::de::DeserializeOwned;

use crate::call::{panic_message, ApiCall, CallSpec};
use crate::config::ServiceConfig;
use crate::error::CallError;
use crate::extract::refine_error_message;
use crate::http::{Headers, Transport, Verb};
use crate::payload::Payload;
use crate::result::CallResult;

#[derive(Clone)]
pub struct ApiService {
    verb: Verb,
    transport: Arc<dyn Transport>,
    config: ServiceConfig,
}

impl ApiService {
    pub fn new(verb: Verb, transport: Arc<dyn Transport>, config: ServiceConfig) -> Self {
        Self {
            verb,
            transport,
            config,
        }
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub async fn execute<T: DeserializeOwned>(
        &self,
        target: &str,
        requires_auth: bool,
        payload: Option<Payload>,
        token: Option<String>,
        extra_headers: Option<&Headers>,
    ) -> CallResult<T> {
        let spec = CallSpec {
            target: target.to_string(),
            verb: self.verb,
            payload,
            requires_auth,
            token,
        };

        let call = ApiCall::new(spec).execute::<T>(self.transport.as_ref(), extra_headers);
        let result = match AssertUnwindSafe(call).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(&*panic);
                tracing::error!(method = %self.verb, url = target, error = %message, "panic while making API call");
                return CallResult::from_error(self.verb, CallError::Unhandled(message), None);
            }
        };

        if result.is_success() {
            self.log_raw_body(target, &result);
            return result.rewrap(self.verb, None);
        }

        report_failure(target, &result);
        let message = result.error_message().map(|m| refine_error_message(m.to_string()));
        result.rewrap(self.verb, message)
    }

    fn log_raw_body<T>(&self, target: &str, result: &CallResult<T>) {
        if !self.config.log_raw_json {
            return;
        }
        if let Some(raw) = result.raw_body().filter(|raw| !raw.is_empty()) {
            tracing::info!(method = %self.verb, url = target, raw_json = raw, "raw response");
        }
    }
}

impl std::fmt::Debug for ApiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiService")
            .field("verb", &self.verb)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn report_failure<T>(target: &str, result: &CallResult<T>) {
    let message = result
        .error_message()
        .filter(|m| !m.is_empty())
        .unwrap_or("No error message provided");
    let cause = result
        .cause()
        .map(|cause| format!("{cause:?}"))
        .unwrap_or_else(|| "No exception details available".to_string());

    tracing::error!(
        method = %result.method(),
        url = target,
        error_message = message,
        cause = %cause,
        "error making API call"
    );
}
