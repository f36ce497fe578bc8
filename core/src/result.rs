//! The caller-facing outcome of a call.

use crate::error::CallError;
use crate::http::Verb;

/// Outcome of exactly one call.
///
/// Built once through [`CallResult::success`] or [`CallResult::failure`] and
/// read through accessors afterwards. A successful result never carries an
/// error message or cause; a failed one never carries data.
#[derive(Debug, Clone)]
pub struct CallResult<T> {
    success: bool,
    data: Option<T>,
    error_message: Option<String>,
    cause: Option<CallError>,
    method: Verb,
    raw_body: Option<String>,
}

impl<T> CallResult<T> {
    pub fn success(method: Verb, data: Option<T>, raw_body: Option<String>) -> Self {
        Self {
            success: true,
            data,
            error_message: None,
            cause: None,
            method,
            raw_body,
        }
    }

    pub fn failure(
        method: Verb,
        error_message: impl Into<String>,
        cause: Option<CallError>,
        raw_body: Option<String>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error_message: Some(error_message.into()),
            cause,
            method,
            raw_body,
        }
    }

    /// Failure whose message is the `Display` text of `cause`.
    pub fn from_error(method: Verb, cause: CallError, raw_body: Option<String>) -> Self {
        let message = cause.to_string();
        Self::failure(method, message, Some(cause), raw_body)
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn cause(&self) -> Option<&CallError> {
        self.cause.as_ref()
    }

    pub fn method(&self) -> Verb {
        self.method
    }

    /// The unparsed response text, on success and failure alike.
    pub fn raw_body(&self) -> Option<&str> {
        self.raw_body.as_deref()
    }

    /// Convert into a `Result` for callers that prefer `?`.
    ///
    /// A failure without a recorded cause becomes `CallError::Unhandled`
    /// carrying the error message.
    pub fn into_result(self) -> Result<Option<T>, CallError> {
        if self.success {
            return Ok(self.data);
        }
        Err(self.cause.unwrap_or_else(|| {
            CallError::Unhandled(self.error_message.unwrap_or_default())
        }))
    }

    /// Rebuild the result around a different method and error message,
    /// keeping everything else.
    pub(crate) fn rewrap(self, method: Verb, error_message: Option<String>) -> Self {
        if self.success {
            return Self::success(method, self.data, self.raw_body);
        }
        Self {
            success: false,
            data: None,
            error_message,
            cause: self.cause,
            method,
            raw_body: self.raw_body,
        }
    }
}
