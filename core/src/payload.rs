//! Type-erased request payloads.
//!
//! # Design
//! A `Payload` owns the caller's value and defers encoding to the executor.
//! The variant records whether the value also implements `FormContributor`,
//! which is how the executor chooses between a JSON body and a multipart
//! form without a second executor type.

use serde::Serialize;

use crate::form::FormContributor;

trait JsonBody: Send + Sync {
    fn to_json(&self) -> serde_json::Result<String>;
}

impl<T: Serialize + Send + Sync> JsonBody for T {
    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

trait FormBody: JsonBody {
    fn contributor(&self) -> &dyn FormContributor;
}

impl<T: Serialize + FormContributor + Send + Sync> FormBody for T {
    fn contributor(&self) -> &dyn FormContributor {
        self
    }
}

enum Inner {
    Json(Box<dyn JsonBody>),
    Form(Box<dyn FormBody>),
}

/// Request payload handed to an `ApiCall`.
pub struct Payload {
    inner: Inner,
}

impl Payload {
    /// A payload that is always sent as JSON.
    pub fn json<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self {
            inner: Inner::Json(Box::new(value)),
        }
    }

    /// A payload that uploads as a multipart form on POST and falls back to
    /// JSON for every other verb.
    pub fn form<T>(value: T) -> Self
    where
        T: Serialize + FormContributor + Send + Sync + 'static,
    {
        Self {
            inner: Inner::Form(Box::new(value)),
        }
    }

    pub fn form_contributor(&self) -> Option<&dyn FormContributor> {
        match &self.inner {
            Inner::Json(_) => None,
            Inner::Form(body) => Some(body.contributor()),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        match &self.inner {
            Inner::Json(body) => body.to_json(),
            Inner::Form(body) => body.to_json(),
        }
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.inner {
            Inner::Json(_) => "json",
            Inner::Form(_) => "form",
        };
        f.debug_struct("Payload").field("kind", &kind).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::MultipartForm;

    #[derive(Serialize)]
    struct Avatar {
        user: String,
    }

    impl FormContributor for Avatar {
        fn append_to(&self, form: &mut MultipartForm) {
            form.text("user", &self.user);
        }
    }

    #[test]
    fn json_payload_has_no_contributor() {
        let payload = Payload::json(Avatar { user: "ann".into() });
        assert!(payload.form_contributor().is_none());
        assert_eq!(payload.to_json().unwrap(), r#"{"user":"ann"}"#);
    }

    #[test]
    fn form_payload_exposes_contributor_and_json() {
        let payload = Payload::form(Avatar { user: "bob".into() });
        let mut form = MultipartForm::new();
        payload.form_contributor().unwrap().append_to(&mut form);
        assert_eq!(form.parts().len(), 1);
        assert_eq!(payload.to_json().unwrap(), r#"{"user":"bob"}"#);
    }
}
