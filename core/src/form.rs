//! Multipart form bodies.
//!
//! `MultipartForm` is plain data like the rest of the wire types; the
//! transport turns it into an encoded `multipart/form-data` body.

/// Value of a single form part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File {
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

/// A named part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

/// Ordered collection of form parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::Text(value.into()),
        });
        self
    }

    /// Append a file part. An empty `content_type` is guessed from the file
    /// name's extension, falling back to `application/octet-stream`.
    pub fn file(
        &mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> &mut Self {
        let file_name = file_name.into();
        let mut content_type = content_type.into();
        if content_type.trim().is_empty() {
            content_type = mime_guess::from_path(&file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string();
        }
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::File {
                file_name,
                content_type,
                bytes: bytes.into(),
            },
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Implemented by payloads that know how to upload themselves as
/// `multipart/form-data`.
pub trait FormContributor {
    fn append_to(&self, form: &mut MultipartForm);
}
