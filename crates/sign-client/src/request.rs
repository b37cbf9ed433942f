//! Logical request description.
//!
//! A [`LogicalRequest`] says what to call (method, relative path, body,
//! query, headers, files) without any transport framing. The pipeline turns
//! it into an HTTP exchange.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::Serialize;

use crate::error::{Error, ErrorKind, Result};

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Patch => reqwest::Method::PATCH,
            RequestMethod::Delete => reqwest::Method::DELETE,
        }
    }

    /// Upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A binary payload for a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// File contents.
    pub data: Bytes,
    /// File name sent in the part's Content-Disposition.
    pub file_name: Option<String>,
    /// MIME type of the part.
    pub content_type: Option<String>,
}

impl FilePart {
    /// Create a file part from raw bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            file_name: None,
            content_type: None,
        }
    }

    /// Set the file name.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Set the MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Multipart form: text fields plus file parts keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    pub fields: BTreeMap<String, String>,
    pub files: BTreeMap<String, FilePart>,
}

/// Request body content.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Multipart(MultipartBody),
}

/// A logical API call, immutable once handed to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalRequest {
    pub(crate) method: RequestMethod,
    pub(crate) path: String,
    pub(crate) body: Option<RequestBody>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: Vec<(String, String)>,
}

impl LogicalRequest {
    /// Create a new request for a path relative to the base URL.
    pub fn new(method: RequestMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Delete, path)
    }

    /// Add a header. Later values for the same name win.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Set JSON body.
    ///
    /// Fails with `InvalidRequest` if files or form fields were already
    /// attached; a multipart body is never silently dropped.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        if self.is_multipart() {
            return Err(Error::new(ErrorKind::InvalidRequest(
                "cannot set a JSON body on a multipart request".into(),
            )));
        }
        let value = serde_json::to_value(body)
            .map_err(|e| Error::with_source(ErrorKind::Serialization(e.to_string()), e))?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    /// Set raw JSON body, replacing any body already set.
    pub fn json_value(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attach a file under the given form field. Turns the body into multipart.
    pub fn file(self, field: impl Into<String>, part: FilePart) -> Self {
        self.with_multipart(|form| {
            form.files.insert(field.into(), part);
        })
    }

    /// Add a text field to the multipart body.
    pub fn form_field(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_multipart(|form| {
            form.fields.insert(name.into(), value.into());
        })
    }

    // A JSON body is replaced: multipart and JSON bodies are exclusive.
    fn with_multipart(mut self, update: impl FnOnce(&mut MultipartBody)) -> Self {
        let mut form = match self.body.take() {
            Some(RequestBody::Multipart(form)) => form,
            _ => MultipartBody::default(),
        };
        update(&mut form);
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns true if the request carries file payloads.
    pub fn has_files(&self) -> bool {
        matches!(self.body, Some(RequestBody::Multipart(ref form)) if !form.files.is_empty())
    }

    /// Returns true if the body is multipart.
    pub fn is_multipart(&self) -> bool {
        matches!(self.body, Some(RequestBody::Multipart(_)))
    }
}
