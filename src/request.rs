//! [`RequestRecord`]: the immutable, canonical description of one HTTP
//! request to be driven concurrently (§3).

use std::time::Duration;

use serde_json::Value;

/// HTTP method of a [`RequestRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl Method {
    /// Uppercase method name, as used for fingerprinting (§4.2) and wire
    /// transmission.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Head => reqwest::Method::HEAD,
        }
    }
}

/// Request body. `Raw` and `Json` are mutually exclusive on the wire; if a
/// caller somehow builds a record with both, [`Body`] itself makes that
/// unrepresentable, so the `body_raw`-wins rule from §3 is enforced by
/// construction rather than at send time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    /// No body.
    #[default]
    None,
    /// Opaque bytes (or a UTF-8 string encoded as bytes), sent as-is.
    Raw(Vec<u8>),
    /// A structured value, JSON-encoded at send time.
    Json(Value),
}

/// An ordered name/value mapping that preserves insertion order and allows
/// repeated keys (headers may repeat; query params may repeat). Plain
/// `Vec` rather than a map type, matching the "ordered mapping... repetition
/// allowed" wording in §3.
pub type OrderedPairs = Vec<(String, String)>;

/// Immutable description of one HTTP request (§3).
///
/// Constructing a `RequestRecord` never fails, even with a malformed URL —
/// the URL is only parsed when the request is actually sent (§3 invariant).
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub method: Method,
    pub url: String,
    pub headers: OrderedPairs,
    pub params: OrderedPairs,
    pub body: Body,
    pub timeout_seconds: Option<u64>,
}

impl RequestRecord {
    /// Create a request with no headers, params, body, or explicit timeout.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            params: Vec::new(),
            body: Body::None,
            timeout_seconds: None,
        }
    }

    pub fn with_headers(mut self, headers: OrderedPairs) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_params(mut self, params: OrderedPairs) -> Self {
        self.params = params;
        self
    }

    pub fn with_raw_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Body::Raw(body.into());
        self
    }

    pub fn with_json_body(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Effective timeout: the request's own, or the driver's default.
    pub fn timeout(&self, default: Duration) -> Duration {
        self.timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(default)
    }
}
