//! Per-request options: method, headers, body, query params and credentials policy.

use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::Error;

/// Whether the transport's cookie jar is attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Credentials {
    /// Always send cookies.
    #[default]
    Include,
    /// Send cookies only when the request targets the base URL's origin.
    SameOrigin,
    /// Never send cookies.
    Omit,
}

impl Credentials {
    /// Resolves the policy for a concrete request URL.
    pub fn sends_cookies(&self, url: &Url, base: Option<&Url>) -> bool {
        match self {
            Credentials::Include => true,
            Credentials::Omit => false,
            Credentials::SameOrigin => base.is_some_and(|b| b.origin() == url.origin()),
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(serde_json::Value),
    Text(String),
    Form(Vec<(String, String)>),
}

/// Options accepted by [`Client::request`](crate::Client::request).
///
/// Headers keep their insertion order. Header names compare
/// case-insensitively, so setting `authorization` replaces `Authorization`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Body,
    pub params: Vec<(String, String)>,
    pub credentials: Credentials,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Adds a header, replacing any existing header with the same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Serializes `value` as the JSON body.
    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, Error> {
        let value = serde_json::to_value(value).map_err(|e| Error::Decode(e.to_string()))?;
        self.body = Body::Json(value);
        Ok(self)
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.body = Body::Text(text.to_string());
        self
    }

    pub fn with_form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = Body::Form(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    /// Sets a header in place. Later writers win.
    pub fn set_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Resolves `target` against `base`: absolute `http(s)` URLs pass through,
/// anything else is appended to the base URL.
pub fn resolve_url(
    base: Option<&Url>,
    target: &str,
    params: &[(String, String)],
) -> Result<Url, Error> {
    let mut url = if target.starts_with("http://") || target.starts_with("https://") {
        Url::parse(target).map_err(|e| Error::InvalidUrl(format!("{}: {}", target, e)))?
    } else {
        let base = base.ok_or_else(|| {
            Error::InvalidUrl(format!("{}: relative URL without a base URL", target))
        })?;
        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            target.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| Error::InvalidUrl(format!("{}: {}", joined, e)))?
    };
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.iter());
    }
    Ok(url)
}
