//! Pluggable HTTP transport and its `reqwest` implementation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::HeaderMap;
use reqwest::Method;
use url::Url;

use crate::{options::Body, user_agent::get_user_agent, Error, Response};

/// A request after interception, ready for the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Body,
    /// Whether the cookie jar is attached, resolved from the credentials policy.
    pub send_cookies: bool,
}

/// Performs a single HTTP exchange.
///
/// An `Err` means no response was received. Any status code, success or not,
/// comes back as `Ok`.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<Response, Error>> + Send;
}

/// Default transport backed by `reqwest`.
///
/// Holds two clients that share one cookie jar: one stores and sends cookies,
/// the other never touches the jar.
pub struct ReqwestTransport {
    with_cookies: reqwest::Client,
    without_cookies: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let jar = Arc::new(Jar::default());
        let build = |jar: Option<Arc<Jar>>| {
            let builder = reqwest::Client::builder()
                .user_agent(get_user_agent())
                .timeout(timeout);
            let builder = match jar {
                Some(jar) => builder.cookie_provider(jar),
                None => builder,
            };
            builder.build().map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::Network(e.to_string())
            })
        };
        Ok(Self {
            with_cookies: build(Some(jar))?,
            without_cookies: build(None)?,
        })
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<Response, Error> {
        let client = if request.send_cookies {
            &self.with_cookies
        } else {
            &self.without_cookies
        };
        let builder = client
            .request(request.method, request.url)
            .headers(request.headers);
        let builder = match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Text(text) => builder.body(text),
            Body::Form(fields) => builder.form(&fields),
        };

        let resp = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request: {}", e);
            Error::Network(e.to_string())
        })?;

        let status = resp.status();
        let status_text = reason_phrase(&resp);
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::Network(e.to_string())
        })?;

        Ok(Response {
            status,
            status_text,
            headers,
            body: body.to_vec(),
        })
    }
}

/// The reason phrase the server actually sent. hyper only records it when it
/// differs from the canonical one, so the canonical reason fills the gap.
fn reason_phrase(resp: &reqwest::Response) -> String {
    match resp.extensions().get::<hyper::ext::ReasonPhrase>() {
        Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
        None => resp
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
    }
}
