//! Authenticated request client: interception, transport, and failure handling.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::{
    config::ClientConfig,
    handler::{ErrorContext, ErrorHandler},
    interceptor::{BearerAuth, RequestInterceptor},
    notify::{Navigator, Notifier, TracingNavigator, TracingNotifier},
    options::resolve_url,
    session::SessionStore,
    transport::{HttpRequest, ReqwestTransport, Transport},
    Error, RequestOptions, Response,
};

/// HTTP client that attaches the session's bearer token to every request and
/// reports failures to the user.
///
/// Failures never surface as panics or hidden retries. A request that gets no
/// response notifies the user and returns `Err`. A non-success response
/// notifies the user (and on 401 clears the session and redirects to the login
/// route), then is returned as `Ok` so the caller can still inspect it.
pub struct Client<T = ReqwestTransport> {
    transport: T,
    config: ClientConfig,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
    auth: BearerAuth,
    handler: ErrorHandler,
}

impl Client<ReqwestTransport> {
    /// Creates a client with the default configuration and `reqwest` transport.
    pub fn new(session: Arc<dyn SessionStore>) -> Result<Self, Error> {
        Self::from_config(ClientConfig::default(), session)
    }

    /// Creates a client that resolves relative URLs against `base_url`.
    pub fn with_base_url(base_url: &str, session: Arc<dyn SessionStore>) -> Result<Self, Error> {
        Self::from_config(ClientConfig::default().with_base_url(base_url)?, session)
    }

    pub fn from_config(
        config: ClientConfig,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, Error> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(transport, config, session))
    }
}

impl<T: Transport> Client<T> {
    /// Creates a client over a custom transport. Notifications and redirects
    /// go to `tracing` until replaced.
    pub fn with_transport(
        transport: T,
        config: ClientConfig,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        let handler = ErrorHandler::new(
            session.clone(),
            Arc::new(TracingNotifier),
            Arc::new(TracingNavigator),
            &config.login_path,
        );
        Self {
            transport,
            config,
            interceptors: Vec::new(),
            auth: BearerAuth::new(session),
            handler,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.handler.notifier = notifier;
        self
    }

    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.handler.navigator = navigator;
        self
    }

    /// Registers an interceptor. Interceptors run in registration order, and
    /// bearer auth always runs after all of them.
    pub fn with_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issues a request.
    ///
    /// Returns `Err` only when no response was received; non-success
    /// responses are reported and returned as `Ok`.
    pub async fn request(&self, url: &str, options: RequestOptions) -> Result<Response, Error> {
        self.send(url, options).await.map(|(resp, _)| resp)
    }

    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        self.request(url, RequestOptions::new(Method::GET)).await
    }

    pub async fn delete(&self, url: &str) -> Result<Response, Error> {
        self.request(url, RequestOptions::new(Method::DELETE)).await
    }

    pub async fn post(&self, url: &str, options: RequestOptions) -> Result<Response, Error> {
        self.request(url, options.with_method(Method::POST)).await
    }

    pub async fn put(&self, url: &str, options: RequestOptions) -> Result<Response, Error> {
        self.request(url, options.with_method(Method::PUT)).await
    }

    pub async fn patch(&self, url: &str, options: RequestOptions) -> Result<Response, Error> {
        self.request(url, options.with_method(Method::PATCH)).await
    }

    /// GETs `url` and deserializes a success body. Non-success responses are
    /// reported as usual and come back as [`Error::HttpStatus`].
    pub async fn get_json<R: DeserializeOwned>(&self, url: &str) -> Result<R, Error> {
        let (resp, failure) = self.send(url, RequestOptions::new(Method::GET)).await?;
        if let Some(ctx) = failure {
            return Err(Error::HttpStatus {
                status: ctx.status,
                message: ctx.message,
            });
        }
        resp.json()
    }

    async fn send(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<(Response, Option<ErrorContext>), Error> {
        let request = match self.prepare(url, options) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!("Failed to prepare request for {}: {}", url, e);
                self.handler.handle_network_failure();
                return Err(e);
            }
        };
        tracing::debug!("{} {}", request.method, request.url);

        let resp = match self.transport.send(request).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("No response for {}: {}", url, e);
                self.handler.handle_network_failure();
                return Err(e);
            }
        };

        let failure = if resp.is_success() {
            None
        } else {
            Some(self.handler.handle_response(&resp))
        };
        Ok((resp, failure))
    }

    fn prepare(&self, url: &str, options: RequestOptions) -> Result<HttpRequest, Error> {
        let (url, options) = self
            .interceptors
            .iter()
            .fold((url.to_string(), options), |(url, options), interceptor| {
                interceptor.intercept(url, options)
            });
        let (url, options) = self.auth.intercept(url, options);

        let base = self.config.base_url.as_ref();
        let url = resolve_url(base, &url, &options.params)?;
        let headers = build_headers(&options.headers)?;

        Ok(HttpRequest {
            send_cookies: options.credentials.sends_cookies(&url, base),
            method: options.method,
            url,
            headers,
            body: options.body,
        })
    }
}

fn build_headers(headers: &[(String, String)]) -> Result<HeaderMap, Error> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let invalid = |reason: String| Error::InvalidHeader {
            name: name.clone(),
            reason,
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
