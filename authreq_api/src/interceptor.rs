//! Request interceptors.

use std::sync::Arc;

use crate::{session::SessionStore, RequestOptions};

/// Transforms a request's URL and options before it is sent.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, url: String, options: RequestOptions) -> (String, RequestOptions);
}

impl<F> RequestInterceptor for F
where
    F: Fn(String, RequestOptions) -> (String, RequestOptions) + Send + Sync,
{
    fn intercept(&self, url: String, options: RequestOptions) -> (String, RequestOptions) {
        self(url, options)
    }
}

/// Sets `Authorization: Bearer <token>` from the session, merging with the
/// caller's headers. A missing token yields `Bearer ` with nothing after it.
pub struct BearerAuth {
    session: Arc<dyn SessionStore>,
}

impl BearerAuth {
    pub fn new(session: Arc<dyn SessionStore>) -> Self {
        Self { session }
    }
}

impl RequestInterceptor for BearerAuth {
    fn intercept(&self, url: String, mut options: RequestOptions) -> (String, RequestOptions) {
        let token = self.session.token().unwrap_or_default();
        options.set_header("Authorization", &format!("Bearer {}", token));
        (url, options)
    }
}
