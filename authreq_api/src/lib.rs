//! HTTP request client that injects the session's bearer token and turns
//! failed responses into user-facing notifications.
//!
//! The client is assembled from injected capabilities: a [`Transport`] that
//! performs the exchange, a [`SessionStore`] holding the token, a [`Notifier`]
//! for error toasts, and a [`Navigator`] used to send the user back to the
//! login route when the server rejects the session.

mod client;
pub mod config;
mod errors;
pub mod handler;
mod interceptor;
pub mod notify;
mod options;
mod response;
pub mod session;
pub mod status;
mod transport;
mod user_agent;

pub use self::client::Client;
pub use self::config::ClientConfig;
pub use self::errors::{Error, ErrorBodyError};
pub use self::handler::{ErrorContext, ErrorHandler};
pub use self::interceptor::{BearerAuth, RequestInterceptor};
pub use self::notify::{Navigator, Notifier, TracingNavigator, TracingNotifier};
pub use self::options::{resolve_url, Body, Credentials, RequestOptions};
pub use self::response::Response;
pub use self::session::{KeyValueStore, MemoryStore, SessionStore, StoredSession};
pub use self::status::{status_message, FailureKind, NETWORK_FAILURE_MESSAGE};
pub use self::transport::{HttpRequest, ReqwestTransport, Transport};
pub use reqwest::{Method, StatusCode};
