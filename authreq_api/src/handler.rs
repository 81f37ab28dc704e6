//! Failure handling: message composition and the session-invalidation side effect.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::{
    errors::ErrorBodyError,
    notify::{Navigator, Notifier},
    session::SessionStore,
    status::{status_message, FailureKind, NETWORK_FAILURE_MESSAGE},
    Response,
};

/// Everything known about one failed response while it is being handled.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    pub status: u16,
    pub status_text: String,
    pub kind: FailureKind,
    /// Parsed body, when it was valid JSON.
    pub body: Option<Value>,
    /// Final text shown to the user.
    pub message: String,
}

impl ErrorContext {
    /// Builds the display message for a non-success response.
    ///
    /// A body that does not match the expected shape leaves the base message
    /// unchanged; it never aborts handling.
    pub fn from_response(response: &Response) -> Self {
        let status = response.status.as_u16();
        let kind = FailureKind::from_status(status);
        let mut message = status_message(status)
            .map(str::to_string)
            .unwrap_or_else(|| response.status_text.clone());

        let body = serde_json::from_slice::<Value>(&response.body).ok();
        let detail = match kind {
            FailureKind::Validation => Some(parse_body(body.as_ref()).and_then(validation_errors)),
            FailureKind::BadRequest | FailureKind::Unauthorized => {
                Some(parse_body(body.as_ref()).and_then(body_message))
            }
            FailureKind::Other => None,
        };
        match detail {
            Some(Ok(detail)) => message.push_str(&format!("[ {} ]", detail)),
            Some(Err(e)) => tracing::warn!("Status {}: {}", status, e),
            None => {}
        }

        Self {
            status,
            status_text: response.status_text.clone(),
            kind,
            body,
            message,
        }
    }
}

fn parse_body(body: Option<&Value>) -> Result<&Value, ErrorBodyError> {
    body.ok_or_else(|| ErrorBodyError::Malformed("body is not JSON".to_string()))
}

/// Extracts `message` from a 400/401 body.
pub fn body_message(body: &Value) -> Result<String, ErrorBodyError> {
    match body.get("message") {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(ErrorBodyError::Malformed(
            "missing `message` field".to_string(),
        )),
        Some(other) => Ok(other.to_string()),
    }
}

/// Concatenates the first message of each field in a 422 `errors` object,
/// ordered by field name. An `errors` array is read in index order.
pub fn validation_errors(body: &Value) -> Result<String, ErrorBodyError> {
    let first = |messages: &Value| -> String {
        match messages {
            Value::Array(items) => items.first().map(value_text).unwrap_or_default(),
            other => value_text(other),
        }
    };
    match body.get("errors") {
        Some(Value::Object(fields)) => {
            let ordered: BTreeMap<&String, &Value> = fields.iter().collect();
            Ok(ordered.values().map(|v| first(*v)).collect())
        }
        Some(Value::Array(items)) => Ok(items.iter().map(first).collect()),
        _ => Err(ErrorBodyError::Malformed(
            "missing `errors` object".to_string(),
        )),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Reports failures to the user and invalidates the session on 401.
#[derive(Clone)]
pub struct ErrorHandler {
    session: Arc<dyn SessionStore>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl ErrorHandler {
    pub fn new(
        session: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        login_path: &str,
    ) -> Self {
        Self {
            session,
            notifier,
            navigator,
            login_path: login_path.to_string(),
        }
    }

    /// No response arrived.
    pub fn handle_network_failure(&self) {
        self.notifier.error(NETWORK_FAILURE_MESSAGE);
    }

    /// A non-success response arrived. Returns the context that was reported.
    pub fn handle_response(&self, response: &Response) -> ErrorContext {
        let ctx = ErrorContext::from_response(response);
        tracing::debug!("Request failed with status {}: {}", ctx.status, ctx.message);

        if ctx.kind == FailureKind::Unauthorized {
            self.session.clear();
            self.navigator.replace(&self.login_path);
        }

        self.notifier.error(&ctx.message);
        ctx
    }
}
