//! Status-code-to-message table and failure classification.

/// Shown when a request produced no response at all.
pub const NETWORK_FAILURE_MESSAGE: &str =
    "Your network is abnormal and cannot connect to the server.";

/// Fixed display messages, sorted by status code.
const CODE_MESSAGES: &[(u16, &str)] = &[
    (200, "The server successfully returned the requested data."),
    (201, "Data was created or modified successfully."),
    (202, "A request has entered the background queue (asynchronous task)."),
    (204, "Data was deleted successfully."),
    (
        400,
        "The request was invalid; the server did not create or modify any data.",
    ),
    (
        401,
        "The user is not authorized (invalid token, username or password).",
    ),
    (403, "The user is authorized, but access is forbidden."),
    (
        404,
        "The request targeted a record that does not exist; the server did nothing.",
    ),
    (406, "The requested format is not available."),
    (
        410,
        "The requested resource has been permanently deleted and will not be available again.",
    ),
    (422, "A validation error occurred while creating an object."),
    (500, "An error occurred on the server; please check the server."),
    (502, "Gateway error."),
    (
        503,
        "The service is unavailable; the server is temporarily overloaded or under maintenance.",
    ),
    (504, "Gateway timeout."),
];

/// Looks up the fixed display message for `status`.
pub fn status_message(status: u16) -> Option<&'static str> {
    CODE_MESSAGES
        .binary_search_by_key(&status, |(code, _)| *code)
        .ok()
        .map(|idx| CODE_MESSAGES[idx].1)
}

/// How a non-success response is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 422: field errors are appended to the message.
    Validation,
    /// 400: the body's `message` is appended.
    BadRequest,
    /// 401: the body's `message` is appended and the session is invalidated.
    Unauthorized,
    /// Anything else: the table message or the status text alone.
    Other,
}

impl FailureKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            422 => FailureKind::Validation,
            400 => FailureKind::BadRequest,
            401 => FailureKind::Unauthorized,
            _ => FailureKind::Other,
        }
    }
}
