//! Error types for the request client.

/// Errors that can occur when issuing a request.
///
/// Every variant except [`Error::HttpStatus`] and [`Error::Decode`] means no
/// response was received: the caller gets nothing to inspect, and the user has
/// already been told the network is unreachable.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request URL could not be parsed or joined onto the base URL.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
    /// A caller-supplied or interceptor-supplied header was not valid HTTP.
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
    /// The transport failed before a response arrived (DNS, connect, timeout).
    #[error("Network error: {0}")]
    Network(String),
    /// The server answered with a non-success status. Only produced by the
    /// typed helpers such as `get_json`; `request` returns the response itself.
    #[error("Request failed with status {status}: {message}")]
    HttpStatus { status: u16, message: String },
    /// A success response body could not be deserialized.
    #[error("Failed to decode response body: {0}")]
    Decode(String),
}

impl Error {
    /// Returns `true` when no response was received at all.
    pub fn is_no_response(&self) -> bool {
        matches!(
            self,
            Error::InvalidUrl(_) | Error::InvalidHeader { .. } | Error::Network(_)
        )
    }
}

/// Error-body parse failures. Handled locally by the error handler, which
/// falls back to the bare status message.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ErrorBodyError {
    /// The body was not JSON, or lacked the expected field.
    #[error("Malformed error body: {0}")]
    Malformed(String),
}
