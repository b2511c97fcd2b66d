//! Transport failure taxonomy.

use super::FetchResponse;
use super::url::UrlError;

/// Errors from a single transport fetch.
///
/// `HttpStatus` carries the full response so callers can surface its body,
/// headers and status exactly like a success.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request URL was rejected before any I/O.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] UrlError),

    /// No response was obtained (DNS, TCP, TLS, timeout, body read).
    #[error("{kind} error: {message}")]
    Connection { kind: ConnectionKind, message: String },

    /// A response arrived with a non-2xx status.
    #[error("HTTP status {}", .0.status.as_u16())]
    HttpStatus(Box<FetchResponse>),
}

/// Coarse classification of connection-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    Timeout,
    Connect,
    Redirect,
    Body,
    Decode,
    Request,
}

impl ConnectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionKind::Timeout => "TIMEOUT",
            ConnectionKind::Connect => "CONNECT",
            ConnectionKind::Redirect => "REDIRECT",
            ConnectionKind::Body => "BODY",
            ConnectionKind::Decode => "DECODE",
            ConnectionKind::Request => "REQUEST",
        }
    }
}

impl std::fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ConnectionKind::Timeout
        } else if err.is_connect() {
            ConnectionKind::Connect
        } else if err.is_redirect() {
            ConnectionKind::Redirect
        } else if err.is_decode() {
            ConnectionKind::Decode
        } else if err.is_body() {
            ConnectionKind::Body
        } else {
            ConnectionKind::Request
        };
        TransportError::Connection { kind, message: err.to_string() }
    }
}

impl TransportError {
    /// Machine-readable code used in error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            TransportError::InvalidUrl(_) => "INVALID_URL",
            TransportError::Connection { kind, .. } => kind.as_str(),
            TransportError::HttpStatus(_) => "HTTP_STATUS",
        }
    }
}
