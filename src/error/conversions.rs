//! Type Conversions for TransportError
//!
//! From trait implementations for converting common error types into
//! TransportError.

use super::types::TransportError;

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_builder() {
            Self::MalformedUrl(err.to_string())
        } else if err.is_connect() || err.is_request() {
            Self::Connect(err.to_string())
        } else {
            Self::Io(err.to_string())
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => Self::Timeout(err.to_string()),
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::NotConnected => Self::Connect(err.to_string()),
            _ => Self::Io(err.to_string()),
        }
    }
}

impl From<reqwest::header::InvalidHeaderName> for TransportError {
    fn from(err: reqwest::header::InvalidHeaderName) -> Self {
        Self::Io(format!("invalid header name: {err}"))
    }
}

impl From<reqwest::header::InvalidHeaderValue> for TransportError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::Io(format!("invalid header value: {err}"))
    }
}
