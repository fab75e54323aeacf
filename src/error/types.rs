//! Core error types.

use crate::types::NetworkResult;
use thiserror::Error;

/// Failure reported by a transport for a single attempt.
///
/// A transport reports one of these when it could not produce a
/// [`WireResponse`](crate::types::WireResponse) at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The attempt did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// No connection could be established, or it dropped before a response.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The target could not be parsed as a URL.
    #[error("malformed url: {0}")]
    MalformedUrl(String),

    /// The transport's credential handling failed before the exchange.
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    /// Any other I/O failure.
    #[error("i/o error: {0}")]
    Io(String),
}

/// Coarse classification of a [`NetworkError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Timeout,
    Connectivity,
    Authentication,
    Client,
    Server,
    Configuration,
    Io,
    Cancelled,
    Internal,
}

/// Terminal or retryable failure of a request.
///
/// Variants that were derived from a received response carry it as a
/// [`NetworkResult`] so callers and retry policies can inspect status,
/// headers and body.
#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    /// The transport timed out.
    #[error("request timed out")]
    Timeout,

    /// No response object could be obtained.
    #[error("no connection: {cause}")]
    NoConnection {
        #[source]
        cause: TransportError,
    },

    /// 401/403, or a credential failure reported by the transport.
    #[error("authentication failure{}", status_suffix(.response))]
    AuthFailure {
        message: String,
        response: Option<NetworkResult>,
    },

    /// 4xx other than 401/403.
    #[error("client error (status {})", .response.status)]
    Client { response: NetworkResult },

    /// 5xx, or any non-2xx status without a dedicated class.
    #[error("server error (status {})", .response.status)]
    Server { response: NetworkResult },

    /// The request target is not a valid URL. Never retried.
    #[error("bad url {url}: {message}")]
    BadUrl { url: String, message: String },

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Io(String),

    /// A blocking caller stopped waiting before a result was delivered.
    #[error("request cancelled before completion")]
    Cancelled,

    /// The pipeline itself failed, e.g. a retry policy panicked.
    #[error("internal error: {0}")]
    Internal(String),
}

fn status_suffix(response: &Option<NetworkResult>) -> String {
    response
        .as_ref()
        .map(|r| format!(" (status {})", r.status))
        .unwrap_or_default()
}

impl NetworkError {
    /// Build an authentication failure from a received response.
    pub fn auth_failure(response: NetworkResult) -> Self {
        Self::AuthFailure {
            message: format!("status {}", response.status),
            response: Some(response),
        }
    }

    /// Error category for this failure.
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Timeout => ErrorCategory::Timeout,
            Self::NoConnection { .. } => ErrorCategory::Connectivity,
            Self::AuthFailure { .. } => ErrorCategory::Authentication,
            Self::Client { .. } => ErrorCategory::Client,
            Self::Server { .. } => ErrorCategory::Server,
            Self::BadUrl { .. } => ErrorCategory::Configuration,
            Self::Io(_) => ErrorCategory::Io,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Whether this failure class is routed through the retry policy by default.
    ///
    /// Server errors are only retried when the request opts in, so they report
    /// `false` here.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::NoConnection { .. } | Self::AuthFailure { .. }
        )
    }

    /// The response this failure was derived from, if any.
    pub fn response(&self) -> Option<&NetworkResult> {
        match self {
            Self::AuthFailure { response, .. } => response.as_ref(),
            Self::Client { response } | Self::Server { response } => Some(response),
            _ => None,
        }
    }

    /// HTTP status code of the underlying response, if any.
    pub fn status_code(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }
}
