//! Response types.
//!
//! [`WireResponse`] is what a transport produces for one attempt; it is
//! consumed exactly once by the pipeline. [`NetworkResult`] is the pipeline's
//! normalized, immutable output.

use super::cache::legacy_header_map;
use super::header::{Header, find_header};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;
use tokio::io::AsyncRead;

/// Boxed readable body stream.
pub type BodyReader = Pin<Box<dyn AsyncRead + Send>>;

/// Body of a [`WireResponse`].
pub enum ResponseBody {
    /// No body (e.g. `204 No Content`).
    Empty,
    /// Fully received body bytes.
    Bytes(Bytes),
    /// An open stream. Dropping it releases the underlying connection.
    Stream {
        reader: BodyReader,
        /// Declared length, `None` when unknown.
        content_length: Option<u64>,
    },
}

impl ResponseBody {
    pub fn stream(reader: impl AsyncRead + Send + 'static, content_length: Option<u64>) -> Self {
        Self::Stream {
            reader: Box::pin(reader),
            content_length,
        }
    }

    /// Declared length when known.
    pub fn content_length(&self) -> Option<u64> {
        match self {
            Self::Empty => Some(0),
            Self::Bytes(bytes) => Some(bytes.len() as u64),
            Self::Stream { content_length, .. } => *content_length,
        }
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Stream { content_length, .. } => f
                .debug_struct("Stream")
                .field("content_length", content_length)
                .finish_non_exhaustive(),
        }
    }
}

/// Raw response of a single transport attempt.
#[derive(Debug)]
pub struct WireResponse {
    pub status: u16,
    pub headers: Vec<Header>,
    pub body: ResponseBody,
}

impl WireResponse {
    /// Response without a body.
    pub fn empty(status: u16, headers: Vec<Header>) -> Self {
        Self {
            status,
            headers,
            body: ResponseBody::Empty,
        }
    }

    /// Response whose body was already received in full.
    pub fn with_bytes(status: u16, headers: Vec<Header>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: ResponseBody::Bytes(body.into()),
        }
    }

    /// Response whose body is still to be read.
    pub fn with_stream(
        status: u16,
        headers: Vec<Header>,
        reader: impl AsyncRead + Send + 'static,
        content_length: Option<u64>,
    ) -> Self {
        Self {
            status,
            headers,
            body: ResponseBody::stream(reader, content_length),
        }
    }
}

/// Normalized result of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkResult {
    /// HTTP status code.
    pub status: u16,
    /// Body bytes; empty for no-content responses, never absent.
    pub data: Bytes,
    /// `true` when this is a 304 revalidation of a cached entry.
    pub not_modified: bool,
    /// Wall time of the attempt that produced this result.
    pub network_time: Duration,
    /// Headers exposed to the caller.
    pub headers: Vec<Header>,
}

impl NetworkResult {
    pub fn new(
        status: u16,
        data: Bytes,
        not_modified: bool,
        network_time: Duration,
        headers: Vec<Header>,
    ) -> Self {
        Self {
            status,
            data,
            not_modified,
            network_time,
            headers,
        }
    }

    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name).map(|h| h.value.as_str())
    }

    /// Headers collapsed into a map; repeated names keep the last value.
    pub fn headers_map(&self) -> BTreeMap<String, String> {
        legacy_header_map(&self.headers)
    }
}
