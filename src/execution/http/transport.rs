//! HTTP transport abstraction.
//!
//! The pipeline talks to a single asynchronous capability, [`HttpTransport`].
//! A transport that can only block is wrapped once, at construction time, in
//! [`BlockingTransportAdapter`], which implements the same trait by running
//! the blocking call on tokio's blocking thread pool.

use crate::error::TransportError;
use crate::types::{Header, Request, WireResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// Asynchronous wire transport.
///
/// Delivers exactly one [`WireResponse`] or [`TransportError`] per call and
/// may follow redirects internally.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute_request(
        &self,
        request: &Arc<Request>,
        additional_headers: &[Header],
    ) -> Result<WireResponse, TransportError>;
}

/// Blocking wire transport.
pub trait BlockingHttpTransport: Send + Sync + 'static {
    fn execute_request(
        &self,
        request: &Request,
        additional_headers: &[Header],
    ) -> Result<WireResponse, TransportError>;
}

/// Presents a [`BlockingHttpTransport`] as an [`HttpTransport`].
#[derive(Debug)]
pub struct BlockingTransportAdapter<T> {
    inner: Arc<T>,
}

impl<T: BlockingHttpTransport> BlockingTransportAdapter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: BlockingHttpTransport> HttpTransport for BlockingTransportAdapter<T> {
    async fn execute_request(
        &self,
        request: &Arc<Request>,
        additional_headers: &[Header],
    ) -> Result<WireResponse, TransportError> {
        let inner = self.inner.clone();
        let request = request.clone();
        let headers = additional_headers.to_vec();
        tokio::task::spawn_blocking(move || inner.execute_request(&request, &headers))
            .await
            .map_err(|e| TransportError::Io(format!("blocking transport task failed: {e}")))?
    }
}
