//! Network capability traits

use std::sync::Arc;

use crate::error::NetworkError;
use crate::execution::executors::network::{BasicNetwork, NetworkOutcome};
use crate::types::Request;
use crate::utils::{BlockingAdapter, Completion};

/// Callback-based request execution.
///
/// Implementations return immediately and fire `completion` exactly once
/// with the terminal outcome, after any internal retries.
pub trait AsyncNetwork: Send + Sync {
    fn perform_request(&self, request: Arc<Request>, completion: Completion<NetworkOutcome>);
}

/// Blocking request execution.
pub trait Network: Send + Sync {
    fn perform_request(&self, request: &Arc<Request>) -> NetworkOutcome;
}

/// Blocking view of an [`AsyncNetwork`].
#[derive(Debug)]
pub struct SyncNetwork<N> {
    inner: N,
    adapter: BlockingAdapter,
}

impl<N: AsyncNetwork> SyncNetwork<N> {
    pub fn new(inner: N, adapter: BlockingAdapter) -> Self {
        Self { inner, adapter }
    }

    pub fn inner(&self) -> &N {
        &self.inner
    }
}

impl SyncNetwork<BasicNetwork> {
    /// Wrap a [`BasicNetwork`], waiting on its own runtime and honouring its
    /// configured blocking timeout.
    pub fn from_network(network: BasicNetwork) -> Self {
        let adapter = network.blocking_adapter();
        Self::new(network, adapter)
    }
}

impl<N: AsyncNetwork> Network for SyncNetwork<N> {
    fn perform_request(&self, request: &Arc<Request>) -> NetworkOutcome {
        self.adapter
            .call_blocking(|completion| self.inner.perform_request(request.clone(), completion))
            .unwrap_or(Err(NetworkError::Cancelled))
    }
}

impl<N: AsyncNetwork + ?Sized> AsyncNetwork for Arc<N> {
    fn perform_request(&self, request: Arc<Request>, completion: Completion<NetworkOutcome>) {
        (**self).perform_request(request, completion);
    }
}
