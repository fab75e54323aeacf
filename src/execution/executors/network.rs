//! Request Execution Pipeline
//!
//! `BasicNetwork` issues attempts through an [`HttpTransport`], normalizes the
//! [`WireResponse`] into a [`NetworkResult`], reconciles `304 Not Modified`
//! with the request's cache entry, and routes failures through the request's
//! retry policy.
//!
//! Per attempt:
//! 1. Build conditional headers from the cache entry
//! 2. Call the transport
//! 3. 304: emit the cached body with merged headers (terminal)
//! 4. Otherwise materialize the body and emit diagnostics
//! 5. Non-2xx: classify and either retry or fail (terminal for the attempt)
//! 6. 2xx: emit the result
//!
//! Attempts of one request run strictly one after another; the completion of
//! a request fires exactly once.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::FutureExt;
use tokio::runtime::Handle;

use super::materialize::materialize;
use crate::error::{NetworkError, TransportError};
use crate::execution::http::headers::{cache_headers, combine_headers};
use crate::execution::http::transport::{
    BlockingHttpTransport, BlockingTransportAdapter, HttpTransport,
};
use crate::traits::AsyncNetwork;
use crate::types::{NetworkConfig, NetworkResult, Request, WireResponse};
use crate::utils::{BlockingAdapter, BufferPool, Completion, DispatchPool};

/// Outcome delivered to an [`AsyncNetwork`] completion.
pub type NetworkOutcome = Result<NetworkResult, NetworkError>;

const HTTP_NOT_MODIFIED: u16 = 304;

/// Why an attempt is being retried; used as the marker prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryReason {
    Socket,
    Connection,
    Auth,
    Server,
}

impl RetryReason {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Socket => "socket",
            Self::Connection => "connection",
            Self::Auth => "auth",
            Self::Server => "server",
        }
    }
}

enum Attempt {
    Complete(NetworkOutcome),
    Retry {
        reason: RetryReason,
        error: NetworkError,
    },
}

/// Shared, immutable part of the network.
struct Pipeline {
    transport: Arc<dyn HttpTransport>,
    pool: Arc<BufferPool>,
    config: NetworkConfig,
}

impl Pipeline {
    async fn execute(&self, request: &Arc<Request>) -> NetworkOutcome {
        loop {
            match self.attempt(request).await {
                Attempt::Complete(outcome) => return outcome,
                Attempt::Retry { reason, error } => {
                    self.attempt_retry(reason, request, error).await?;
                }
            }
        }
    }

    async fn attempt(&self, request: &Arc<Request>) -> Attempt {
        let additional_headers = cache_headers(request.cache_entry());
        let start = Instant::now();
        match self
            .transport
            .execute_request(request, &additional_headers)
            .await
        {
            Ok(response) => self.on_response(request, start, response).await,
            Err(error) => self.on_transport_error(request, start, error),
        }
    }

    async fn on_response(&self, request: &Request, start: Instant, response: WireResponse) -> Attempt {
        let WireResponse {
            status,
            headers,
            body,
        } = response;

        if status == HTTP_NOT_MODIFIED {
            drop(body);
            let elapsed = start.elapsed();
            let result = match request.cache_entry() {
                None => NetworkResult::new(status, Bytes::new(), true, elapsed, headers),
                Some(entry) => {
                    let combined = combine_headers(&headers, entry);
                    NetworkResult::new(status, entry.data.clone(), true, elapsed, combined)
                }
            };
            return Attempt::Complete(Ok(result));
        }

        let data = match materialize(body, &self.pool).await {
            Ok(data) => data,
            Err(error) => {
                tracing::warn!(
                    request_id = %request.id(),
                    url = request.url(),
                    status,
                    error = %error,
                    "failed to read response body"
                );
                return Attempt::Complete(Err(error));
            }
        };

        let lifetime = start.elapsed();
        self.log_slow_request(request, lifetime, &data, status);

        let result = NetworkResult::new(status, data, false, lifetime, headers);
        if !(200..=299).contains(&status) {
            return self.on_error_status(request, result);
        }
        Attempt::Complete(Ok(result))
    }

    fn on_error_status(&self, request: &Request, result: NetworkResult) -> Attempt {
        let status = result.status;
        tracing::warn!(
            request_id = %request.id(),
            url = request.url(),
            status,
            "unexpected response code"
        );
        match status {
            401 | 403 => Attempt::Retry {
                reason: RetryReason::Auth,
                error: NetworkError::auth_failure(result),
            },
            400..=499 => Attempt::Complete(Err(NetworkError::Client { response: result })),
            500..=599 if request.should_retry_server_errors() => Attempt::Retry {
                reason: RetryReason::Server,
                error: NetworkError::Server { response: result },
            },
            // 5xx without opt-in, or an unhandled 1xx/3xx: no reason to retry
            _ => Attempt::Complete(Err(NetworkError::Server { response: result })),
        }
    }

    fn on_transport_error(&self, request: &Request, start: Instant, error: TransportError) -> Attempt {
        tracing::debug!(
            request_id = %request.id(),
            url = request.url(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            error = %error,
            "transport error"
        );
        match error {
            TransportError::Timeout(_) => Attempt::Retry {
                reason: RetryReason::Socket,
                error: NetworkError::Timeout,
            },
            TransportError::MalformedUrl(message) => {
                tracing::error!(url = request.url(), %message, "bad url");
                Attempt::Complete(Err(NetworkError::BadUrl {
                    url: request.url().to_string(),
                    message,
                }))
            }
            TransportError::AuthFailure(message) => {
                Attempt::Complete(Err(NetworkError::AuthFailure {
                    message,
                    response: None,
                }))
            }
            cause @ (TransportError::Connect(_) | TransportError::Io(_)) => Attempt::Retry {
                reason: RetryReason::Connection,
                error: NetworkError::NoConnection { cause },
            },
        }
    }

    /// Consult the retry policy. `Ok` means the next attempt may start.
    async fn attempt_retry(
        &self,
        reason: RetryReason,
        request: &Request,
        error: NetworkError,
    ) -> Result<(), NetworkError> {
        let old_timeout = request.timeout().as_millis();
        let decision =
            request.with_retry_policy(|policy| policy.retry(&error).map(|()| policy.backoff_delay()));

        match decision {
            Err(terminal) => {
                request.add_marker(format!(
                    "{}-timeout-giveup [timeout={old_timeout}]",
                    reason.as_str()
                ));
                Err(terminal)
            }
            Ok(delay) => {
                request.add_marker(format!("{}-retry [timeout={old_timeout}]", reason.as_str()));
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(())
            }
        }
    }

    fn log_slow_request(&self, request: &Request, lifetime: Duration, data: &Bytes, status: u16) {
        let slow = lifetime > self.config.slow_request_threshold;
        if !slow && !self.config.debug {
            return;
        }
        let lifetime_ms = lifetime.as_millis() as u64;
        let retry_count = request.retry_count();
        if slow {
            tracing::warn!(
                request_id = %request.id(),
                url = request.url(),
                lifetime_ms,
                size = data.len(),
                status,
                retry_count,
                "slow http response"
            );
        } else {
            tracing::debug!(
                request_id = %request.id(),
                url = request.url(),
                lifetime_ms,
                size = data.len(),
                status,
                retry_count,
                "http response"
            );
        }
    }
}

enum Dispatch {
    Handle(Handle),
    Owned(DispatchPool),
}

impl Dispatch {
    fn handle(&self) -> &Handle {
        match self {
            Self::Handle(handle) => handle,
            Self::Owned(pool) => pool.handle(),
        }
    }
}

/// The request execution pipeline.
pub struct BasicNetwork {
    pipeline: Arc<Pipeline>,
    dispatch: Dispatch,
}

impl BasicNetwork {
    /// Pipeline over `transport`, dispatching on `handle`, with default config.
    pub fn new(transport: impl HttpTransport + 'static, handle: Handle) -> Self {
        Self::builder(transport).finish(Dispatch::Handle(handle))
    }

    /// Pipeline over a blocking transport, wrapped once here.
    pub fn with_blocking_transport(
        transport: impl BlockingHttpTransport,
        handle: Handle,
    ) -> Self {
        Self::new(BlockingTransportAdapter::new(transport), handle)
    }

    pub fn builder(transport: impl HttpTransport + 'static) -> BasicNetworkBuilder {
        BasicNetworkBuilder::new(Arc::new(transport))
    }

    /// Run a request to completion on the current task.
    pub async fn execute(&self, request: &Arc<Request>) -> NetworkOutcome {
        self.pipeline.execute(request).await
    }

    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pipeline.pool
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.pipeline.config
    }

    /// Runtime handle continuations run on.
    pub fn handle(&self) -> &Handle {
        self.dispatch.handle()
    }

    /// Blocking bridge bound to this network's runtime and configured wait.
    pub fn blocking_adapter(&self) -> BlockingAdapter {
        BlockingAdapter::new(self.handle().clone()).with_timeout(self.config().blocking_timeout)
    }
}

impl fmt::Debug for BasicNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicNetwork")
            .field("config", &self.pipeline.config)
            .field("owns_dispatch_pool", &matches!(self.dispatch, Dispatch::Owned(_)))
            .finish_non_exhaustive()
    }
}

impl AsyncNetwork for BasicNetwork {
    fn perform_request(&self, request: Arc<Request>, completion: Completion<NetworkOutcome>) {
        let pipeline = self.pipeline.clone();
        self.handle().spawn(async move {
            let outcome = AssertUnwindSafe(pipeline.execute(&request))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| {
                    let message = panic_message(&*panic);
                    tracing::error!(
                        request_id = %request.id(),
                        url = request.url(),
                        %message,
                        "request pipeline panicked"
                    );
                    Err(NetworkError::Internal(format!("request pipeline panicked: {message}")))
                });
            completion.complete(outcome);
        });
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Builder for [`BasicNetwork`].
pub struct BasicNetworkBuilder {
    transport: Arc<dyn HttpTransport>,
    pool: Option<Arc<BufferPool>>,
    config: NetworkConfig,
    handle: Option<Handle>,
}

impl BasicNetworkBuilder {
    fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            pool: None,
            config: NetworkConfig::default(),
            handle: None,
        }
    }

    /// Share an existing buffer pool; otherwise one is built from the config.
    pub fn pool(mut self, pool: Arc<BufferPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn config(mut self, config: NetworkConfig) -> Self {
        self.config = config;
        self
    }

    /// Dispatch on an existing runtime instead of an owned pool.
    pub fn handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Build the network. Without a handle, an owned [`DispatchPool`] with
    /// `config.dispatch_threads` workers is started.
    pub fn build(mut self) -> std::io::Result<BasicNetwork> {
        let dispatch = match self.handle.take() {
            Some(handle) => Dispatch::Handle(handle),
            None => Dispatch::Owned(DispatchPool::new(self.config.dispatch_threads)?),
        };
        Ok(self.finish(dispatch))
    }

    fn finish(self, dispatch: Dispatch) -> BasicNetwork {
        let pool = self
            .pool
            .unwrap_or_else(|| Arc::new(BufferPool::new(self.config.pool_size_limit)));
        BasicNetwork {
            pipeline: Arc::new(Pipeline {
                transport: self.transport,
                pool,
                config: self.config,
            }),
            dispatch,
        }
    }
}
