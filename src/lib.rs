//! fetchline
//!
//! Client-side HTTP request execution: issues attempts through a pluggable
//! transport, classifies outcomes, drives retry policies, reconciles `304 Not
//! Modified` responses with cached entries, and materializes bodies through a
//! shared buffer pool.
#![deny(unsafe_code)]

pub mod cache;
pub mod defaults;
pub mod error;
pub mod execution;
pub mod retry;
pub mod traits;
pub mod types;
pub mod utils;

pub use cache::InMemoryCache;
pub use error::{ErrorCategory, NetworkError, TransportError};
pub use execution::executors::{BasicNetwork, BasicNetworkBuilder, NetworkOutcome};
pub use execution::http::{
    BlockingHttpTransport, BlockingTransportAdapter, HttpTransport, ReqwestTransport,
};
pub use retry::{BackoffRetryPolicy, DefaultRetryPolicy, RetryPolicy};
pub use traits::{AsyncCache, AsyncNetwork, Cache, Network, SyncCache, SyncNetwork};
pub use types::{
    CacheEntry, Header, NetworkConfig, NetworkResult, Request, ResponseBody, WireResponse,
};
pub use utils::{BlockingAdapter, BufferPool, Completion};
