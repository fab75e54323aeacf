//! Utility modules

pub mod blocking;
pub mod buffer_pool;
pub mod dispatch;

pub use blocking::{BlockingAdapter, Completion};
pub use buffer_pool::{BufferPool, PooledBuffer, PooledWriter};
pub use dispatch::DispatchPool;
