//! Default values shared across the crate.

/// Pipeline diagnostics defaults
pub mod network {
    use std::time::Duration;

    /// Requests slower than this emit a diagnostic record.
    pub const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_millis(3000);

    /// Byte budget of the default buffer pool.
    pub const POOL_SIZE_LIMIT: usize = 4096;

    /// Worker threads of an owned dispatch pool.
    pub const DISPATCH_THREADS: usize = 1;

    /// Thread name used by owned dispatch pools.
    pub const DISPATCH_THREAD_NAME: &str = "fetchline-dispatch";
}

/// Retry policy defaults
pub mod retry {
    use std::time::Duration;

    pub const INITIAL_TIMEOUT: Duration = Duration::from_millis(2500);
    pub const MAX_RETRIES: u32 = 1;
    pub const BACKOFF_MULTIPLIER: f32 = 1.0;
}

/// Body materialization defaults
pub mod body {
    /// Size of the scratch buffer used to drain a response stream.
    pub const READ_CHUNK: usize = 1024;

    /// Minimum initial capacity of the accumulation buffer.
    pub const MIN_ACCUMULATOR: usize = 256;

    /// Cap on how much a declared content length may preallocate.
    pub const MAX_PREALLOC: usize = 1 << 20;
}
