//! Callback completions and the blocking bridge.
//!
//! [`Completion`] is the single-use callback handed to asynchronous
//! capabilities: it is consumed by value, so it can fire at most once.
//! [`BlockingAdapter`] lets synchronous callers drive such a capability by
//! parking on a one-shot channel until the completion fires.

use std::fmt;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;

/// One-shot completion callback.
pub struct Completion<T> {
    callback: Box<dyn FnOnce(T) + Send>,
}

impl<T: Send + 'static> Completion<T> {
    pub fn new(callback: impl FnOnce(T) + Send + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }

    /// A completion that delivers into a one-shot channel.
    ///
    /// Dropping the completion without calling [`complete`](Self::complete)
    /// closes the channel.
    pub fn channel() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        let completion = Self::new(move |value| {
            // receiver gone: the caller stopped waiting
            let _ = tx.send(value);
        });
        (completion, rx)
    }

    /// Deliver the value.
    pub fn complete(self, value: T) {
        (self.callback)(value);
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}

/// Blocking bridge onto callback-based operations.
///
/// The adapter parks the calling thread on a runtime [`Handle`]. It must be
/// called from a thread that is not driving that runtime's tasks, and a
/// bounded wait needs a multi-thread runtime to drive the timer.
#[derive(Debug, Clone)]
pub struct BlockingAdapter {
    handle: Handle,
    timeout: Option<Duration>,
}

impl BlockingAdapter {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            timeout: None,
        }
    }

    /// Stop waiting after `timeout`; `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Start `operation` and block until it completes.
    ///
    /// Returns `None` when the operation dropped its completion without
    /// firing it, or when the configured timeout elapsed.
    pub fn call_blocking<T, F>(&self, operation: F) -> Option<T>
    where
        T: Send + 'static,
        F: FnOnce(Completion<T>),
    {
        let (completion, rx) = Completion::channel();
        operation(completion);

        let timeout = self.timeout;
        let outcome = self.handle.block_on(async move {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, rx).await.ok(),
                None => Some(rx.await),
            }
        });

        match outcome {
            Some(Ok(value)) => Some(value),
            Some(Err(_)) => {
                tracing::debug!("completion dropped before delivering a value");
                None
            }
            None => {
                tracing::warn!(
                    timeout_ms = timeout.map(|t| t.as_millis() as u64),
                    "gave up waiting for completion"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Instant;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap()
    }

    #[test]
    fn returns_value_after_delayed_delivery() {
        let rt = runtime();
        let adapter = BlockingAdapter::new(rt.handle().clone());
        let delivered = Arc::new(AtomicBool::new(false));
        let flag = delivered.clone();

        let start = Instant::now();
        let value = adapter.call_blocking(|completion: Completion<u32>| {
            rt.spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                flag.store(true, Ordering::SeqCst);
                completion.complete(42);
            });
        });

        assert_eq!(value, Some(42));
        assert!(delivered.load(Ordering::SeqCst));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn dropped_completion_yields_none() {
        let rt = runtime();
        let adapter = BlockingAdapter::new(rt.handle().clone());
        let value: Option<u32> = adapter.call_blocking(drop);
        assert_eq!(value, None);
    }

    #[test]
    fn bounded_wait_gives_up() {
        let rt = runtime();
        let adapter =
            BlockingAdapter::new(rt.handle().clone()).with_timeout(Some(Duration::from_millis(20)));
        let mut parked = None;
        let value: Option<u32> = adapter.call_blocking(|completion| parked = Some(completion));
        assert_eq!(value, None);
        // a late delivery after giving up is harmless
        if let Some(completion) = parked {
            completion.complete(1);
        }
    }

    #[test]
    fn completion_fires_its_callback() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let completion = Completion::new(move |v: bool| flag.store(v, Ordering::SeqCst));
        completion.complete(true);
        assert!(fired.load(Ordering::SeqCst));
    }
}
