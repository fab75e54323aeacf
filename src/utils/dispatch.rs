//! Owned worker pool for pipeline continuations.

use tokio::runtime::{Builder, Handle, Runtime};

/// Small multi-thread runtime owned by the component that builds it.
///
/// Sized for dispatching continuations, not for raw I/O concurrency. The
/// runtime is shut down in the background when the pool is dropped.
#[derive(Debug)]
pub struct DispatchPool {
    runtime: Option<Runtime>,
    handle: Handle,
}

impl DispatchPool {
    pub fn new(threads: usize) -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(threads.max(1))
            .thread_name(crate::defaults::network::DISPATCH_THREAD_NAME)
            .enable_all()
            .build()?;
        let handle = runtime.handle().clone();
        tracing::debug!(threads, "dispatch pool started");
        Ok(Self {
            runtime: Some(runtime),
            handle,
        })
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Drop for DispatchPool {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
            tracing::debug!("dispatch pool shut down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_tasks_on_named_workers() {
        let pool = DispatchPool::new(1).unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        pool.handle().spawn(async move {
            let name = std::thread::current().name().map(str::to_owned);
            let _ = tx.send(name);
        });
        let name = rx.recv().unwrap();
        assert_eq!(name.as_deref(), Some("fetchline-dispatch"));
    }
}
