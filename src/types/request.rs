//! Request description consumed by the pipeline.

use super::cache::CacheEntry;
use super::header::Header;
use crate::retry::{DefaultRetryPolicy, RetryPolicy};
use bytes::Bytes;
use reqwest::Method;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Diagnostic breadcrumb recorded on a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub name: String,
    /// Time since the request was created.
    pub elapsed: Duration,
}

/// A request to execute.
///
/// Shared as `Arc<Request>` between the caller and the pipeline. The pipeline
/// only reads it, appends markers, and advances the retry policy through the
/// policy's own contract.
pub struct Request {
    id: Uuid,
    method: Method,
    url: String,
    cache_key: String,
    headers: Vec<Header>,
    body: Option<Bytes>,
    cache_entry: Option<CacheEntry>,
    retry_server_errors: bool,
    retry_policy: Mutex<Box<dyn RetryPolicy>>,
    markers: Mutex<Vec<Marker>>,
    created: Instant,
}

impl Request {
    /// A GET request with the default retry policy.
    pub fn new(url: impl Into<String>) -> Self {
        Self::builder(url).build()
    }

    pub fn builder(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(url)
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    /// Caller-supplied headers.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Prior cache entry used for conditional requests and 304 reconciliation.
    pub fn cache_entry(&self) -> Option<&CacheEntry> {
        self.cache_entry.as_ref()
    }

    /// Whether 5xx responses are routed through the retry policy.
    pub const fn should_retry_server_errors(&self) -> bool {
        self.retry_server_errors
    }

    /// Timeout for the next attempt, as dictated by the retry policy.
    pub fn timeout(&self) -> Duration {
        self.policy().current_timeout()
    }

    pub fn retry_count(&self) -> u32 {
        self.policy().current_retry_count()
    }

    /// Run `f` with exclusive access to the retry policy.
    pub fn with_retry_policy<R>(&self, f: impl FnOnce(&mut dyn RetryPolicy) -> R) -> R {
        let mut guard = self.policy();
        f(guard.as_mut())
    }

    pub fn add_marker(&self, name: impl Into<String>) {
        let marker = Marker {
            name: name.into(),
            elapsed: self.created.elapsed(),
        };
        tracing::debug!(
            request_id = %self.id,
            marker = %marker.name,
            elapsed_ms = marker.elapsed.as_millis() as u64,
            "request marker"
        );
        self.markers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(marker);
    }

    /// Snapshot of the markers recorded so far.
    pub fn markers(&self) -> Vec<Marker> {
        self.markers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn policy(&self) -> MutexGuard<'_, Box<dyn RetryPolicy>> {
        self.retry_policy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("url", &self.url)
            .field("cache_key", &self.cache_key)
            .field("has_cache_entry", &self.cache_entry.is_some())
            .field("retry_server_errors", &self.retry_server_errors)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.id, self.method, self.url)
    }
}

/// Builder for [`Request`].
pub struct RequestBuilder {
    method: Method,
    url: String,
    cache_key: Option<String>,
    headers: Vec<Header>,
    body: Option<Bytes>,
    cache_entry: Option<CacheEntry>,
    retry_server_errors: bool,
    retry_policy: Option<Box<dyn RetryPolicy>>,
}

impl RequestBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            cache_key: None,
            headers: Vec::new(),
            body: None,
            cache_entry: None,
            retry_server_errors: false,
            retry_policy: None,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Key used by caches; defaults to the URL.
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    pub fn cache_entry(mut self, entry: Option<CacheEntry>) -> Self {
        self.cache_entry = entry;
        self
    }

    pub fn retry_server_errors(mut self, retry: bool) -> Self {
        self.retry_server_errors = retry;
        self
    }

    pub fn retry_policy(mut self, policy: impl RetryPolicy + 'static) -> Self {
        self.retry_policy = Some(Box::new(policy));
        self
    }

    pub fn build(self) -> Request {
        let cache_key = self.cache_key.unwrap_or_else(|| self.url.clone());
        Request {
            id: Uuid::new_v4(),
            method: self.method,
            url: self.url,
            cache_key,
            headers: self.headers,
            body: self.body,
            cache_entry: self.cache_entry,
            retry_server_errors: self.retry_server_errors,
            retry_policy: Mutex::new(
                self.retry_policy
                    .unwrap_or_else(|| Box::new(DefaultRetryPolicy::default())),
            ),
            markers: Mutex::new(Vec::new()),
            created: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let request = Request::new("http://example.com/a");
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.cache_key(), "http://example.com/a");
        assert!(request.cache_entry().is_none());
        assert!(!request.should_retry_server_errors());
        assert_eq!(request.timeout(), crate::defaults::retry::INITIAL_TIMEOUT);
        assert_eq!(request.retry_count(), 0);
    }

    #[test]
    fn markers_are_recorded_in_order() {
        let request = Request::new("http://example.com");
        request.add_marker("first");
        request.add_marker("second");
        let names: Vec<_> = request.markers().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
