//! Cached response snapshot.

use super::header::Header;
use bytes::Bytes;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// A previously cached response.
///
/// Timestamps are milliseconds since the Unix epoch; `0` means "unknown".
///
/// Headers come in two shapes. `all_response_headers` is the full ordered
/// list (duplicates preserved) and is authoritative when present and
/// non-empty. `response_headers` is the legacy flat map written by older
/// caches; names compare case-insensitively and a repeated name keeps its
/// last value.
#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    /// Response body.
    pub data: Bytes,
    /// Entity tag for cache coherency.
    pub etag: Option<String>,
    /// Date of the response as reported by the server.
    pub server_date: i64,
    /// Last-Modified date of the requested object.
    pub last_modified: i64,
    /// Hard expiry.
    pub ttl: i64,
    /// Soft expiry; past this the entry should be revalidated.
    pub soft_ttl: i64,
    /// Legacy header map.
    pub response_headers: BTreeMap<String, String>,
    /// Full ordered header list.
    pub all_response_headers: Option<Vec<Header>>,
}

impl CacheEntry {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub const fn with_last_modified(mut self, last_modified: i64) -> Self {
        self.last_modified = last_modified;
        self
    }

    pub const fn with_ttl(mut self, ttl: i64, soft_ttl: i64) -> Self {
        self.ttl = ttl;
        self.soft_ttl = soft_ttl;
        self
    }

    /// Store headers in both shapes: the ordered list as given and the
    /// legacy map with last-write-wins.
    pub fn with_headers(mut self, headers: Vec<Header>) -> Self {
        self.response_headers = legacy_header_map(&headers);
        self.all_response_headers = Some(headers);
        self
    }

    /// Store only the legacy map, as an older cache would. Names differing
    /// only in case collapse to the one that sorts last.
    pub fn with_legacy_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.response_headers = fold_names(&headers);
        self.all_response_headers = None;
        self
    }

    /// The authoritative header list of this entry.
    pub fn headers(&self) -> Cow<'_, [Header]> {
        match &self.all_response_headers {
            Some(all) if !all.is_empty() => Cow::Borrowed(all.as_slice()),
            _ => Cow::Owned(
                fold_names(&self.response_headers)
                    .into_iter()
                    .map(|(name, value)| Header::new(name, value))
                    .collect(),
            ),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp_millis())
    }

    pub const fn is_expired_at(&self, now_ms: i64) -> bool {
        self.ttl < now_ms
    }

    pub fn refresh_needed(&self) -> bool {
        self.refresh_needed_at(chrono::Utc::now().timestamp_millis())
    }

    pub const fn refresh_needed_at(&self, now_ms: i64) -> bool {
        self.soft_ttl < now_ms
    }
}

/// Collapse an ordered header list into the legacy map.
///
/// Names compare case-insensitively; the last occurrence wins, spelling
/// included.
pub fn legacy_header_map(headers: &[Header]) -> BTreeMap<String, String> {
    fold_case_insensitive(headers.iter().map(|h| (h.name.as_str(), h.value.as_str())))
}

fn fold_names(map: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    fold_case_insensitive(map.iter().map(|(name, value)| (name.as_str(), value.as_str())))
}

fn fold_case_insensitive<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> BTreeMap<String, String> {
    let mut by_lower: BTreeMap<String, (&str, &str)> = BTreeMap::new();
    for (name, value) in pairs {
        by_lower.insert(name.to_ascii_lowercase(), (name, value));
    }
    by_lower
        .into_values()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}
