//! HTTP Headers Utility
//!
//! Conditional request headers derived from a cache entry, and the header
//! merge applied when a `304 Not Modified` revalidates that entry.

use crate::types::{CacheEntry, Header};
use std::collections::HashSet;

pub const IF_NONE_MATCH: &str = "If-None-Match";
pub const IF_MODIFIED_SINCE: &str = "If-Modified-Since";

/// Conditional headers for a request revalidating `entry`.
///
/// No entry yields no headers.
pub fn cache_headers(entry: Option<&CacheEntry>) -> Vec<Header> {
    let Some(entry) = entry else {
        return Vec::new();
    };

    let mut headers = Vec::with_capacity(2);
    if let Some(etag) = &entry.etag {
        headers.push(Header::new(IF_NONE_MATCH, etag.clone()));
    }
    if entry.last_modified > 0
        && let Some(date) = format_rfc1123(entry.last_modified)
    {
        headers.push(Header::new(IF_MODIFIED_SINCE, date));
    }
    headers
}

/// Format epoch milliseconds as an RFC 1123 date, e.g.
/// `Sun, 09 Sep 2001 01:46:40 GMT`.
pub fn format_rfc1123(epoch_ms: i64) -> Option<String> {
    chrono::DateTime::from_timestamp_millis(epoch_ms)
        .map(|dt| dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}

/// Combine the headers of a 304 response with those of the cached entry.
///
/// A 304 carries only a subset of the original header fields. The network
/// headers come first and win on conflict; cached headers whose name
/// (case-insensitive) does not appear in the network response are appended in
/// their cached order.
pub fn combine_headers(response_headers: &[Header], entry: &CacheEntry) -> Vec<Header> {
    let network_names: HashSet<String> = response_headers
        .iter()
        .map(|h| h.name.to_ascii_lowercase())
        .collect();

    let mut combined = response_headers.to_vec();
    combined.extend(
        entry
            .headers()
            .iter()
            .filter(|h| !network_names.contains(&h.name.to_ascii_lowercase()))
            .cloned(),
    );
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn no_entry_no_headers() {
        assert!(cache_headers(None).is_empty());
    }

    #[test]
    fn etag_only() {
        let entry = CacheEntry::new("x").with_etag("abc");
        let headers = cache_headers(Some(&entry));
        assert_eq!(headers, vec![Header::new("If-None-Match", "abc")]);
    }

    #[test]
    fn last_modified_is_rfc1123() {
        let entry = CacheEntry::new("x").with_last_modified(1_000_000_000_000);
        let headers = cache_headers(Some(&entry));
        assert_eq!(
            headers,
            vec![Header::new("If-Modified-Since", "Sun, 09 Sep 2001 01:46:40 GMT")]
        );
    }

    #[test]
    fn network_headers_win() {
        let entry = CacheEntry::new("x").with_headers(vec![
            Header::new("content-type", "text/html"),
            Header::new("X-Cached", "1"),
            Header::new("Set-Cookie", "a=1"),
            Header::new("Set-Cookie", "b=2"),
        ]);
        let network = vec![
            Header::new("Content-Type", "application/json"),
            Header::new("Date", "now"),
        ];

        let combined = combine_headers(&network, &entry);
        assert_eq!(
            combined,
            vec![
                Header::new("Content-Type", "application/json"),
                Header::new("Date", "now"),
                Header::new("X-Cached", "1"),
                Header::new("Set-Cookie", "a=1"),
                Header::new("Set-Cookie", "b=2"),
            ]
        );
    }

    #[test]
    fn legacy_entries_merge_from_map() {
        let mut legacy = BTreeMap::new();
        legacy.insert("ETag".to_string(), "v1".to_string());
        legacy.insert("Date".to_string(), "old".to_string());
        let entry = CacheEntry::new("x").with_legacy_headers(legacy);

        let combined = combine_headers(&[Header::new("date", "new")], &entry);
        assert_eq!(
            combined,
            vec![Header::new("date", "new"), Header::new("ETag", "v1")]
        );
    }

    #[test]
    fn legacy_case_variants_merge_once() {
        let mut legacy = BTreeMap::new();
        legacy.insert("ETag".to_string(), "v1".to_string());
        legacy.insert("etag".to_string(), "v0".to_string());
        let entry = CacheEntry::new("x").with_legacy_headers(legacy);

        let combined = combine_headers(&[Header::new("Date", "now")], &entry);
        assert_eq!(
            combined,
            vec![Header::new("Date", "now"), Header::new("etag", "v0")]
        );
    }
}
