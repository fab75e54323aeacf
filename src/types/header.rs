//! HTTP header pair.
//!
//! Headers are kept as an ordered list rather than a map so that duplicates
//! and their relative order survive a round trip through the cache.

use serde::{Deserialize, Serialize};

/// A single `(name, value)` header. Names compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Case-insensitive name comparison.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// First header with the given name (case-insensitive).
pub fn find_header<'a>(headers: &'a [Header], name: &str) -> Option<&'a Header> {
    headers.iter().find(|h| h.has_name(name))
}

pub fn contains_header(headers: &[Header], name: &str) -> bool {
    find_header(headers, name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_compare_case_insensitively() {
        let headers = vec![Header::new("Content-Type", "text/plain"), Header::new("ETag", "x")];
        assert!(contains_header(&headers, "content-type"));
        assert_eq!(find_header(&headers, "etag").map(|h| h.value.as_str()), Some("x"));
        assert!(!contains_header(&headers, "Last-Modified"));
    }
}
