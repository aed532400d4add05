//! HTTP cache control module
//!
//! Provides `ETag` generation, conditional request matching and the
//! `Cache-Control` policies used for assets and the index document.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// One year, for content-hashed build output
pub const ONE_YEAR_SECS: u32 = 31_536_000;

/// Generate `ETag` using fast hashing
///
/// Returns a quoted `ETag` string, e.g. `"abc123def"`.
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single tag, a comma-separated list, and the `*` wildcard.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == etag || e.trim() == "*")
    })
}

/// Cache control policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Public cache with specified max-age (seconds)
    Public(u32),
    /// Always revalidate
    NoCache,
}

impl CachePolicy {
    /// Policy for content-hashed assets
    pub const fn immutable_asset() -> Self {
        Self::Public(ONE_YEAR_SECS)
    }

    /// Convert to Cache-Control header value
    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::NoCache => "no-cache".to_string(),
        }
    }
}
