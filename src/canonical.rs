//! Canonical serialization, content hashing, and conditional revalidation.
//!
//! The digest of the canonical byte form is the strong validator for
//! ETag-style conditional requests. Digests are memoized per cache key and
//! must be cleared together with the document cache.

use std::collections::HashMap;
use std::sync::RwLock;

use log::debug;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::types::CacheKey;

/// Recursively sort object keys, preserving array order, and serialize
/// compactly. Two payloads that differ only in object key order canonicalize
/// to the same string.
pub fn canonicalize(value: &Value) -> String {
    serde_json::to_string(&sort_keys(value)).unwrap_or_default()
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Hex-encoded SHA-256 of the canonical form.
pub fn digest(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonicalize(value).as_bytes());
    hex::encode(hasher.finalize())
}

/// Wrap a digest in a strong validator: `"<hex>"`.
pub fn etag_for(digest: &str) -> String {
    format!("\"{digest}\"")
}

/// Outcome of a conditional enrichment request.
#[derive(Debug, Clone, PartialEq)]
pub enum Conditional {
    /// The caller's validator still matches; no payload.
    NotModified { etag: String },
    /// Fresh payload with its validator.
    Fresh { payload: Value, etag: String },
}

impl Conditional {
    pub fn etag(&self) -> &str {
        match self {
            Conditional::NotModified { etag } | Conditional::Fresh { etag, .. } => etag,
        }
    }
}

/// Memoizes payload digests per cache key.
///
/// Entries stay valid as long as the underlying document snapshot does; the
/// owning service clears this cache together with the document cache.
#[derive(Default)]
pub struct DigestCache {
    digests: RwLock<HashMap<CacheKey, String>>,
}

impl DigestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Digest for a key, computing and memoizing on first use. Racing misses
    /// may both compute; the first insert wins.
    pub fn digest_for(&self, key: &CacheKey, payload: &Value) -> String {
        if let Some(hash) = self.digests.read().expect("digest cache poisoned").get(key) {
            debug!("digest cache hit for {} {}", key.operation, key.path);
            return hash.clone();
        }

        let hash = digest(payload);
        let mut cache = self.digests.write().expect("digest cache poisoned");
        cache.entry(key.clone()).or_insert_with(|| hash.clone());
        hash
    }

    /// Conditional response: compare the memoized validator against the
    /// caller's `If-None-Match` value.
    pub fn respond(
        &self,
        key: &CacheKey,
        payload: Value,
        if_none_match: Option<&str>,
    ) -> Conditional {
        let etag = etag_for(&self.digest_for(key, &payload));
        match if_none_match {
            Some(candidate) if candidate.trim() == etag => Conditional::NotModified { etag },
            _ => Conditional::Fresh { payload, etag },
        }
    }

    /// Drop all memoized digests, returning the number removed.
    pub fn clear(&self) -> usize {
        let mut cache = self.digests.write().expect("digest cache poisoned");
        let removed = cache.len();
        cache.clear();
        removed
    }
}
