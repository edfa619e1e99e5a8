//! Document store: fetches API documents per group and memoizes them.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use log::{debug, warn};
use serde_json::Value;

use crate::error::EnrichError;
use crate::loader::load_document;

/// Where API documents come from.
///
/// `group = None` requests the global unscoped document. Implementations are
/// free to interpret group names however their provider does.
pub trait DocumentSource: Send + Sync {
    fn fetch(&self, group: Option<&str>) -> Result<Value, EnrichError>;
}

/// Loads documents from a directory: `<dir>/<group>.json` per group,
/// `<dir>/api-docs.json` for the unscoped document.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DocumentSource for FileSource {
    fn fetch(&self, group: Option<&str>) -> Result<Value, EnrichError> {
        let file = match group {
            Some(name) => format!("{name}.json"),
            None => "api-docs.json".to_string(),
        };
        load_document(&self.dir.join(file))
    }
}

/// Fetches documents over HTTP: `<base>/api-docs?group=<name>` per group,
/// `<base>/api-docs` for the unscoped document.
#[cfg(feature = "remote")]
#[derive(Debug, Clone)]
pub struct RemoteSource {
    base_url: String,
}

#[cfg(feature = "remote")]
impl RemoteSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }
}

#[cfg(feature = "remote")]
impl DocumentSource for RemoteSource {
    fn fetch(&self, group: Option<&str>) -> Result<Value, EnrichError> {
        let url = match group {
            Some(name) => format!("{}/api-docs?group={}", self.base_url, name),
            None => format!("{}/api-docs", self.base_url),
        };
        crate::loader::load_document_url(&url)
    }
}

/// A source holding a single pre-loaded document, serving it for every group.
/// Used by the CLI, where the document is an explicit input.
#[derive(Debug, Clone)]
pub struct StaticSource {
    document: Value,
}

impl StaticSource {
    pub fn new(document: Value) -> Self {
        Self { document }
    }
}

impl DocumentSource for StaticSource {
    fn fetch(&self, _group: Option<&str>) -> Result<Value, EnrichError> {
        Ok(self.document.clone())
    }
}

/// Memoizing document cache with scoped-to-global fallback.
///
/// Any scoped fetch failure falls back to the unscoped document; failure of
/// the fallback is fatal for the request. Entries live for the process
/// lifetime; there is no eviction, only the explicit [`DocumentStore::clear`].
pub struct DocumentStore<S: DocumentSource> {
    source: S,
    cache: RwLock<HashMap<String, Arc<Value>>>,
}

impl<S: DocumentSource> DocumentStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Get the document for a group, fetching and memoizing on first use.
    ///
    /// Concurrent misses may race to fetch; the first insert wins and later
    /// computations are discarded in its favor.
    pub fn get(&self, group: Option<&str>) -> Result<Arc<Value>, EnrichError> {
        let key = group.unwrap_or("").to_string();

        if let Some(doc) = self.cache.read().expect("document cache poisoned").get(&key) {
            debug!("document cache hit for group {:?}", group);
            return Ok(Arc::clone(doc));
        }

        let doc = self.fetch_with_fallback(group)?;
        let mut cache = self.cache.write().expect("document cache poisoned");
        let entry = cache.entry(key).or_insert_with(|| Arc::new(doc));
        Ok(Arc::clone(entry))
    }

    fn fetch_with_fallback(&self, group: Option<&str>) -> Result<Value, EnrichError> {
        if let Some(name) = group {
            match self.source.fetch(Some(name)) {
                Ok(doc) => return Ok(doc),
                Err(err) => {
                    warn!("scoped document fetch failed for group \"{name}\": {err}; falling back to unscoped document");
                }
            }
        }

        self.source
            .fetch(None)
            .map_err(|err| EnrichError::DocumentFetch {
                group: group.map(String::from),
                message: err.to_string(),
            })
    }

    /// Drop all memoized documents, returning the number removed.
    pub fn clear(&self) -> usize {
        let mut cache = self.cache.write().expect("document cache poisoned");
        let removed = cache.len();
        cache.clear();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts fetches and fails for configured groups.
    struct CountingSource {
        fail_scoped: bool,
        fail_global: bool,
        fetches: AtomicUsize,
    }

    impl CountingSource {
        fn new(fail_scoped: bool, fail_global: bool) -> Self {
            Self {
                fail_scoped,
                fail_global,
                fetches: AtomicUsize::new(0),
            }
        }
    }

    impl DocumentSource for CountingSource {
        fn fetch(&self, group: Option<&str>) -> Result<Value, EnrichError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let fail = match group {
                Some(_) => self.fail_scoped,
                None => self.fail_global,
            };
            if fail {
                return Err(EnrichError::InvalidDocument {
                    message: "unavailable".into(),
                });
            }
            Ok(json!({ "scope": group.unwrap_or("global") }))
        }
    }

    #[test]
    fn scoped_fetch_memoized() {
        let store = DocumentStore::new(CountingSource::new(false, false));
        let a = store.get(Some("hr")).unwrap();
        let b = store.get(Some("hr")).unwrap();
        assert_eq!(a["scope"], "hr");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.source.fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn scoped_failure_falls_back_to_global() {
        let store = DocumentStore::new(CountingSource::new(true, false));
        let doc = store.get(Some("hr")).unwrap();
        assert_eq!(doc["scope"], "global");
        // one scoped attempt + one fallback
        assert_eq!(store.source.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fallback_failure_is_fatal() {
        let store = DocumentStore::new(CountingSource::new(true, true));
        let err = store.get(Some("hr")).unwrap_err();
        assert!(matches!(
            err,
            EnrichError::DocumentFetch { group: Some(g), .. } if g == "hr"
        ));
    }

    #[test]
    fn unscoped_request_skips_scoped_fetch() {
        let store = DocumentStore::new(CountingSource::new(true, false));
        let doc = store.get(None).unwrap();
        assert_eq!(doc["scope"], "global");
        assert_eq!(store.source.fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clear_reports_count_and_refetches() {
        let store = DocumentStore::new(CountingSource::new(false, false));
        store.get(Some("hr")).unwrap();
        store.get(None).unwrap();
        assert_eq!(store.clear(), 2);
        assert_eq!(store.clear(), 0);

        store.get(Some("hr")).unwrap();
        assert_eq!(store.source.fetches.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn file_source_loads_group_files() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("hr.json"),
            r#"{"paths": {}, "definitions": {"Employee": {}}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("api-docs.json"), r#"{"paths": {}}"#).unwrap();

        let source = FileSource::new(dir.path());
        let scoped = source.fetch(Some("hr")).unwrap();
        assert!(scoped["definitions"]["Employee"].is_object());

        let global = source.fetch(None).unwrap();
        assert!(global["paths"].is_object());
    }
}
