//! The enrichment pipeline: route, fetch, locate, inline, annotate, hash.

use serde_json::{json, Map, Value};

use crate::canonical::{Conditional, DigestCache};
use crate::deref;
use crate::error::EnrichError;
use crate::groups::GroupIndex;
use crate::infer;
use crate::locator;
use crate::store::{DocumentSource, DocumentStore};
use crate::types::QueryParams;

/// Counts removed by a joint cache clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheClearReport {
    pub documents: usize,
    pub digests: usize,
}

/// Orchestrates one enrichment query end to end.
///
/// Holds the two process-lifetime caches (documents and digests); they are
/// only ever cleared together, because a memoized digest is valid only for
/// the document snapshot it was computed from.
pub struct Enricher<S: DocumentSource> {
    groups: GroupIndex,
    store: DocumentStore<S>,
    digests: DigestCache,
}

impl<S: DocumentSource> Enricher<S> {
    pub fn new(source: S, groups: GroupIndex) -> Self {
        Self {
            groups,
            store: DocumentStore::new(source),
            digests: DigestCache::new(),
        }
    }

    /// Run the full pipeline with conditional-request support.
    pub fn query(
        &self,
        params: QueryParams,
        if_none_match: Option<&str>,
    ) -> Result<Conditional, EnrichError> {
        let params = params.normalized()?;
        let key = params.cache_key();
        let payload = self.enrich(&params)?;
        Ok(self.digests.respond(&key, payload, if_none_match))
    }

    /// Build the enriched payload without conditional handling.
    pub fn enrich(&self, params: &QueryParams) -> Result<Value, EnrichError> {
        let group = self.groups.resolve(&params.path).map(String::from);
        let doc = self.store.get(group.as_deref())?;

        let located = locator::locate(&doc, &params.path, &params.operation, params.role)?;
        let definitions = doc.get("definitions").unwrap_or(&Value::Null);
        let node = deref::inline(&located.node, definitions, params.include_internal);
        let schema = infer::annotate(&node, params.role);
        let resource = resource_block(&doc, params, &node);

        Ok(json!({
            "path": params.path,
            "operation": params.operation,
            "role": params.role.as_str(),
            "group": group,
            "schemaName": located.name,
            "schema": schema,
            "resource": resource,
        }))
    }

    /// Clear both caches together, returning the counts removed.
    pub fn clear_caches(&self) -> CacheClearReport {
        CacheClearReport {
            documents: self.store.clear(),
            digests: self.digests.clear(),
        }
    }
}

/// Trailing segments that mark collection/listing routes rather than the
/// resource base itself.
const ROUTE_SUFFIXES: &[&str] = &["all", "list", "filter", "cursor"];

/// Compute the identifier/capabilities block for the enriched type.
fn resource_block(doc: &Value, params: &QueryParams, node: &Value) -> Value {
    let id_field = params.id_field_hint.as_deref().unwrap_or("id");
    let id_found = node
        .get("properties")
        .and_then(|p| p.get(id_field))
        .is_some();

    let base = base_path(&params.path);
    let probe = |path: &str, verb: &str| -> bool {
        doc.get("paths")
            .and_then(|p| p.get(path))
            .and_then(|p| p.get(verb))
            .is_some()
    };

    let mut capabilities = Map::new();
    capabilities.insert("create".into(), probe(&base, "post").into());
    capabilities.insert("update".into(), probe(&format!("{base}/{{id}}"), "put").into());
    capabilities.insert(
        "delete".into(),
        probe(&format!("{base}/{{id}}"), "delete").into(),
    );
    capabilities.insert("byId".into(), probe(&format!("{base}/{{id}}"), "get").into());
    capabilities.insert("all".into(), probe(&format!("{base}/all"), "get").into());
    capabilities.insert(
        "filter".into(),
        probe(&format!("{base}/filter"), "post").into(),
    );
    capabilities.insert(
        "cursor".into(),
        probe(&format!("{base}/cursor"), "post").into(),
    );

    json!({
        "idField": id_field,
        "idFieldFound": id_found,
        "readOnly": params.read_only_hint.unwrap_or(false),
        "capabilities": capabilities,
    })
}

/// Strip a trailing listing segment or `{id}` placeholder from the request
/// path to obtain the resource base.
fn base_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if let Some(idx) = trimmed.rfind('/') {
        let last = &trimmed[idx + 1..];
        if ROUTE_SUFFIXES.contains(&last) || (last.starts_with('{') && last.ends_with('}')) {
            let base = &trimmed[..idx];
            if !base.is_empty() {
                return base.to_string();
            }
        }
    }
    trimmed.to_string()
}
