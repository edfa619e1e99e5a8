//! Core types for metadata enrichment queries.

use serde::{Deserialize, Serialize};

use crate::error::EnrichError;

/// Which side of an operation the metadata describes.
///
/// Request schemas are filter/command payloads; response schemas drive grids
/// and detail forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaRole {
    Request,
    Response,
}

impl SchemaRole {
    /// Parse a role string. Anything other than "response" or "request"
    /// (case-insensitive) is an input error.
    pub fn parse(s: &str) -> Result<Self, EnrichError> {
        match s.to_ascii_lowercase().as_str() {
            "request" => Ok(SchemaRole::Request),
            "response" => Ok(SchemaRole::Response),
            _ => Err(EnrichError::InvalidRole {
                value: s.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaRole::Request => "request",
            SchemaRole::Response => "response",
        }
    }
}

impl Default for SchemaRole {
    fn default() -> Self {
        SchemaRole::Response
    }
}

/// Parameters of a single enrichment query.
#[derive(Debug, Clone)]
pub struct QueryParams {
    /// API-internal path the metadata is requested for (not the caller's route).
    pub path: String,
    /// HTTP verb, normalized to lowercase.
    pub operation: String,
    /// Which schema of the operation to enrich.
    pub role: SchemaRole,
    /// When true, internal references are inlined into a flat shape.
    pub include_internal: bool,
    /// Preferred identifier field name; defaults to "id".
    pub id_field_hint: Option<String>,
    /// Marks the resource read-only in the response block.
    pub read_only_hint: Option<bool>,
    /// Cache-key discriminator only.
    pub tenant: Option<String>,
    /// Cache-key discriminator only.
    pub locale: Option<String>,
}

impl QueryParams {
    /// Create query params for a path/operation with response-role defaults.
    pub fn new(path: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            operation: operation.into(),
            role: SchemaRole::default(),
            include_internal: false,
            id_field_hint: None,
            read_only_hint: None,
            tenant: None,
            locale: None,
        }
    }

    pub fn role(mut self, role: SchemaRole) -> Self {
        self.role = role;
        self
    }

    pub fn include_internal(mut self, include: bool) -> Self {
        self.include_internal = include;
        self
    }

    /// Validate and normalize: non-empty path/operation, leading slash,
    /// lowercase verb.
    pub fn normalized(mut self) -> Result<Self, EnrichError> {
        self.path = self.path.trim().to_string();
        self.operation = self.operation.trim().to_ascii_lowercase();
        if self.path.is_empty() {
            return Err(EnrichError::MissingParameter { name: "path" });
        }
        if self.operation.is_empty() {
            return Err(EnrichError::MissingParameter { name: "operation" });
        }
        if !self.path.starts_with('/') {
            self.path.insert(0, '/');
        }
        Ok(self)
    }

    /// The memoization key for this query.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            path: self.path.clone(),
            operation: self.operation.clone(),
            role: self.role,
            include_internal: self.include_internal,
            tenant: self.tenant.clone(),
            locale: self.locale.clone(),
        }
    }
}

/// Key under which computed digests are memoized.
///
/// Same key implies the same digest for a given document snapshot; the
/// digest cache must be cleared together with the document cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub path: String,
    pub operation: String,
    pub role: SchemaRole,
    pub include_internal: bool,
    pub tenant: Option<String>,
    pub locale: Option<String>,
}

/// Humanize a field name into a display label.
///
/// Splits camelCase, snake_case, and kebab-case, then title-cases the first
/// word: "hireDate" -> "Hire date", "first_name" -> "First name".
pub fn humanize(name: &str) -> String {
    if name.is_empty() {
        return "This field".to_string();
    }

    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if ch.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
            current.push(ch.to_ascii_lowercase());
        } else {
            current.push(ch.to_ascii_lowercase());
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    if words.is_empty() {
        return "This field".to_string();
    }

    let mut label = words.join(" ");
    let mut chars = label.chars();
    if let Some(first) = chars.next() {
        label = first.to_uppercase().collect::<String>() + chars.as_str();
    }
    label
}
