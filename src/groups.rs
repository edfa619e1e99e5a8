//! Group routing: best-prefix resolution of request paths to document groups.

/// A registered document partition: a group name plus the path patterns that
/// route to it. Patterns may end in `/**` (multi-segment) or `/*` (single
/// segment); both are stripped to a plain prefix for matching.
#[derive(Debug, Clone)]
pub struct GroupPattern {
    pub name: String,
    pub prefixes: Vec<String>,
}

impl GroupPattern {
    pub fn new(name: impl Into<String>, prefixes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            prefixes,
        }
    }
}

/// Routes request paths to the most specific registered group.
///
/// Registered once at startup, read-only afterwards. Registration order is
/// part of the contract: when two patterns normalize to prefixes of equal
/// length, the earlier registration wins.
#[derive(Debug, Default)]
pub struct GroupIndex {
    patterns: Vec<GroupPattern>,
}

impl GroupIndex {
    pub fn new(patterns: Vec<GroupPattern>) -> Self {
        Self { patterns }
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Resolve a request path to a group name.
    ///
    /// Every prefix is normalized by stripping a trailing `/**` or `/*`
    /// wildcard; a pattern matches when the path starts with the normalized
    /// prefix. The longest normalized prefix wins; `None` means the caller
    /// should use the unscoped document.
    pub fn resolve(&self, path: &str) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;

        for pattern in &self.patterns {
            for prefix in &pattern.prefixes {
                let normalized = normalize_prefix(prefix);
                if !path.starts_with(normalized) {
                    continue;
                }
                // Strictly greater keeps the earliest registration on ties.
                let beat = match best {
                    Some((_, len)) => normalized.len() > len,
                    None => true,
                };
                if beat {
                    best = Some((pattern.name.as_str(), normalized.len()));
                }
            }
        }

        best.map(|(name, _)| name)
    }
}

/// Strip a trailing multi- or single-segment wildcard and any trailing slash.
fn normalize_prefix(prefix: &str) -> &str {
    let stripped = prefix
        .strip_suffix("/**")
        .or_else(|| prefix.strip_suffix("/*"))
        .unwrap_or(prefix);
    // "/**" alone normalizes to the empty prefix, matching everything.
    stripped.strip_suffix('/').unwrap_or(stripped)
}
