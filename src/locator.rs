//! Schema location: finds the type definition behind a path/operation/role.
//!
//! Each strategy is a fallback for the previous one. Request bodies resolve
//! through a filter-payload heuristic; responses resolve through the declared
//! `x-ui-schema` hint, envelope unwrapping, or a path-segment heuristic.

use serde_json::Value;

use crate::catalog::{ENVELOPE_PREFIX, LIST_MARKER, LIST_SEGMENTS};
use crate::deref::ref_name;
use crate::error::EnrichError;
use crate::types::SchemaRole;

/// A located schema: the resolved definition name, when one exists, and the
/// type node itself (a clone of the definition or the inline node).
#[derive(Debug, Clone)]
pub struct Located {
    pub name: Option<String>,
    pub node: Value,
}

/// Locate the target type node for a path, operation, and role.
///
/// # Errors
///
/// `PathOperationNotFound` when `paths[path][operation]` is absent;
/// `SchemaNotFound` when every extraction strategy comes up empty.
pub fn locate(
    doc: &Value,
    path: &str,
    operation: &str,
    role: SchemaRole,
) -> Result<Located, EnrichError> {
    let op_node = doc
        .get("paths")
        .and_then(|p| p.get(path))
        .and_then(|p| p.get(operation))
        .ok_or_else(|| EnrichError::PathOperationNotFound {
            path: path.to_string(),
            operation: operation.to_string(),
        })?;

    let definitions = doc.get("definitions").unwrap_or(&Value::Null);

    let located = match role {
        SchemaRole::Request => locate_request(op_node, definitions),
        SchemaRole::Response => locate_response(op_node, definitions, path),
    };

    located.ok_or_else(|| EnrichError::SchemaNotFound {
        path: path.to_string(),
        operation: operation.to_string(),
    })
}

/// Resolve a named definition into a `Located`, if it exists.
fn from_definition(name: &str, definitions: &Value) -> Option<Located> {
    definitions.get(name).map(|node| Located {
        name: Some(name.to_string()),
        node: node.clone(),
    })
}

fn locate_request(op_node: &Value, definitions: &Value) -> Option<Located> {
    let body = op_node.get("requestBody")?;

    // Direct reference to a named definition.
    if let Some(name) = ref_name(body) {
        return from_definition(name, definitions);
    }

    // Inline composite: look for a filter payload among its properties.
    if let Some(props) = body.get("properties").and_then(|p| p.as_object()) {
        // A property literally named "filter" wins.
        if let Some(filter) = props.get("filter") {
            if let Some(name) = ref_name(filter) {
                if let Some(located) = from_definition(name, definitions) {
                    return Some(located);
                }
            }
            return Some(Located {
                name: None,
                node: filter.clone(),
            });
        }

        // Else the first property whose referenced type name ends in "Filter".
        for prop in props.values() {
            if let Some(name) = ref_name(prop) {
                if name.ends_with("Filter") {
                    if let Some(located) = from_definition(name, definitions) {
                        return Some(located);
                    }
                }
            }
        }
    }

    // No filter shape found: the inline node is the request schema.
    Some(Located {
        name: None,
        node: body.clone(),
    })
}

fn locate_response(op_node: &Value, definitions: &Value, path: &str) -> Option<Located> {
    // (a) Explicitly declared schema name on the operation.
    if let Some(declared) = op_node.get("x-ui-schema").and_then(|v| v.as_str()) {
        if let Some(located) = from_definition(declared, definitions) {
            return Some(located);
        }
    }

    // (b) 200-response reference, unwrapped when it names an envelope.
    if let Some(resp) = op_node.get("responses").and_then(|r| r.get("200")) {
        if let Some(name) = ref_name(resp) {
            if let Some(located) = unwrap_envelope(name, definitions) {
                return Some(located);
            }
            if let Some(located) = from_definition(name, definitions) {
                return Some(located);
            }
        } else if resp.is_object() && !resp.as_object().map(|o| o.is_empty()).unwrap_or(true) {
            return Some(Located {
                name: None,
                node: resp.clone(),
            });
        }
    }

    // (c) Path-segment heuristic: ".../employees/all" -> Employee(View).
    locate_by_path_segments(path, definitions)
}

/// Unwrap a generic response envelope type name to its payload definition.
///
/// `ResponseEnvelopeListEmployeeView` -> `EmployeeView`;
/// `ResponseEnvelopeEmployeeView` -> `EmployeeView`. When name stripping
/// yields nothing known, the envelope definition's `data` property decides:
/// an array takes its item reference, anything else the direct reference.
fn unwrap_envelope(name: &str, definitions: &Value) -> Option<Located> {
    let rest = name.strip_prefix(ENVELOPE_PREFIX)?;

    let candidate = rest.strip_prefix(LIST_MARKER).unwrap_or(rest);
    if !candidate.is_empty() {
        if let Some(located) = from_definition(candidate, definitions) {
            return Some(located);
        }
    }

    // Fall back to inspecting the envelope's own data property.
    let data = definitions
        .get(name)
        .and_then(|env| env.get("properties"))
        .and_then(|p| p.get("data"))?;

    let inner = if data.get("type").and_then(|t| t.as_str()) == Some("array") {
        data.get("items").and_then(ref_name)
    } else {
        ref_name(data)
    }?;

    from_definition(inner, definitions)
}

fn locate_by_path_segments(path: &str, definitions: &Value) -> Option<Located> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let last = segments.last()?;
    if !LIST_SEGMENTS.contains(last) {
        return None;
    }
    let entity = segments.get(segments.len().checked_sub(2)?)?;

    let base = pascal_case(&singularize(entity));
    // Accept the bare entity name or the <Name>View convention.
    for candidate in [base.clone(), format!("{base}View")] {
        if let Some(located) = from_definition(&candidate, definitions) {
            return Some(located);
        }
    }
    None
}

fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if word.ends_with("ss") {
        return word.to_string();
    }
    word.strip_suffix('s').unwrap_or(word).to_string()
}

fn pascal_case(word: &str) -> String {
    word.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
