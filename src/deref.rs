//! Reference inlining: expands internal `$ref` pointers into private copies.

use std::collections::HashSet;

use log::warn;
use serde_json::Value;

/// Recursion ceiling for pathological definition graphs the visited set
/// cannot catch (distinct names chained deeper than any real document).
const MAX_DEPTH: usize = 64;

/// Extract the definition name from an internal reference node.
///
/// Recognizes `{"$ref": "#/definitions/Name"}`; returns `None` for anything
/// else, including external refs.
pub fn ref_name(node: &Value) -> Option<&str> {
    node.get("$ref")
        .and_then(|v| v.as_str())
        .and_then(|r| r.strip_prefix("#/definitions/"))
}

/// Inline internal references within a type node.
///
/// When `include_internal` is false this is a pass-through clone: references
/// stay as-is for callers that render them lazily. When true, every
/// `#/definitions/` ref is substituted depth-first with a deep copy of its
/// definition, recursing through properties, array items, composition
/// branches, and `additionalProperties`.
///
/// A missing definition is logged and the ref node is left unresolved; a
/// cyclic definition is left unresolved at the point of re-entry. Neither
/// aborts the enrichment. The source document is never mutated.
pub fn inline(node: &Value, definitions: &Value, include_internal: bool) -> Value {
    if !include_internal {
        return node.clone();
    }
    let mut copy = node.clone();
    inline_inner(&mut copy, definitions, &mut HashSet::new(), 0);
    copy
}

fn inline_inner(value: &mut Value, definitions: &Value, visited: &mut HashSet<String>, depth: usize) {
    if depth > MAX_DEPTH {
        warn!("reference inlining aborted at depth {depth}");
        return;
    }

    match value {
        Value::Object(obj) => {
            if let Some(name) = obj
                .get("$ref")
                .and_then(|v| v.as_str())
                .and_then(|r| r.strip_prefix("#/definitions/"))
                .map(String::from)
            {
                if visited.contains(&name) {
                    // Cycle: leave the ref in place.
                    return;
                }

                match definitions.get(&name) {
                    Some(def) => {
                        visited.insert(name.clone());
                        let mut inlined = def.clone();
                        inline_inner(&mut inlined, definitions, visited, depth + 1);
                        visited.remove(&name);

                        obj.remove("$ref");
                        if let Value::Object(def_obj) = inlined {
                            for (k, v) in def_obj {
                                obj.entry(k).or_insert(v);
                            }
                        }
                        return;
                    }
                    None => {
                        warn!("unresolved reference: #/definitions/{name}");
                        return;
                    }
                }
            }

            for (key, child) in obj.iter_mut() {
                match key.as_str() {
                    "properties" => {
                        if let Value::Object(props) = child {
                            for prop in props.values_mut() {
                                inline_inner(prop, definitions, visited, depth + 1);
                            }
                        }
                    }
                    "items" | "additionalProperties" => {
                        inline_inner(child, definitions, visited, depth + 1);
                    }
                    "allOf" | "anyOf" | "oneOf" => {
                        if let Value::Array(branches) = child {
                            for branch in branches {
                                inline_inner(branch, definitions, visited, depth + 1);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        Value::Array(arr) => {
            for item in arr {
                inline_inner(item, definitions, visited, depth + 1);
            }
        }
        _ => {}
    }
}
