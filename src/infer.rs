//! Metadata inference: the six-stage precedence pipeline.
//!
//! Stage order is the contract. Stages 1 and 2 only fill keys that are still
//! unset, stage 3 replaces the control type by naming convention, stage 4
//! applies explicit directive values, stage 5 fills validation hints without
//! touching stage-4 output, and stage 6 raw overrides win over everything.
//! A default-message pass runs after stage 6.

use serde_json::{Map, Number, Value};

use crate::catalog::{
    self, control, BOUND_EPSILON, CHIPS_MAX_OPTIONS, FORMAT_CONTROLS, LONG_TEXT_THRESHOLD,
    RADIO_MAX_OPTIONS, SELECT_MAX_OPTIONS,
};
use crate::directive::{FieldDirective, ValidationConstraints, CONSTRAINTS_KEY, DIRECTIVE_KEY};
use crate::types::{humanize, SchemaRole};

/// Context the engine needs beyond the field itself.
#[derive(Debug, Clone, Copy)]
pub struct InferContext {
    /// Request-role payloads are filter payloads; that context enables
    /// range-style controls on fixed two-element date arrays.
    pub role: SchemaRole,
}

/// Produce the rendering-hint map for a single field.
///
/// Deterministic: identical inputs yield byte-identical maps.
pub fn infer(
    field_name: &str,
    node: &Value,
    directive: Option<&FieldDirective>,
    constraints: &ValidationConstraints,
    ctx: InferContext,
) -> Map<String, Value> {
    let mut hints = Map::new();
    let mut validation = Map::new();
    let mut messages = directive
        .and_then(|d| d.messages.clone())
        .unwrap_or_default();

    stage1_directive_sentinels(&mut hints, directive);
    stage2_shape(&mut hints, node);
    stage3_naming(&mut hints, field_name, node, ctx);
    stage4_directive_overrides(&mut hints, &mut validation, directive);
    stage5_constraints(&mut hints, &mut validation, constraints);
    stage6_raw_overrides(&mut hints, &mut validation, directive);

    if !hints.contains_key("label") {
        hints.insert("label".into(), Value::String(humanize(field_name)));
    }
    synthesize_messages(&hints, &validation, &mut messages);

    if !validation.is_empty() {
        hints.insert("validation".into(), Value::Object(validation));
    }
    if !messages.is_empty() {
        hints.insert("messages".into(), Value::Object(messages));
    }
    hints
}

fn set_if_unset(map: &mut Map<String, Value>, key: &str, value: Value) {
    if !map.contains_key(key) {
        map.insert(key.to_string(), value);
    }
}

// --- Stage 1: conservative defaults from the directive ---

/// A directive whose control/data type was left at its declared default
/// contributes only the generic textual baseline; explicit choices wait for
/// stage 4.
fn stage1_directive_sentinels(hints: &mut Map<String, Value>, directive: Option<&FieldDirective>) {
    let Some(directive) = directive else { return };
    if directive.control_type.is_none() {
        set_if_unset(hints, "controlType", control::INPUT.into());
    }
    if directive.data_type.is_none() {
        set_if_unset(hints, "dataType", "text".into());
    }
}

// --- Stage 2: shape-based detection ---

fn stage2_shape(hints: &mut Map<String, Value>, node: &Value) {
    let ty = node.get("type").and_then(|t| t.as_str());
    let format = node.get("format").and_then(|f| f.as_str());
    let enum_values = node.get("enum").and_then(|e| e.as_array());

    match ty {
        Some("string") => {
            if let Some(values) = enum_values {
                set_if_unset(hints, "controlType", enum_control(values.len()).into());
                set_if_unset(hints, "dataType", "text".into());
                set_if_unset(hints, "options", Value::Array(values.clone()));
                return;
            }
            if let Some(fmt) = format {
                if let Some(ctrl) = FORMAT_CONTROLS.get(fmt) {
                    set_if_unset(hints, "controlType", (*ctrl).into());
                    set_if_unset(hints, "dataType", format_data_type(fmt).into());
                    return;
                }
            }
            let long = node
                .get("maxLength")
                .and_then(|m| m.as_u64())
                .map(|m| m > LONG_TEXT_THRESHOLD)
                .unwrap_or(false);
            set_if_unset(
                hints,
                "controlType",
                if long { control::TEXTAREA } else { control::INPUT }.into(),
            );
            set_if_unset(hints, "dataType", "text".into());
        }
        Some("number") | Some("integer") => {
            set_if_unset(hints, "controlType", control::NUMBER.into());
            let data = if format == Some("currency") {
                "currency"
            } else if ty == Some("integer") {
                "integer"
            } else {
                "number"
            };
            set_if_unset(hints, "dataType", data.into());
        }
        Some("boolean") => {
            // A boolean modeled as a 2-value enum renders as a radio pair.
            let ctrl = match enum_values {
                Some(values) if values.len() == 2 => control::RADIO,
                _ => control::CHECKBOX,
            };
            set_if_unset(hints, "controlType", ctrl.into());
            set_if_unset(hints, "dataType", "boolean".into());
            if let Some(values) = enum_values {
                set_if_unset(hints, "options", Value::Array(values.clone()));
            }
        }
        Some("array") => {
            set_if_unset(hints, "dataType", "array".into());
            let item_enum = node
                .get("items")
                .and_then(|i| i.get("enum"))
                .and_then(|e| e.as_array());
            if let Some(values) = item_enum {
                if values.len() <= CHIPS_MAX_OPTIONS {
                    set_if_unset(hints, "controlType", control::CHIPS.into());
                } else {
                    set_if_unset(hints, "controlType", control::MULTISELECT.into());
                    set_if_unset(hints, "optionsFilter", Value::Bool(true));
                }
                set_if_unset(hints, "options", Value::Array(values.clone()));
            }
        }
        Some("object") => {
            set_if_unset(hints, "controlType", control::PANEL.into());
            set_if_unset(hints, "dataType", "object".into());
        }
        _ => {
            // Untyped nodes (unresolved refs, bare composition) get a panel
            // only when they clearly have structure.
            if node.get("properties").is_some() {
                set_if_unset(hints, "controlType", control::PANEL.into());
                set_if_unset(hints, "dataType", "object".into());
            }
        }
    }
}

fn enum_control(cardinality: usize) -> &'static str {
    if cardinality <= RADIO_MAX_OPTIONS {
        control::RADIO
    } else if cardinality <= SELECT_MAX_OPTIONS {
        control::SELECT
    } else {
        control::AUTOCOMPLETE
    }
}

fn format_data_type(format: &str) -> &'static str {
    match format {
        "date" => "date",
        "date-time" => "datetime",
        "binary" => "file",
        _ => "text",
    }
}

// --- Stage 3: naming-convention override ---

fn stage3_naming(hints: &mut Map<String, Value>, field_name: &str, node: &Value, ctx: InferContext) {
    if let Some((ctrl, data)) = catalog::name_convention(field_name) {
        hints.insert("controlType".into(), ctrl.into());
        if let Some(data) = data {
            hints.insert("dataType".into(), data.into());
        }
    }

    // A fixed two-element date array in a filter context is a range control.
    if ctx.role == SchemaRole::Request {
        if let Some(range_ctrl) = date_range_control(node) {
            hints.insert("controlType".into(), range_ctrl.into());
        }
    }
}

fn date_range_control(node: &Value) -> Option<&'static str> {
    if node.get("type").and_then(|t| t.as_str()) != Some("array") {
        return None;
    }
    let min = node.get("minItems").and_then(|v| v.as_u64())?;
    let max = node.get("maxItems").and_then(|v| v.as_u64())?;
    if (min, max) != (2, 2) {
        return None;
    }
    match node
        .get("items")
        .and_then(|i| i.get("format"))
        .and_then(|f| f.as_str())
    {
        Some("date") => Some(control::DATERANGE),
        Some("date-time") => Some(control::DATETIMERANGE),
        _ => None,
    }
}

// --- Stage 4: explicit directive overrides ---

fn stage4_directive_overrides(
    hints: &mut Map<String, Value>,
    validation: &mut Map<String, Value>,
    directive: Option<&FieldDirective>,
) {
    let Some(d) = directive else { return };

    if let Some(ctrl) = &d.control_type {
        hints.insert("controlType".into(), ctrl.as_str().into());
    }
    if let Some(data) = &d.data_type {
        hints.insert("dataType".into(), data.as_str().into());
    }
    if let Some(label) = &d.label {
        hints.insert("label".into(), label.as_str().into());
    }
    if let Some(placeholder) = &d.placeholder {
        hints.insert("placeholder".into(), placeholder.as_str().into());
    }
    if let Some(icon) = &d.icon {
        hints.insert("icon".into(), icon.as_str().into());
    }
    if let Some(hidden) = d.hidden {
        hints.insert("hidden".into(), Value::Bool(hidden));
    }
    if let Some(read_only) = d.read_only {
        hints.insert("readOnly".into(), Value::Bool(read_only));
    }
    if let Some(order) = d.order {
        hints.insert("order".into(), Value::Number(order.into()));
    }
    if let Some(required) = d.required {
        validation.insert("required".into(), Value::Bool(required));
    }
    if let Some(pattern) = &d.pattern {
        validation.insert("pattern".into(), pattern.as_str().into());
    }
    if let Some(min) = d.min {
        validation.insert("min".into(), number(min));
    }
    if let Some(max) = d.max {
        validation.insert("max".into(), number(max));
    }
}

// --- Stage 5: constraint-derived validation hints ---

fn stage5_constraints(
    hints: &mut Map<String, Value>,
    validation: &mut Map<String, Value>,
    constraints: &ValidationConstraints,
) {
    if constraints.not_blank == Some(true) || constraints.required == Some(true) {
        set_if_unset(validation, "required", Value::Bool(true));
    }
    if let Some(size) = &constraints.size {
        if let Some(min) = size.min {
            set_if_unset(validation, "minLength", Value::Number(min.into()));
        }
        if let Some(max) = size.max {
            set_if_unset(validation, "maxLength", Value::Number(max.into()));
        }
    }
    if let Some(min) = constraints.min {
        set_if_unset(validation, "min", number(min));
    }
    if let Some(max) = constraints.max {
        set_if_unset(validation, "max", number(max));
    }
    if let Some(bound) = &constraints.decimal_min {
        let value = if bound.inclusive {
            bound.value
        } else {
            bound.value + BOUND_EPSILON
        };
        set_if_unset(validation, "min", number(value));
    }
    if let Some(bound) = &constraints.decimal_max {
        let value = if bound.inclusive {
            bound.value
        } else {
            bound.value - BOUND_EPSILON
        };
        set_if_unset(validation, "max", number(value));
    }
    if let Some(pattern) = &constraints.pattern {
        set_if_unset(validation, "pattern", pattern.as_str().into());
    }

    // Temporal constraints become sentinel bounds the front-end resolves.
    if constraints.past == Some(true) || constraints.past_or_present == Some(true) {
        set_if_unset(validation, "max", "today".into());
    }
    if constraints.future == Some(true) {
        set_if_unset(validation, "min", "tomorrow".into());
    } else if constraints.future_or_present == Some(true) {
        set_if_unset(validation, "min", "today".into());
    }

    if constraints.positive == Some(true) {
        set_if_unset(validation, "min", number(BOUND_EPSILON));
    } else if constraints.positive_or_zero == Some(true) {
        set_if_unset(validation, "min", number(0.0));
    }
    if constraints.negative == Some(true) {
        set_if_unset(validation, "max", number(-BOUND_EPSILON));
    } else if constraints.negative_or_zero == Some(true) {
        set_if_unset(validation, "max", number(0.0));
    }

    if let Some(digits) = constraints.digits {
        let step = 10f64.powi(-(digits.fraction as i32));
        set_if_unset(hints, "step", number(step));
        set_if_unset(
            hints,
            "numberFormat",
            format!("1.0-{}", digits.fraction).into(),
        );
    }
}

// --- Stage 6: raw overrides ---

/// Free-form directive overrides applied last, unconditionally. Keys with a
/// `validation.` prefix land in the validation map.
fn stage6_raw_overrides(
    hints: &mut Map<String, Value>,
    validation: &mut Map<String, Value>,
    directive: Option<&FieldDirective>,
) {
    let Some(overrides) = directive.and_then(|d| d.overrides.as_ref()) else {
        return;
    };
    for (key, value) in overrides {
        match key.strip_prefix("validation.") {
            Some(rest) => {
                validation.insert(rest.to_string(), value.clone());
            }
            None => {
                hints.insert(key.clone(), value.clone());
            }
        }
    }
}

// --- Default message synthesis ---

/// Validation hints that carry a default message when none was authored.
const MESSAGE_HINTS: &[&str] = &[
    "required",
    "minLength",
    "maxLength",
    "min",
    "max",
    "pattern",
    "maxFileSize",
    "fileTypes",
];

fn synthesize_messages(
    hints: &Map<String, Value>,
    validation: &Map<String, Value>,
    messages: &mut Map<String, Value>,
) {
    let label = hints
        .get("label")
        .and_then(|l| l.as_str())
        .unwrap_or("This field");

    for hint in MESSAGE_HINTS {
        let Some(value) = validation.get(*hint) else {
            continue;
        };
        if messages.contains_key(*hint) {
            continue;
        }
        let text = match *hint {
            "required" => format!("{label} is required"),
            "minLength" => format!("{label} must be at least {} characters", render(value)),
            "maxLength" => format!("{label} must be at most {} characters", render(value)),
            "min" => format!("{label} must be {} or more", render(value)),
            "max" => format!("{label} must be {} or less", render(value)),
            "pattern" => format!("{label} has an invalid format"),
            "maxFileSize" => format!("{label} exceeds the maximum file size of {}", render(value)),
            "fileTypes" => format!("{label} has an unsupported file type"),
            _ => continue,
        };
        messages.insert((*hint).to_string(), Value::String(text));
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn number(value: f64) -> Value {
    Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

// --- Schema annotation walk ---

/// Annotate every property of a located schema, merging each field's hint map
/// flat into its property node. Consumed `x-ui`/`x-constraints` records are
/// stripped from the output. Nested object properties and array items are
/// annotated recursively.
pub fn annotate(schema: &Value, role: SchemaRole) -> Value {
    let mut copy = schema.clone();
    annotate_node(&mut copy, InferContext { role });
    copy
}

fn annotate_node(node: &mut Value, ctx: InferContext) {
    let Some(obj) = node.as_object_mut() else { return };

    if let Some(Value::Object(props)) = obj.get_mut("properties") {
        let names: Vec<String> = props.keys().cloned().collect();
        for name in names {
            let Some(prop) = props.get_mut(&name) else { continue };

            let directive = FieldDirective::from_property(prop);
            let constraints = ValidationConstraints::from_property(prop);
            let hints = infer(&name, prop, directive.as_ref(), &constraints, ctx);

            if let Some(prop_obj) = prop.as_object_mut() {
                prop_obj.remove(DIRECTIVE_KEY);
                prop_obj.remove(CONSTRAINTS_KEY);
                for (key, value) in hints {
                    prop_obj.insert(key, value);
                }
            }

            // Recurse into nested structures.
            annotate_node(prop, ctx);
            if let Some(items) = prop.get_mut("items") {
                annotate_node(items, ctx);
            }
        }
    }

    for branch_key in ["allOf", "anyOf", "oneOf"] {
        if let Some(Value::Array(branches)) = obj.get_mut(branch_key) {
            for branch in branches {
                annotate_node(branch, ctx);
            }
        }
    }
}
