//! Static catalogs driving metadata inference.
//!
//! Pure lookup data built once at first use; no request-time construction.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Control type identifiers understood by the front-end.
pub mod control {
    pub const INPUT: &str = "input";
    pub const TEXTAREA: &str = "textarea";
    pub const NUMBER: &str = "number";
    pub const CHECKBOX: &str = "checkbox";
    pub const RADIO: &str = "radio";
    pub const SELECT: &str = "select";
    pub const AUTOCOMPLETE: &str = "autocomplete";
    pub const MULTISELECT: &str = "multiselect";
    pub const CHIPS: &str = "chips";
    pub const DATEPICKER: &str = "datepicker";
    pub const DATETIMEPICKER: &str = "datetimepicker";
    pub const DATERANGE: &str = "daterange";
    pub const DATETIMERANGE: &str = "datetimerange";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const URL: &str = "url";
    pub const FILE: &str = "file";
    pub const COLOR: &str = "color";
    pub const TEL: &str = "tel";
    pub const PANEL: &str = "panel";
}

/// Enum cardinality at or below which a radio group is used.
pub const RADIO_MAX_OPTIONS: usize = 5;
/// Enum cardinality at or below which a plain select is used.
pub const SELECT_MAX_OPTIONS: usize = 25;
/// Array-of-enum cardinality at or below which chips are used.
pub const CHIPS_MAX_OPTIONS: usize = 5;
/// Declared string length above which a multi-line control is used.
pub const LONG_TEXT_THRESHOLD: u64 = 255;

/// Epsilon applied to exclusive numeric bounds.
pub const BOUND_EPSILON: f64 = 1e-6;

/// Naming convention of generic response wrappers.
pub const ENVELOPE_PREFIX: &str = "ResponseEnvelope";
/// Marker inside an envelope name meaning the payload is a collection.
pub const LIST_MARKER: &str = "List";

/// Path segments that denote a collection listing endpoint.
pub const LIST_SEGMENTS: &[&str] = &["all", "list"];

/// `format` keyword to control type (stage 2).
pub static FORMAT_CONTROLS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("date", control::DATEPICKER),
        ("date-time", control::DATETIMEPICKER),
        ("email", control::EMAIL),
        ("password", control::PASSWORD),
        ("uri", control::URL),
        ("url", control::URL),
        ("binary", control::FILE),
        ("color", control::COLOR),
        ("phone", control::TEL),
        ("tel", control::TEL),
    ])
});

/// Name fragment to `(controlType, dataType)` convention (stage 3).
///
/// Order matters: the first matching fragment wins, so more specific
/// vocabulary sits before generic vocabulary ("email" before "mail" would
/// go here if both existed).
pub static NAME_CONVENTIONS: Lazy<Vec<(&'static str, &'static str, Option<&'static str>)>> =
    Lazy::new(|| {
        vec![
            ("description", control::TEXTAREA, None),
            ("comment", control::TEXTAREA, None),
            ("notes", control::TEXTAREA, None),
            ("remark", control::TEXTAREA, None),
            ("password", control::PASSWORD, None),
            ("email", control::EMAIL, None),
            ("price", control::NUMBER, Some("currency")),
            ("salary", control::NUMBER, Some("currency")),
            ("amount", control::NUMBER, Some("currency")),
            ("cost", control::NUMBER, Some("currency")),
            ("fee", control::NUMBER, Some("currency")),
            ("url", control::URL, None),
            ("link", control::URL, None),
            ("colour", control::COLOR, None),
            ("color", control::COLOR, None),
            ("image", control::FILE, None),
            ("photo", control::FILE, None),
            ("avatar", control::FILE, None),
            ("attachment", control::FILE, None),
            ("file", control::FILE, None),
            ("date", control::DATEPICKER, None),
        ]
    });

/// Field names exempt from naming-convention overrides. "name" and "title"
/// contain no reliable signal and must stay plain text inputs.
pub const NAME_OVERRIDE_EXCLUSIONS: &[&str] = &["name", "title", "subject"];

/// True when the field name matches the naming-convention exclusion list.
pub fn is_name_excluded(field_name: &str) -> bool {
    let lower = field_name.to_ascii_lowercase();
    NAME_OVERRIDE_EXCLUSIONS.iter().any(|ex| lower.contains(ex))
}

/// Look up the naming-convention override for a field name, if any.
pub fn name_convention(field_name: &str) -> Option<(&'static str, Option<&'static str>)> {
    if is_name_excluded(field_name) {
        return None;
    }
    let lower = field_name.to_ascii_lowercase();
    NAME_CONVENTIONS
        .iter()
        .find(|(fragment, _, _)| lower.contains(fragment))
        .map(|(_, ctrl, data)| (*ctrl, *data))
}
