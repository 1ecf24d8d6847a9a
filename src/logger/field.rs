//! Key/value annotations attached to log records.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// A single log field.
///
/// The value is opaque to the core; backends decide how to render it.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: Cow<'static, str>,
    pub value: Value,
}

impl Field {
    /// Create a new field.
    pub fn new(key: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered field storage shared by the backends.
///
/// Keys are kept sorted so rendered output is deterministic.
pub type FieldMap = BTreeMap<Cow<'static, str>, Value>;

/// Merge `fields` into `map`, left to right. Later keys win.
pub fn merge_fields(map: &mut FieldMap, fields: &[Field]) {
    for field in fields {
        map.insert(field.key.clone(), field.value.clone());
    }
}

/// Display adapter that prints strings without JSON quoting.
pub struct DisplayValue<'a>(pub &'a Value);

impl fmt::Display for DisplayValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

/// Render a field map as `key<sep>value` pairs joined by single spaces.
pub fn render_fields(map: &FieldMap, sep: char) -> String {
    let mut out = String::new();
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(key);
        out.push(sep);
        out.push_str(&DisplayValue(value).to_string());
    }
    out
}
