//! Loosely-typed plugin rows with fallible field access.
//!
//! Volatility renders every cell as whatever the plugin produced: numbers,
//! booleans, strings that look like numbers, strings that look like booleans,
//! or nothing at all. Adapters must treat every field access as fallible, so
//! the accessors here return `Option` instead of panicking or guessing.

use std::collections::BTreeMap;

use serde_json::Value as Json;

/// One cell of a plugin row.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Text(String),
    Number(f64),
    Flag(bool),
    Missing,
}

/// One record returned by the analysis engine for one plugin invocation.
///
/// Rows of a single invocation share a nominal schema, but any individual
/// field may be absent or malformed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginRow {
    fields: BTreeMap<String, Field>,
}

impl PluginRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, field: Field) {
        self.fields.insert(name.into(), field);
    }

    /// Build a row from one JSON object. Non-scalar values (arrays, nested
    /// objects) carry no usable statistic and are treated as missing.
    pub fn from_json(value: &Json) -> Self {
        let mut row = Self::new();
        if let Some(object) = value.as_object() {
            for (name, cell) in object {
                let field = match cell {
                    Json::String(s) => Field::Text(s.clone()),
                    Json::Number(n) => match n.as_f64() {
                        Some(f) => Field::Number(f),
                        None => Field::Missing,
                    },
                    Json::Bool(b) => Field::Flag(*b),
                    _ => Field::Missing,
                };
                row.insert(name.as_str(), field);
            }
        }
        row
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Text value of a field, if present and textual.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(Field::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Numeric value of a field. Numeric-looking strings are parsed, since
    /// the engine frequently renders numbers as text.
    pub fn get_number(&self, name: &str) -> Option<f64> {
        match self.fields.get(name)? {
            Field::Number(n) => Some(*n),
            Field::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Boolean value of a field. Accepts real booleans and the textual
    /// `"True"`/`"False"` forms the engine produces, case-insensitively.
    pub fn get_flag(&self, name: &str) -> Option<bool> {
        match self.fields.get(name)? {
            Field::Flag(b) => Some(*b),
            Field::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Canonical string form of a field, used for distinct-value counting.
    /// A PID of `1234` and `"1234"` must count as the same process.
    pub fn token(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Field::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                match trimmed.parse::<f64>() {
                    Ok(n) => Some(format_number(n)),
                    Err(_) => Some(trimmed.to_string()),
                }
            }
            Field::Number(n) => Some(format_number(*n)),
            Field::Flag(b) => Some(b.to_string()),
            Field::Missing => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
