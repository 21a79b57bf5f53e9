//! # Annotation Options — Values, Serialization, and Merging
//!
//! Validation constraints travel through the builders as [`OptionValue`]
//! trees and leave them as annotation strings of the form
//! `(buf.validate.field).repeated.min_items = 1`.
//!
//! ## Serialization Syntax
//!
//! [`format_option_value`] writes the protobuf text-format literal syntax:
//!
//! - booleans, integers and finite floats bare (`true`, `-3`, `0.5`)
//! - strings double-quoted with `\`, `"` and newlines escaped
//! - identifiers bare (`IGNORE_IF_UNPOPULATED`)
//! - lists as `[a, b]`
//! - messages as `{ key: value, other: value }`, empty as `{}`
//!
//! Both helpers here are pure functions over plain data.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use serde_json::Value;

use crate::error::{BuildErrors, FormatError, SchemaError};

/// Element-level validation rules, keyed by rule name (`pattern`, `min_len`, ...).
pub type Rules = BTreeMap<String, OptionValue>;

/// A value that can be embedded in an annotation option.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// `true` / `false`.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Finite float.
    Float(f64),
    /// Quoted string literal.
    String(String),
    /// Bare identifier, e.g. an enum constant.
    Identifier(Identifier),
    /// `[a, b, c]`.
    List(Vec<OptionValue>),
    /// `{ key: value }`, entries kept in insertion order.
    Message(Vec<(String, OptionValue)>),
}

/// A bare identifier token. Kept distinct from strings so it serializes unquoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Identifier(pub String);

impl OptionValue {
    /// Construct a bare identifier value.
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier(Identifier(name.into()))
    }

    /// Construct a message value from key/value pairs.
    pub fn message<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, OptionValue)>,
    {
        Self::Message(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

macro_rules! option_value_from {
    ($origin:ty, $variant:ident $(, as $as_type:ty)?) => {
        impl From<$origin> for OptionValue {
            fn from(value: $origin) -> Self {
                OptionValue::$variant(value $(as $as_type)?)
            }
        }
    };
}

option_value_from!(bool, Bool);
option_value_from!(i64, Int);
option_value_from!(i32, Int, as i64);
option_value_from!(u64, Uint);
option_value_from!(u32, Uint, as u64);
option_value_from!(usize, Uint, as u64);
option_value_from!(f64, Float);
option_value_from!(f32, Float, as f64);
option_value_from!(String, String);

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<Rules> for OptionValue {
    fn from(rules: Rules) -> Self {
        OptionValue::Message(rules.into_iter().collect())
    }
}

impl<T: Into<OptionValue>> From<Vec<T>> for OptionValue {
    fn from(values: Vec<T>) -> Self {
        OptionValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<Value> for OptionValue {
    type Error = FormatError;

    /// Convert a JSON tree. Objects become messages, arrays become lists.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Err(FormatError::UnsupportedValue("null".to_string())),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(Self::Uint(u))
                } else {
                    n.as_f64()
                        .map(Self::Float)
                        .ok_or_else(|| FormatError::UnsupportedValue(n.to_string()))
                }
            }
            Value::String(s) => Ok(Self::String(s)),
            Value::Array(items) => {
                let items: Result<Vec<_>, _> = items.into_iter().map(Self::try_from).collect();
                Ok(Self::List(items?))
            }
            Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (k, v) in map {
                    entries.push((k, Self::try_from(v)?));
                }
                Ok(Self::Message(entries))
            }
        }
    }
}

/// Whether `s` is a protobuf identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Serialize a value to annotation literal syntax.
///
/// # Errors
///
/// Fails on non-finite floats, empty message keys, and keys or identifier
/// values that are not valid identifiers.
pub fn format_option_value(value: &OptionValue) -> Result<String, FormatError> {
    let mut out = String::new();
    write_value(&mut out, value)?;
    Ok(out)
}

fn write_value(out: &mut String, value: &OptionValue) -> Result<(), FormatError> {
    match value {
        OptionValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        OptionValue::Int(i) => {
            let _ = write!(out, "{i}");
        }
        OptionValue::Uint(u) => {
            let _ = write!(out, "{u}");
        }
        OptionValue::Float(f) => {
            if !f.is_finite() {
                return Err(FormatError::NonFiniteFloat(*f));
            }
            // Debug keeps the fractional part (`1.0`, not `1`).
            let _ = write!(out, "{f:?}");
        }
        OptionValue::String(s) => write_quoted(out, s),
        OptionValue::Identifier(Identifier(name)) => {
            if !is_identifier(name) {
                return Err(FormatError::InvalidIdentifier(name.clone()));
            }
            out.push_str(name);
        }
        OptionValue::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item)?;
            }
            out.push(']');
        }
        OptionValue::Message(entries) => {
            if entries.is_empty() {
                out.push_str("{}");
                return Ok(());
            }
            out.push_str("{ ");
            for (i, (key, val)) in entries.iter().enumerate() {
                if key.is_empty() {
                    return Err(FormatError::EmptyKey);
                }
                if !is_identifier(key) {
                    return Err(FormatError::InvalidIdentifier(key.clone()));
                }
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(key);
                out.push_str(": ");
                write_value(out, val)?;
            }
            out.push_str(" }");
        }
    }
    Ok(())
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Whether `name` can appear on the left of an option assignment.
pub fn is_valid_option_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('=') && !name.chars().any(char::is_whitespace)
}

/// Render a single `name = value` option string.
pub fn render_option(name: &str, value: &OptionValue) -> Result<String, SchemaError> {
    if !is_valid_option_name(name) {
        return Err(SchemaError::InvalidOptionName {
            name: name.to_string(),
        });
    }
    Ok(format!("{name} = {}", format_option_value(value)?))
}

/// The option name of a rendered `name = value` string.
fn option_name_of(rendered: &str) -> &str {
    rendered
        .split_once(" = ")
        .map(|(name, _)| name)
        .unwrap_or(rendered)
}

/// Ordered option name to value map.
///
/// Inserting an existing name replaces its value but keeps the position of
/// the first insertion, so emission order follows first configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionMap {
    entries: Vec<(String, OptionValue)>,
}

impl OptionMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Returns the number of options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no option is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Render every entry as a `name = value` string, collecting all failures.
    pub fn render(&self) -> Result<Vec<String>, BuildErrors> {
        let mut errors = BuildErrors::new();
        let mut rendered = Vec::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            match render_option(name, value) {
                Ok(s) => rendered.push(s),
                Err(e) => errors.push(e),
            }
        }
        errors.into_result(rendered)
    }
}

/// Merge option overrides into an ordered option list.
///
/// Each override replaces the entry with the same option name in place, or
/// is appended when no such entry exists. Every invalid override is
/// reported.
pub fn merge_options(
    overrides: &OptionMap,
    mut options: Vec<String>,
) -> Result<Vec<String>, BuildErrors> {
    let mut errors = BuildErrors::new();
    for (name, value) in overrides.iter() {
        let rendered = match render_option(name, value) {
            Ok(s) => s,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };
        match options.iter_mut().find(|o| option_name_of(o) == name) {
            Some(existing) => *existing = rendered,
            None => options.push(rendered),
        }
    }
    errors.into_result(options)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn option_value() -> impl Strategy<Value = OptionValue> {
        let leaf = prop_oneof![
            any::<bool>().prop_map(OptionValue::Bool),
            any::<i64>().prop_map(OptionValue::Int),
            any::<u64>().prop_map(OptionValue::Uint),
            "[a-zA-Z0-9_ \"\\\\]{0,20}".prop_map(OptionValue::String),
            "[A-Z_][A-Z0-9_]{0,10}".prop_map(OptionValue::identifier),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(OptionValue::List),
                prop::collection::btree_map("[a-z_][a-z0-9_]{0,8}", inner, 0..6)
                    .prop_map(|m| OptionValue::Message(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        /// Serialization never fails for values built from valid parts.
        #[test]
        fn format_never_fails_for_valid_values(value in option_value()) {
            prop_assert!(format_option_value(&value).is_ok());
        }

        /// Serialization is deterministic.
        #[test]
        fn format_is_deterministic(value in option_value()) {
            let a = format_option_value(&value).unwrap();
            let b = format_option_value(&value).unwrap();
            prop_assert_eq!(a, b);
        }

        /// Rendered option names always round-trip through the merge lookup.
        #[test]
        fn merge_replaces_rather_than_duplicates(n in any::<u64>(), m in any::<u64>()) {
            let mut overrides = OptionMap::new();
            overrides.insert("(v).k", m);
            let merged = merge_options(&overrides, vec![format!("(v).k = {n}")]).unwrap();
            prop_assert_eq!(merged, vec![format!("(v).k = {m}")]);
        }
    }
}
