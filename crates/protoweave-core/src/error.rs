//! # Error Types — Schema Errors and the Validation Report
//!
//! Defines the error types returned while composing field descriptors.
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Every structural problem is its own `SchemaError` variant carrying the
//!   field name it was found on.
//! - Builders never stop at the first problem. Failures are collected into a
//!   [`BuildErrors`] report so a caller sees every cause in one pass.
//! - Reports flatten when joined: a report nested in another report is never
//!   represented as a single opaque cause.

use std::fmt;

use thiserror::Error;

/// A single failure discovered while configuring or building a field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A lower count bound greater than the upper count bound.
    #[error(
        "max_{bound} cannot be smaller than min_{bound} \
         (min_{bound} = {min}, max_{bound} = {max})"
    )]
    BoundsInverted {
        /// What is being counted: `items` for sequences, `pairs` for maps.
        bound: &'static str,
        /// The configured lower bound.
        min: u64,
        /// The configured upper bound.
        max: u64,
    },

    /// `unique` was requested on a sequence of non-scalar elements.
    #[error("field '{field}': unique constraint requires scalar elements")]
    UniqueOnNonScalar {
        /// The repeated field name.
        field: String,
    },

    /// A map was wrapped directly in a repeated field.
    #[error(
        "field '{field}': map fields cannot be repeated directly; \
         wrap in a message type first"
    )]
    RepeatedMap {
        /// The repeated field name.
        field: String,
    },

    /// A repeated field was wrapped in another repeated field.
    #[error("field '{field}': repeated fields cannot nest; wrap in a message type first")]
    NestedRepeated {
        /// The repeated field name.
        field: String,
    },

    /// A field marked both `optional` and `required`.
    #[error("field '{field}': a field cannot be both optional and required")]
    ConflictingModifiers {
        /// The field name.
        field: String,
    },

    /// A map key of a type protobuf does not allow as a key.
    #[error("field '{field}': map keys must be integral or string scalars, got '{key_type}'")]
    InvalidMapKey {
        /// The map field name.
        field: String,
        /// The rejected key type.
        key_type: String,
    },

    /// A map value that is itself a map or a repeated field.
    #[error("field '{field}': invalid map value: {reason}")]
    InvalidMapValue {
        /// The map field name.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A rule set on a field type it does not apply to.
    #[error("field '{field}': rule '{rule}' does not apply to type '{proto_type}'")]
    InapplicableRule {
        /// The field name.
        field: String,
        /// The rejected rule name.
        rule: String,
        /// The field's proto type.
        proto_type: String,
    },

    /// An annotation value could not be serialized.
    #[error("annotation format error: {0}")]
    Format(#[from] FormatError),

    /// An option override with a name that cannot be emitted.
    #[error("invalid option name '{name}'")]
    InvalidOptionName {
        /// The rejected option name.
        name: String,
    },

    /// Annotation configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Error while serializing an annotation value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// NaN and infinities have no literal form in annotation syntax.
    #[error("non-finite float {0} cannot be serialized")]
    NonFiniteFloat(f64),

    /// A message entry with an empty key.
    #[error("message keys cannot be empty")]
    EmptyKey,

    /// A message key or identifier value that is not a valid identifier.
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),

    /// A value with no annotation representation (e.g. JSON `null`).
    #[error("unsupported annotation value: {0}")]
    UnsupportedValue(String),
}

/// Aggregated report of every failure found for one field.
///
/// Causes keep their insertion order. Joining another report appends its
/// causes individually, so the report is always flat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildErrors {
    errors: Vec<SchemaError>,
}

impl BuildErrors {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single cause.
    pub fn push(&mut self, error: impl Into<SchemaError>) {
        self.errors.push(error.into());
    }

    /// Append every cause of `other`, flattening it into this report.
    pub fn join(&mut self, other: BuildErrors) {
        self.errors.extend(other.errors);
    }

    /// Returns the number of causes.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if no failure was recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate over the recorded causes in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, SchemaError> {
        self.errors.iter()
    }

    /// Returns true if any recorded cause matches `predicate`.
    pub fn contains(&self, predicate: impl Fn(&SchemaError) -> bool) -> bool {
        self.errors.iter().any(predicate)
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<SchemaError> {
        self.errors
    }

    /// `Ok(value)` when the report is empty, `Err(self)` otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, BuildErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for BuildErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BuildErrors {}

impl From<SchemaError> for BuildErrors {
    fn from(error: SchemaError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl From<FormatError> for BuildErrors {
    fn from(error: FormatError) -> Self {
        SchemaError::from(error).into()
    }
}

impl Extend<SchemaError> for BuildErrors {
    fn extend<I: IntoIterator<Item = SchemaError>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

impl IntoIterator for BuildErrors {
    type Item = SchemaError;
    type IntoIter = std::vec::IntoIter<SchemaError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a BuildErrors {
    type Item = &'a SchemaError;
    type IntoIter = std::slice::Iter<'a, SchemaError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_ok() {
        let report = BuildErrors::new();
        assert!(report.is_empty());
        assert_eq!(report.into_result(7).unwrap(), 7);
    }

    #[test]
    fn test_push_keeps_every_cause() {
        let mut report = BuildErrors::new();
        report.push(SchemaError::BoundsInverted { bound: "items", min: 5, max: 1 });
        report.push(SchemaError::BoundsInverted { bound: "items", min: 5, max: 1 });
        report.push(FormatError::EmptyKey);
        assert_eq!(report.len(), 3);
        assert!(matches!(
            report.iter().nth(2),
            Some(SchemaError::Format(FormatError::EmptyKey))
        ));
    }

    #[test]
    fn test_join_flattens() {
        let mut inner = BuildErrors::new();
        inner.push(SchemaError::NestedRepeated { field: "a".into() });
        inner.push(SchemaError::RepeatedMap { field: "a".into() });

        let mut outer = BuildErrors::from(SchemaError::Config("bad".into()));
        outer.join(inner);

        let causes = outer.into_inner();
        assert_eq!(causes.len(), 3);
        assert!(matches!(causes[0], SchemaError::Config(_)));
        assert!(matches!(causes[2], SchemaError::RepeatedMap { .. }));
    }

    #[test]
    fn test_display_one_cause_per_line() {
        let mut report = BuildErrors::new();
        report.push(SchemaError::UniqueOnNonScalar { field: "tags".into() });
        report.push(SchemaError::NestedRepeated { field: "tags".into() });
        let rendered = report.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("unique constraint requires scalar elements"));
        assert!(lines[1].contains("repeated fields cannot nest"));
    }

    #[test]
    fn test_into_result_err_when_populated() {
        let report = BuildErrors::from(FormatError::NonFiniteFloat(f64::NAN));
        let err = report.into_result(()).unwrap_err();
        assert!(err.contains(|e| matches!(e, SchemaError::Format(_))));
    }
}
