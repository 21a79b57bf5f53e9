//! # CEL Rules
//!
//! Custom validation written as a CEL expression. A rule set on a repeated
//! or map field applies to the collection as a whole, not to its elements.

use crate::option::OptionValue;

/// A custom CEL validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CelRule {
    /// Stable identifier reported with violations.
    pub id: String,
    /// Message shown when the expression evaluates to false.
    pub message: String,
    /// The CEL expression, evaluated against `this`.
    pub expression: String,
}

impl CelRule {
    pub fn new(
        id: impl Into<String>,
        message: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            expression: expression.into(),
        }
    }
}

impl From<CelRule> for OptionValue {
    fn from(rule: CelRule) -> Self {
        OptionValue::message([
            ("id", OptionValue::String(rule.id)),
            ("message", OptionValue::String(rule.message)),
            ("expression", OptionValue::String(rule.expression)),
        ])
    }
}
