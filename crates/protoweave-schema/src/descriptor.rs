//! # Field Descriptors
//!
//! The immutable output of a [`FieldBuilder::build`](crate::FieldBuilder::build)
//! call: one schema field's wire and host types, its modifiers, and the
//! annotation options the emitter writes after it.

use std::fmt;

use protoweave_core::{MessageRef, Rules};
use serde::Serialize;

/// Description of a single schema field, ready for emission.
///
/// `Default` is the zero value returned alongside a failed build.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Field identifier, unique within its enclosing message.
    pub name: String,
    /// Wire type as written in the IDL, e.g. `string`, `acme.v1.User`, `map<string, int64>`.
    pub proto_type: String,
    /// Base type the element rules are keyed by, e.g. `string`, `int64`, `message`, `map`.
    pub proto_base_type: String,
    /// Host-language type name, e.g. `String`, `Vec<i64>`.
    pub type_name: String,
    /// Positional tag assigned by the caller.
    pub field_nr: u32,
    pub optional: bool,
    pub repeated: bool,
    pub required: bool,
    pub is_map: bool,
    /// True for messages, maps and sequences; decides whether rules nest.
    pub is_non_scalar: bool,
    /// Serialized annotation options, in emission order.
    pub options: Vec<String>,
    /// Element-level rules, consumed by wrapping builders.
    pub rules: Rules,
    /// Referenced message type, kept for import resolution only.
    pub message_ref: Option<MessageRef>,
    /// Configuration that was dropped while building the field.
    pub warnings: Vec<BuildWarning>,
}

/// Configuration a builder ignored without failing the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildWarning {
    /// `optional` has no meaning on a repeated field.
    DroppedOptional {
        /// The repeated field name.
        field: String,
    },
    /// `required` has no effect on a repeated field; `min_items(1)` expresses it.
    DroppedRequired {
        /// The repeated field name.
        field: String,
    },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DroppedOptional { field } => {
                write!(f, "ignoring 'optional' for repeated field '{field}'")
            }
            Self::DroppedRequired { field } => write!(
                f,
                "ignoring ineffective 'required' for repeated field '{field}' \
                 (set min_items to 1 to require at least one element)"
            ),
        }
    }
}
