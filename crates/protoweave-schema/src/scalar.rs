//! # Scalar Fields
//!
//! Builders for the fifteen protobuf scalar types. Element-level rules set
//! here (`min_len`, `pattern`, `gt`, ...) are kept on the descriptor so a
//! wrapping repeated or map builder can re-nest them per element, and are
//! also emitted as a `(buf.validate.field).<type>` option for a standalone
//! field.

use std::fmt;

use protoweave_core::{
    merge_options, render_option, AnnotationConfig, BuildErrors, CelRule, ImportSet,
    MessageRef, OptionMap, OptionValue, Rules, SchemaError,
};

use crate::descriptor::FieldDescriptor;
use crate::field::FieldBuilder;

/// A protobuf scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    /// The proto keyword for the type.
    pub fn proto_name(&self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::Float => "float",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Sint32 => "sint32",
            Self::Sint64 => "sint64",
            Self::Fixed32 => "fixed32",
            Self::Fixed64 => "fixed64",
            Self::Sfixed32 => "sfixed32",
            Self::Sfixed64 => "sfixed64",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Bytes => "bytes",
        }
    }

    /// The Rust type a value of this scalar decodes to.
    pub fn host_type(&self) -> &'static str {
        match self {
            Self::Double => "f64",
            Self::Float => "f32",
            Self::Int32 | Self::Sint32 | Self::Sfixed32 => "i32",
            Self::Int64 | Self::Sint64 | Self::Sfixed64 => "i64",
            Self::Uint32 | Self::Fixed32 => "u32",
            Self::Uint64 | Self::Fixed64 => "u64",
            Self::Bool => "bool",
            Self::String => "String",
            Self::Bytes => "Vec<u8>",
        }
    }

    /// Whether the type is numeric (accepts `gt`, `lt`, ...).
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Bool | Self::String | Self::Bytes)
    }

    /// Whether the type has a length (accepts `min_len`, `pattern`, ...).
    pub fn has_length(&self) -> bool {
        matches!(self, Self::String | Self::Bytes)
    }

    /// Whether protobuf allows the type as a map key.
    pub fn is_valid_map_key(&self) -> bool {
        !matches!(self, Self::Double | Self::Float | Self::Bytes)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.proto_name())
    }
}

/// Builder for a scalar field.
#[derive(Debug, Clone)]
pub struct ScalarField {
    name: String,
    scalar: ScalarType,
    optional: bool,
    required: bool,
    rules: Rules,
    cel_rules: Vec<CelRule>,
    options: OptionMap,
    config: AnnotationConfig,
    errors: BuildErrors,
}

impl ScalarField {
    /// A field called `name` of the given scalar type.
    pub fn new(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar,
            optional: false,
            required: false,
            rules: Rules::new(),
            cel_rules: Vec::new(),
            options: OptionMap::new(),
            config: AnnotationConfig::default(),
            errors: BuildErrors::new(),
        }
    }

    /// Use `config` to name the emitted validation options.
    pub fn with_config(mut self, config: AnnotationConfig) -> Self {
        self.config = config;
        self
    }

    /// Mark the field `optional` (explicit presence).
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Rule: the field must be set.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set an element-level rule by name. The last value for a name wins.
    pub fn rule(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.rules.insert(name.into(), value.into());
        self
    }

    /// Rule: a custom CEL expression. Rules accumulate in call order.
    pub fn cel(mut self, rule: CelRule) -> Self {
        self.cel_rules.push(rule);
        self
    }

    /// Set an option written verbatim after the field's validation options.
    pub fn option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(name, value);
        self
    }

    /// Rule: minimum length (characters for strings, bytes for bytes).
    pub fn min_len(self, n: u64) -> Self {
        self.length_rule("min_len", n.into())
    }

    /// Rule: maximum length.
    pub fn max_len(self, n: u64) -> Self {
        self.length_rule("max_len", n.into())
    }

    /// Rule: the value must match a regular expression.
    pub fn pattern(self, re: impl Into<String>) -> Self {
        self.length_rule("pattern", OptionValue::String(re.into()))
    }

    /// Rule: the value must be greater than `v`.
    pub fn gt(self, v: impl Into<OptionValue>) -> Self {
        self.numeric_rule("gt", v.into())
    }

    /// Rule: the value must be greater than or equal to `v`.
    pub fn gte(self, v: impl Into<OptionValue>) -> Self {
        self.numeric_rule("gte", v.into())
    }

    /// Rule: the value must be less than `v`.
    pub fn lt(self, v: impl Into<OptionValue>) -> Self {
        self.numeric_rule("lt", v.into())
    }

    /// Rule: the value must be less than or equal to `v`.
    pub fn lte(self, v: impl Into<OptionValue>) -> Self {
        self.numeric_rule("lte", v.into())
    }

    /// Rule: the value must equal `v`. Applies to every scalar type.
    pub fn const_value(self, v: impl Into<OptionValue>) -> Self {
        self.rule("const", v)
    }

    fn length_rule(self, rule: &str, value: OptionValue) -> Self {
        let applies = self.scalar.has_length();
        self.checked_rule(rule, value, applies)
    }

    fn numeric_rule(self, rule: &str, value: OptionValue) -> Self {
        let applies = self.scalar.is_numeric();
        self.checked_rule(rule, value, applies)
    }

    fn checked_rule(mut self, rule: &str, value: OptionValue, applies: bool) -> Self {
        if !applies {
            self.errors.push(SchemaError::InapplicableRule {
                field: self.name.clone(),
                rule: rule.to_string(),
                proto_type: self.scalar.proto_name().to_string(),
            });
            return self;
        }
        self.rule(rule, value)
    }
}

impl FieldBuilder for ScalarField {
    fn build(
        &self,
        field_nr: u32,
        _imports: &mut ImportSet,
    ) -> Result<FieldDescriptor, BuildErrors> {
        let mut errors = self.errors.clone();
        let base = self.scalar.proto_name();

        if self.optional && self.required {
            errors.push(SchemaError::ConflictingModifiers {
                field: self.name.clone(),
            });
        }

        let mut options = Vec::new();
        if self.required {
            match render_option(&self.config.option_name("required"), &true.into()) {
                Ok(o) => options.push(o),
                Err(e) => errors.push(e),
            }
        }
        if !self.rules.is_empty() {
            let rules = OptionValue::from(self.rules.clone());
            match render_option(&self.config.option_name(base), &rules) {
                Ok(o) => options.push(o),
                Err(e) => errors.push(e),
            }
        }
        if !self.cel_rules.is_empty() {
            let cel = OptionValue::from(self.cel_rules.clone());
            match render_option(&self.config.option_name("cel"), &cel) {
                Ok(o) => options.push(o),
                Err(e) => errors.push(e),
            }
        }

        let options = match merge_options(&self.options, options) {
            Ok(o) => o,
            Err(e) => {
                errors.join(e);
                Vec::new()
            }
        };

        errors.into_result(FieldDescriptor {
            name: self.name.clone(),
            proto_type: base.to_string(),
            proto_base_type: base.to_string(),
            type_name: self.type_name(),
            field_nr,
            optional: self.optional,
            required: self.required,
            options,
            rules: self.rules.clone(),
            ..FieldDescriptor::default()
        })
    }

    fn type_name(&self) -> String {
        self.scalar.host_type().to_string()
    }

    fn message_ref(&self) -> Option<MessageRef> {
        None
    }
}
