//! # Message Fields
//!
//! A field whose value is another message type. Building one records the
//! declaring file of the referenced message in the import set.

use protoweave_core::{
    merge_options, render_option, AnnotationConfig, BuildErrors, CelRule, ImportSet,
    MessageRef, OptionMap, OptionValue, SchemaError,
};

use crate::descriptor::FieldDescriptor;
use crate::field::FieldBuilder;

/// Base type key for message-typed elements.
pub const MESSAGE_BASE_TYPE: &str = "message";

/// Builder for a message-typed field.
#[derive(Debug, Clone)]
pub struct MessageField {
    name: String,
    reference: MessageRef,
    optional: bool,
    required: bool,
    cel_rules: Vec<CelRule>,
    options: OptionMap,
    config: AnnotationConfig,
}

impl MessageField {
    /// A field called `name` holding a `reference` message.
    pub fn new(name: impl Into<String>, reference: MessageRef) -> Self {
        Self {
            name: name.into(),
            reference,
            optional: false,
            required: false,
            cel_rules: Vec::new(),
            options: OptionMap::new(),
            config: AnnotationConfig::default(),
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

    /// Rule: the message must be set.
    pub fn required(mut self) -> Self {
        self.required = true;
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
}

impl FieldBuilder for MessageField {
    fn build(
        &self,
        field_nr: u32,
        imports: &mut ImportSet,
    ) -> Result<FieldDescriptor, BuildErrors> {
        let mut errors = BuildErrors::new();

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

        if !errors.is_empty() {
            return Err(errors);
        }

        if !self.reference.file.is_empty() {
            imports.insert_ref(&self.reference);
        }

        Ok(FieldDescriptor {
            name: self.name.clone(),
            proto_type: self.reference.full_name(),
            proto_base_type: MESSAGE_BASE_TYPE.to_string(),
            type_name: self.type_name(),
            field_nr,
            optional: self.optional,
            required: self.required,
            is_non_scalar: true,
            options,
            message_ref: Some(self.reference.clone()),
            ..FieldDescriptor::default()
        })
    }

    fn type_name(&self) -> String {
        self.reference.name.clone()
    }

    fn message_ref(&self) -> Option<MessageRef> {
        Some(self.reference.clone())
    }
}
