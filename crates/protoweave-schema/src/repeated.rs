//! # Repeated Fields
//!
//! [`RepeatedField`] wraps any other [`FieldBuilder`] and turns it into a
//! sequence of that element type, layering the sequence constraints
//! (`unique`, `min_items`, `max_items`) on top.
//!
//! ## Build Order
//!
//! 1. The wrapped builder is built exactly once.
//! 2. Its failures are joined with the failures recorded while configuring
//!    this builder (an inverted `min_items`/`max_items` pair).
//! 3. The element descriptor is checked: `unique` needs scalar elements, and
//!    neither maps nor repeated fields can be repeated directly.
//! 4. `optional` and `required` on the element are dropped with a warning.
//! 5. Element rules are re-nested under the element's base type and emitted
//!    as one `(buf.validate.field).repeated.items` option, after the
//!    sequence constraints and before the caller's option overrides.
//!
//! Any recorded failure fails the whole build; no partial descriptor is
//! returned and the caller's import set is left untouched. The element is
//! built into a scratch import set that is merged only on success.

use protoweave_core::{
    merge_options, render_option, AnnotationConfig, BuildErrors, CelRule, ImportSet,
    MessageRef, OptionMap, OptionValue, SchemaError,
};

use crate::bounds::CountBounds;
use crate::descriptor::{BuildWarning, FieldDescriptor};
use crate::field::FieldBuilder;

/// Builder for a repeated field wrapping another field builder.
///
/// Configure it with chained calls, then build it once. Rebuilding is not
/// a supported path.
#[derive(Debug)]
pub struct RepeatedField {
    name: String,
    inner: Box<dyn FieldBuilder>,
    type_name: String,
    message_ref: Option<MessageRef>,
    unique: bool,
    items: CountBounds,
    /// Sequence constraints by rule path, in the order they were first set.
    sequence_rules: OptionMap,
    cel_rules: Vec<CelRule>,
    /// Caller option overrides, merged last.
    options: OptionMap,
    config: AnnotationConfig,
    /// Configuration-time failures. Never retracted.
    errors: BuildErrors,
}

impl RepeatedField {
    /// Wrap `inner` as a sequence field called `name`.
    ///
    /// The name given to `inner` is ignored; `name` is authoritative.
    pub fn new(name: impl Into<String>, inner: impl FieldBuilder + 'static) -> Self {
        let type_name = format!("Vec<{}>", inner.type_name());
        let message_ref = inner.message_ref();
        Self {
            name: name.into(),
            inner: Box::new(inner),
            type_name,
            message_ref,
            unique: false,
            items: CountBounds::new("items"),
            sequence_rules: OptionMap::new(),
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

    /// The configured `(min_items, max_items)` pair.
    pub fn item_bounds(&self) -> (Option<u64>, Option<u64>) {
        (self.items.min(), self.items.max())
    }

    /// Rule: every element must be distinct. Fails the build for non-scalar elements.
    pub fn unique(mut self) -> Self {
        self.sequence_rules.insert("repeated.unique", true);
        self.unique = true;
        self
    }

    /// Rule: the field must have at least `n` elements.
    pub fn min_items(mut self, n: u64) -> Self {
        if let Some(e) = self.items.set_min(n) {
            self.errors.push(e);
        }
        self.sequence_rules.insert("repeated.min_items", n);
        self
    }

    /// Rule: the field must have no more than `n` elements.
    pub fn max_items(mut self, n: u64) -> Self {
        if let Some(e) = self.items.set_max(n) {
            self.errors.push(e);
        }
        self.sequence_rules.insert("repeated.max_items", n);
        self
    }

    /// Rule: a custom CEL expression over the whole sequence. Rules
    /// accumulate in call order and are emitted where the first one was set.
    pub fn cel(mut self, rule: CelRule) -> Self {
        self.cel_rules.push(rule);
        self.sequence_rules.insert("cel", self.cel_rules.clone());
        self
    }

    /// Set an option override. Overrides are merged after every generated
    /// option and replace a generated option of the same name.
    pub fn option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(name, value);
        self
    }

    fn drop_modifier(&self, warning: BuildWarning, warnings: &mut Vec<BuildWarning>) {
        if self.config.warn_on_dropped_modifiers {
            tracing::warn!(field = %self.name, "{warning}");
        }
        warnings.push(warning);
    }
}

impl FieldBuilder for RepeatedField {
    fn build(
        &self,
        field_nr: u32,
        imports: &mut ImportSet,
    ) -> Result<FieldDescriptor, BuildErrors> {
        let mut errors = BuildErrors::new();
        let mut element_imports = ImportSet::new();
        let element = match self.inner.build(field_nr, &mut element_imports) {
            Ok(d) => d,
            Err(e) => {
                errors.join(e);
                FieldDescriptor::default()
            }
        };
        errors.join(self.errors.clone());

        if self.unique && element.is_non_scalar {
            errors.push(SchemaError::UniqueOnNonScalar {
                field: self.name.clone(),
            });
        }
        if element.is_map {
            errors.push(SchemaError::RepeatedMap {
                field: self.name.clone(),
            });
        }
        if element.repeated {
            errors.push(SchemaError::NestedRepeated {
                field: self.name.clone(),
            });
        }

        let mut warnings = Vec::new();
        if element.optional {
            self.drop_modifier(
                BuildWarning::DroppedOptional {
                    field: self.name.clone(),
                },
                &mut warnings,
            );
        }
        if element.required {
            self.drop_modifier(
                BuildWarning::DroppedRequired {
                    field: self.name.clone(),
                },
                &mut warnings,
            );
        }

        let mut options = match self.config.qualify(&self.sequence_rules).render() {
            Ok(o) => o,
            Err(e) => {
                errors.join(e);
                Vec::new()
            }
        };

        if !element.rules.is_empty() {
            let items = OptionValue::message([(
                element.proto_base_type.clone(),
                OptionValue::from(element.rules.clone()),
            )]);
            match render_option(&self.config.option_name("repeated.items"), &items) {
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
        imports.merge(element_imports);

        Ok(FieldDescriptor {
            name: self.name.clone(),
            proto_type: element.proto_type,
            proto_base_type: element.proto_base_type,
            type_name: self.type_name.clone(),
            field_nr,
            repeated: true,
            is_non_scalar: true,
            options,
            message_ref: element.message_ref,
            warnings,
            ..FieldDescriptor::default()
        })
    }

    fn type_name(&self) -> String {
        self.type_name.clone()
    }

    fn message_ref(&self) -> Option<MessageRef> {
        self.message_ref.clone()
    }
}
