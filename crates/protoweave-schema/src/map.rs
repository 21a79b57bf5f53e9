//! # Map Fields
//!
//! A `map<key, value>` field. Keys are restricted to integral and string
//! scalars; values may be any builder except another map or a repeated
//! field. Element rules of the value are promoted under
//! `(buf.validate.field).map.values`.

use protoweave_core::{
    merge_options, render_option, AnnotationConfig, BuildErrors, CelRule, ImportSet,
    MessageRef, OptionMap, OptionValue, SchemaError,
};

use crate::bounds::CountBounds;
use crate::descriptor::FieldDescriptor;
use crate::field::FieldBuilder;
use crate::scalar::ScalarType;

/// Base type key for map fields.
pub const MAP_BASE_TYPE: &str = "map";

/// Builder for a map field.
#[derive(Debug)]
pub struct MapField {
    name: String,
    key: ScalarType,
    value: Box<dyn FieldBuilder>,
    pairs: CountBounds,
    pair_rules: OptionMap,
    cel_rules: Vec<CelRule>,
    options: OptionMap,
    config: AnnotationConfig,
    errors: BuildErrors,
}

impl MapField {
    /// The value builder's own name is ignored.
    pub fn new(
        name: impl Into<String>,
        key: ScalarType,
        value: impl FieldBuilder + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            key,
            value: Box::new(value),
            pairs: CountBounds::new("pairs"),
            pair_rules: OptionMap::new(),
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

    /// Rule: the map must have at least `n` entries.
    pub fn min_pairs(mut self, n: u64) -> Self {
        if let Some(e) = self.pairs.set_min(n) {
            self.errors.push(e);
        }
        self.pair_rules.insert("map.min_pairs", n);
        self
    }

    /// Rule: the map must have at most `n` entries.
    pub fn max_pairs(mut self, n: u64) -> Self {
        if let Some(e) = self.pairs.set_max(n) {
            self.errors.push(e);
        }
        self.pair_rules.insert("map.max_pairs", n);
        self
    }

    /// Rule: a custom CEL expression over the whole map. Rules accumulate in
    /// call order and are emitted where the first one was set.
    pub fn cel(mut self, rule: CelRule) -> Self {
        self.cel_rules.push(rule);
        self.pair_rules.insert("cel", self.cel_rules.clone());
        self
    }

    /// Set an option override, merged after every generated option.
    pub fn option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(name, value);
        self
    }
}

impl FieldBuilder for MapField {
    fn build(
        &self,
        field_nr: u32,
        imports: &mut ImportSet,
    ) -> Result<FieldDescriptor, BuildErrors> {
        let mut errors = BuildErrors::new();
        let mut value_imports = ImportSet::new();
        let value = match self.value.build(field_nr, &mut value_imports) {
            Ok(d) => d,
            Err(e) => {
                errors.join(e);
                FieldDescriptor::default()
            }
        };
        errors.join(self.errors.clone());

        if !self.key.is_valid_map_key() {
            errors.push(SchemaError::InvalidMapKey {
                field: self.name.clone(),
                key_type: self.key.proto_name().to_string(),
            });
        }
        if value.is_map {
            errors.push(SchemaError::InvalidMapValue {
                field: self.name.clone(),
                reason: "map values cannot be maps".to_string(),
            });
        }
        if value.repeated {
            errors.push(SchemaError::InvalidMapValue {
                field: self.name.clone(),
                reason: "map values cannot be repeated fields".to_string(),
            });
        }

        let mut options = match self.config.qualify(&self.pair_rules).render() {
            Ok(o) => o,
            Err(e) => {
                errors.join(e);
                Vec::new()
            }
        };

        if !value.rules.is_empty() {
            let values = OptionValue::message([(
                value.proto_base_type.clone(),
                OptionValue::from(value.rules.clone()),
            )]);
            match render_option(&self.config.option_name("map.values"), &values) {
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
        imports.merge(value_imports);

        Ok(FieldDescriptor {
            name: self.name.clone(),
            proto_type: format!("map<{}, {}>", self.key.proto_name(), value.proto_type),
            proto_base_type: MAP_BASE_TYPE.to_string(),
            type_name: self.type_name(),
            field_nr,
            is_map: true,
            is_non_scalar: true,
            options,
            message_ref: value.message_ref,
            ..FieldDescriptor::default()
        })
    }

    fn type_name(&self) -> String {
        format!(
            "HashMap<{}, {}>",
            self.key.host_type(),
            self.value.type_name()
        )
    }

    fn message_ref(&self) -> Option<MessageRef> {
        self.value.message_ref()
    }
}
