//! # Annotation Configuration
//!
//! Names the validation extension the builders write into and whether
//! dropped field modifiers are logged. Loaded from YAML alongside the rest
//! of a schema project's settings; every key is optional.
//!
//! ```yaml
//! extension: buf.validate.field
//! warn_on_dropped_modifiers: true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::option::OptionMap;

/// Default validation annotation extension.
pub const DEFAULT_EXTENSION: &str = "buf.validate.field";

/// Configuration shared by the field builders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Fully qualified extension that carries validation rules.
    pub extension: String,
    /// Emit a `tracing` warning when a modifier is dropped from a field.
    pub warn_on_dropped_modifiers: bool,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            warn_on_dropped_modifiers: true,
        }
    }
}

impl AnnotationConfig {
    /// Parse a configuration document. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SchemaError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| SchemaError::Config(e.to_string()))?;
        if config.extension.trim().is_empty() {
            return Err(SchemaError::Config(
                "extension must not be empty".to_string(),
            ));
        }
        Ok(config)
    }

    /// Option name for a rule path under the extension, e.g.
    /// `option_name("repeated.unique")` is `(buf.validate.field).repeated.unique`.
    pub fn option_name(&self, path: &str) -> String {
        format!("({}).{path}", self.extension)
    }

    /// Qualify every rule path of `rules` with the extension, keeping order.
    pub fn qualify(&self, rules: &OptionMap) -> OptionMap {
        let mut qualified = OptionMap::new();
        for (path, value) in rules.iter() {
            qualified.insert(self.option_name(path), value.clone());
        }
        qualified
    }
}
