//! Integration test: repeated field composition over every builder variant.
//!
//! Exercises the public surface the emitter uses: wrap a builder, configure
//! it, build it once, and inspect either the descriptor or the full error
//! report.

use std::cell::Cell;
use std::rc::Rc;

use protoweave_core::{
    format_option_value, AnnotationConfig, BuildErrors, ImportSet, MessageRef, OptionValue,
    SchemaError,
};
use protoweave_schema::{
    BuildWarning, FieldBuilder, FieldDescriptor, MapField, MessageField, RepeatedField,
    ScalarField, ScalarType,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
        .with_test_writer()
        .try_init();
}

fn user_ref() -> MessageRef {
    MessageRef::new("User", "acme.users.v1", "acme/users/v1/user.proto")
}

/// Element builder that counts its builds and records one import per build.
#[derive(Debug)]
struct CountingBuilder {
    builds: Rc<Cell<usize>>,
    fail: bool,
}

impl CountingBuilder {
    fn new(fail: bool) -> (Self, Rc<Cell<usize>>) {
        let builds = Rc::new(Cell::new(0));
        let builder = Self {
            builds: Rc::clone(&builds),
            fail,
        };
        (builder, builds)
    }
}

impl FieldBuilder for CountingBuilder {
    fn build(
        &self,
        field_nr: u32,
        imports: &mut ImportSet,
    ) -> Result<FieldDescriptor, BuildErrors> {
        self.builds.set(self.builds.get() + 1);
        imports.insert("counted.proto");
        if self.fail {
            return Err(SchemaError::ConflictingModifiers {
                field: "counted".to_string(),
            }
            .into());
        }
        Ok(FieldDescriptor {
            name: "counted".to_string(),
            proto_type: "string".to_string(),
            proto_base_type: "string".to_string(),
            type_name: self.type_name(),
            field_nr,
            ..FieldDescriptor::default()
        })
    }

    fn type_name(&self) -> String {
        "String".to_string()
    }

    fn message_ref(&self) -> Option<MessageRef> {
        None
    }
}

#[test]
fn test_element_built_once_on_success() {
    let (inner, builds) = CountingBuilder::new(false);
    let mut imports = ImportSet::new();
    let d = RepeatedField::new("tags", inner)
        .unique()
        .min_items(1)
        .build(1, &mut imports)
        .unwrap();
    assert_eq!(builds.get(), 1);
    assert_eq!(d.proto_type, "string");
    assert!(imports.contains("counted.proto"));
}

#[test]
fn test_element_built_once_on_failure() {
    let (inner, builds) = CountingBuilder::new(true);
    let mut imports = ImportSet::new();
    let err = RepeatedField::new("tags", inner)
        .unique()
        .build(1, &mut imports)
        .unwrap_err();
    assert_eq!(builds.get(), 1);
    assert_eq!(err.len(), 1);
    assert!(imports.is_empty());
}

#[test]
fn test_outer_failure_discards_element_imports() {
    let (inner, builds) = CountingBuilder::new(false);
    let mut imports = ImportSet::new();
    RepeatedField::new("tags", inner)
        .min_items(3)
        .max_items(1)
        .build(1, &mut imports)
        .unwrap_err();
    assert_eq!(builds.get(), 1);
    assert!(imports.is_empty());
}

#[test]
fn test_map_value_built_once() {
    let (value, builds) = CountingBuilder::new(false);
    let mut imports = ImportSet::new();
    MapField::new("labels", ScalarType::String, value)
        .build(1, &mut imports)
        .unwrap();
    assert_eq!(builds.get(), 1);
    assert!(imports.contains("counted.proto"));

    let (value, builds) = CountingBuilder::new(true);
    let mut imports = ImportSet::new();
    MapField::new("labels", ScalarType::String, value)
        .build(1, &mut imports)
        .unwrap_err();
    assert_eq!(builds.get(), 1);
    assert!(imports.is_empty());
}

#[test]
fn test_repeated_messages_pass_reference_through() {
    let mut imports = ImportSet::new();
    let field = RepeatedField::new("members", MessageField::new("member", user_ref()))
        .min_items(1);
    assert_eq!(field.type_name(), "Vec<User>");
    assert_eq!(field.message_ref(), Some(user_ref()));

    let d = field.build(7, &mut imports).expect("repeated message should build");
    assert_eq!(d.name, "members");
    assert_eq!(d.proto_type, "acme.users.v1.User");
    assert_eq!(d.message_ref, Some(user_ref()));
    assert!(imports.contains("acme/users/v1/user.proto"));
}

#[test]
fn test_rule_promotion_exact_option() {
    let inner = ScalarField::new("s", ScalarType::String).rule("pattern", "^a");
    let d = RepeatedField::new("codes", inner)
        .build(1, &mut ImportSet::new())
        .unwrap();

    let expected = OptionValue::try_from(serde_json::json!({"string": {"pattern": "^a"}})).unwrap();
    let expected = format!(
        "(buf.validate.field).repeated.items = {}",
        format_option_value(&expected).unwrap()
    );
    assert_eq!(d.options, vec![expected]);
}

#[test]
fn test_every_structural_problem_reported_at_once() {
    // A failing inner builder, an inverted bound, and a bad override are all
    // reported by one build, inner failures first.
    let inner = ScalarField::new("s", ScalarType::String).gt(1i64);
    let err = RepeatedField::new("names", inner)
        .max_items(1)
        .min_items(4)
        .option("bad name", true)
        .build(1, &mut ImportSet::new())
        .unwrap_err();

    assert_eq!(err.len(), 3, "{err}");
    let causes = err.into_inner();
    assert!(matches!(causes[0], SchemaError::InapplicableRule { .. }));
    assert!(matches!(causes[1], SchemaError::BoundsInverted { min: 4, max: 1, .. }));
    assert!(matches!(causes[2], SchemaError::InvalidOptionName { .. }));
}

#[test]
fn test_unique_and_inverted_bounds_on_messages() {
    let err = RepeatedField::new("users", MessageField::new("u", user_ref()))
        .min_items(3)
        .max_items(2)
        .unique()
        .build(1, &mut ImportSet::new())
        .unwrap_err();
    assert_eq!(err.len(), 2);
    assert!(err.contains(|e| matches!(e, SchemaError::BoundsInverted { .. })));
    assert!(err.contains(|e| matches!(e, SchemaError::UniqueOnNonScalar { .. })));
}

#[test]
fn test_repeated_map_always_fails() {
    let map = MapField::new("m", ScalarType::String, ScalarField::new("v", ScalarType::Int32));
    let err = RepeatedField::new("maps", map)
        .build(1, &mut ImportSet::new())
        .unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err.to_string().contains("map fields cannot be repeated directly"));
}

#[test]
fn test_nested_repeated_always_fails() {
    let inner = RepeatedField::new("inner", ScalarField::new("v", ScalarType::Int32));
    let err = RepeatedField::new("outer", inner)
        .build(1, &mut ImportSet::new())
        .unwrap_err();
    assert!(err.contains(
        |e| matches!(e, SchemaError::NestedRepeated { field } if field == "outer")
    ));
}

#[test]
fn test_dropped_modifier_logged_and_returned() {
    init_tracing();
    let inner = ScalarField::new("t", ScalarType::String).optional().min_len(1);
    let d = RepeatedField::new("tags", inner)
        .build(1, &mut ImportSet::new())
        .expect("optional elements only warn");
    assert!(!d.optional);
    assert_eq!(d.warnings.len(), 1);
    assert!(d.warnings[0].to_string().contains("optional"));
}

#[test]
fn test_silenced_warnings_still_returned() {
    let config = AnnotationConfig::from_yaml_str("warn_on_dropped_modifiers: false").unwrap();
    let d = RepeatedField::new("ids", ScalarField::new("i", ScalarType::Int64).required())
        .with_config(config)
        .build(1, &mut ImportSet::new())
        .unwrap();
    assert_eq!(
        d.warnings,
        vec![BuildWarning::DroppedRequired { field: "ids".to_string() }]
    );
}

#[test]
fn test_invalid_override_fails_whole_build() {
    let err = RepeatedField::new("tags", ScalarField::new("t", ScalarType::String))
        .min_items(1)
        .option("bad name", true)
        .option("weight", f64::NAN)
        .build(1, &mut ImportSet::new())
        .unwrap_err();
    assert_eq!(err.len(), 2);
    assert!(err.contains(|e| matches!(e, SchemaError::InvalidOptionName { .. })));
    assert!(err.contains(|e| matches!(e, SchemaError::Format(_))));
}

#[test]
fn test_descriptor_serializes_for_emitter() {
    let d = RepeatedField::new("scores", ScalarField::new("s", ScalarType::Uint32).lte(100u32))
        .unique()
        .build(5, &mut ImportSet::new())
        .unwrap();
    let json = serde_json::to_value(&d).unwrap();
    assert_eq!(json["name"], "scores");
    assert_eq!(json["repeated"], true);
    assert_eq!(json["type_name"], "Vec<u32>");
    assert_eq!(json["options"].as_array().map(Vec::len), Some(2));
}
