//! # protoweave-schema — Field Builders
//!
//! Compiles field configurations into [`FieldDescriptor`]s ready for IDL
//! emission, with validation constraints embedded as annotation options.
//!
//! ## Builders
//!
//! All four variants implement the [`FieldBuilder`] capability:
//!
//! - [`ScalarField`] — the fifteen protobuf scalar types.
//! - [`MessageField`] — a reference to another message type.
//! - [`MapField`] — `map<key, value>` over a scalar key and any value builder.
//! - [`RepeatedField`] — a sequence of any other builder's element type.
//!
//! Wrapping builders own the builder they wrap and build it exactly once.
//!
//! ## Failure Model
//!
//! A build either returns a complete descriptor or a [`BuildErrors`] report
//! naming every problem found. Configuration the builder ignores without
//! failing is listed in [`FieldDescriptor::warnings`] and logged through
//! `tracing`.
//!
//! ## Crate Policy
//!
//! - Depends only on `protoweave-core` internally.
//! - Rendering the final IDL text is the emitter's job, not this crate's.
//!
//! [`BuildErrors`]: protoweave_core::BuildErrors

mod bounds;
pub mod descriptor;
pub mod field;
pub mod map;
pub mod message;
pub mod repeated;
pub mod scalar;

pub use descriptor::{BuildWarning, FieldDescriptor};
pub use field::FieldBuilder;
pub use map::MapField;
pub use message::MessageField;
pub use repeated::RepeatedField;
pub use scalar::{ScalarField, ScalarType};
