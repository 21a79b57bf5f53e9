//! # The Field Builder Capability
//!
//! Every field variant (scalar, message, map, repeated) compiles its
//! configuration into a [`FieldDescriptor`] through this trait. Wrapping
//! builders hold their inner builder as a `Box<dyn FieldBuilder>` and are
//! solely responsible for building it.

use std::fmt;

use protoweave_core::{BuildErrors, ImportSet, MessageRef};

use crate::descriptor::FieldDescriptor;

/// Compiles an in-memory field configuration into a [`FieldDescriptor`].
pub trait FieldBuilder: fmt::Debug {
    /// Build the descriptor for tag `field_nr`, recording referenced files in `imports`.
    ///
    /// # Errors
    ///
    /// Returns every configuration and structural failure found for the
    /// field. A failed build produces no descriptor at all.
    fn build(&self, field_nr: u32, imports: &mut ImportSet)
        -> Result<FieldDescriptor, BuildErrors>;

    /// Host-language type name of the field's value.
    fn type_name(&self) -> String;

    /// Message type the field refers to, if any.
    fn message_ref(&self) -> Option<MessageRef>;
}

impl<F: FieldBuilder + ?Sized> FieldBuilder for Box<F> {
    fn build(
        &self,
        field_nr: u32,
        imports: &mut ImportSet,
    ) -> Result<FieldDescriptor, BuildErrors> {
        (**self).build(field_nr, imports)
    }

    fn type_name(&self) -> String {
        (**self).type_name()
    }

    fn message_ref(&self) -> Option<MessageRef> {
        (**self).message_ref()
    }
}
