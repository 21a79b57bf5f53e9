//! # protoweave-core — Foundational Types for protoweave
//!
//! The leaf crate of the workspace. It defines the data every field builder
//! produces or consumes, without knowing about any particular builder.
//!
//! ## Key Design Principles
//!
//! 1. **Every failure is reported.** Builders collect causes into a
//!    [`BuildErrors`] report instead of returning the first one.
//!
//! 2. **Annotation values are typed until the last moment.** Constraints are
//!    carried as [`OptionValue`] trees and only turned into annotation text by
//!    [`format_option_value`].
//!
//! 3. **Formatting helpers are pure.** [`format_option_value`] and
//!    [`merge_options`] take and return plain data and hold no state.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `protoweave-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod cel;
pub mod config;
pub mod error;
pub mod imports;
pub mod option;

// Re-export primary types for ergonomic imports.
pub use cel::CelRule;
pub use config::{AnnotationConfig, DEFAULT_EXTENSION};
pub use error::{BuildErrors, FormatError, SchemaError};
pub use imports::{ImportSet, MessageRef};
pub use option::{
    format_option_value, is_identifier, merge_options, render_option, Identifier, OptionMap,
    OptionValue, Rules,
};
