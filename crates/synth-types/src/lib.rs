//! Shared types for the fixture-synth workspace.
//!
//! This crate holds the vocabulary every other crate speaks:
//!
//! - [`TypeKey`] - the type descriptor used as a registry/cache key
//! - [`Value`] / [`Object`] - dynamically typed instances produced by generators
//! - [`Constraint`] - declared size/length bounds attached to members
//! - [`well_known`] - names of the built-in leaf and container types
//! - [`env_utils`] - environment variable parsing used by configuration

pub mod constraint;
pub mod env_utils;
pub mod type_key;
pub mod value;
pub mod well_known;

pub use constraint::{Constraint, ConstraintKind};
pub use type_key::TypeKey;
pub use value::{Object, SeqKind, Value};
