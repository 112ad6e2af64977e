#![allow(unused_imports)]
//! Shared test utilities for integration tests.
//!
//! # Modules
//!
//! - `fixtures`: the sample shop type model and seeded generators
//! - `assertions`: assertion helpers with better failure messages

pub mod assertions;
pub mod fixtures;

pub use assertions::{assert_error_contains, assert_in_range, assert_ok};
pub use fixtures::{seeded_generator, shop_model};
