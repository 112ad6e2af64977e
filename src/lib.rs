//! Fixture Synth
//!
//! Randomized, fully populated test fixtures for the types of a
//! [`TypeModel`].
//!
//! Types are declared once in a model (constructors, factories, builders,
//! fields and setters, each with a callable body). [`ObjectGenerator`] then
//! picks a construction strategy per type, fills in properties, honors size
//! constraints, and produces [`Value`]s that can be inspected directly or
//! deserialized into Rust structs.
//!
//! # Example
//!
//! ```
//! use fixture_synth::{ObjectGenerator, SynthConfig, TypeDef, TypeModel};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Customer {
//!     name: String,
//!     age: i32,
//! }
//!
//! let model = TypeModel::new().with(TypeDef::record(
//!     "shop::Customer",
//!     &[("name", "string"), ("age", "i32")],
//! ));
//! let generator = ObjectGenerator::with_config(model, SynthConfig::seeded(7))?;
//!
//! let customer: Customer = generator.generate_as("shop::Customer")?;
//! assert_eq!(customer.name.len(), 10);
//! # let _ = customer.age;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod object_generator;

pub use config::SynthConfig;
pub use object_generator::{ObjectGenerator, PossibleValues};

pub use synth_core::{
    leaf, model, AccessPolicy, ConstraintRegistry, ConstraintValidator, ConstructionStrategy,
    EngineContext, EngineSettings, GeneratorKind, PopulationReport, RandomSource,
    SizeConstraintValidator, SoftFailure, SynthError, TypeDef, TypeKind, TypeModel,
    ValueGenerator, Visibility,
};
pub use synth_types::{well_known, Constraint, ConstraintKind, Object, SeqKind, TypeKey, Value};
