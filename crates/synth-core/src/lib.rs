//! Synth Core
//!
//! Type-driven value synthesis: given a [`TypeModel`](model::TypeModel)
//! describing constructors, methods and fields, produce populated random
//! instances of any declared type.
//!
//! # Features
//!
//! - **Leaf generators**: random scalars and strings, empty containers
//! - **Construction**: direct constructors, static factories and builders,
//!   each validated by a trial construction
//! - **Population**: writable fields and `set*`/`add*` methods, best effort
//! - **Constraints**: size bounds on strings, collections and maps
//! - **Caching**: stable generator identity per type key
//!
//! # Core Modules
//!
//! - [`model`]: type declarations standing in for runtime reflection
//! - [`access`]: policy-filtered view of one type
//! - [`registry`]: lookup order and caller overrides
//! - [`construction`]: the three construction strategies
//! - [`property`]: property setters and population reports
//! - [`constraint`]: constraint decorators
//! - [`cache`]: memoizing lookup layer
//!
//! # Example
//!
//! ```
//! use synth_core::model::{TypeDef, TypeModel};
//! use synth_core::random::RandomSource;
//! use synth_core::registry::{
//!     EngineContext, EngineSettings, GeneratorLookup, ValueGeneratorRegistry,
//! };
//!
//! let model = TypeModel::new().with(TypeDef::record(
//!     "shop::Customer",
//!     &[("name", "string"), ("age", "i32")],
//! ));
//! let registry = ValueGeneratorRegistry::new(EngineContext::new(
//!     model,
//!     RandomSource::seeded(7),
//!     EngineSettings::default(),
//! ));
//!
//! let customer = registry.get(&"shop::Customer".into())?.generate()?;
//! assert!(customer.field("name").is_some());
//! # Ok::<(), synth_core::error::SynthError>(())
//! ```

#![allow(clippy::type_complexity)]

pub mod access;
pub mod cache;
pub mod constraint;
pub mod construction;
pub mod error;
pub mod generator;
pub mod leaf;
pub mod model;
pub mod property;
pub mod random;
pub mod registry;
pub mod scope;

pub use access::{AccessPolicy, TypeAccess};
pub use cache::CachedRegistry;
pub use constraint::{ConstraintRegistry, ConstraintValidator, SizeConstraintValidator};
pub use construction::{ConstructionStrategy, ObjectConstructor};
pub use error::SynthError;
pub use generator::{GeneratorKind, ValueGenerator};
pub use model::{TypeDef, TypeKind, TypeModel, Visibility};
pub use property::{PopulationReport, PropertySetter, SoftFailure};
pub use random::RandomSource;
pub use registry::{EngineContext, EngineSettings, GeneratorLookup, ValueGeneratorRegistry};
pub use scope::ResolutionScope;
