//! Object construction strategies.
//!
//! Three strategies are tried in order, each ranking its own candidates and
//! keeping the first one whose trial construction succeeds:
//!
//! - [`direct`]: declared constructors
//! - [`factory`]: static methods returning the target type
//! - [`builder`]: a static method returning a builder, fluent setters on
//!   the builder, and a terminal method producing the target
//!
//! Candidates are ranked by arity (most parameters first), then by their
//! signature text, then by declaration order. Any candidate with a
//! parameter related to the target type in either direction is discarded
//! up front.

pub mod builder;
pub mod direct;
pub mod factory;

use std::fmt;

use synth_types::{TypeKey, Value};
use tracing::{debug, trace};

use crate::access::{ConstructorRef, MethodRef, TypeAccess};
use crate::error::SynthError;
use crate::generator::ValueGenerator;
use crate::property::PropertySetter;
use crate::registry::GeneratorLookup;
use crate::scope::ResolutionScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructionStrategy {
    Direct,
    Factory,
    Builder,
}

impl fmt::Display for ConstructionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstructionStrategy::Direct => "direct",
            ConstructionStrategy::Factory => "factory",
            ConstructionStrategy::Builder => "builder",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub enum ObjectConstructor {
    Direct {
        constructor: ConstructorRef,
        args: Vec<ValueGenerator>,
    },
    Factory {
        method: MethodRef,
        args: Vec<ValueGenerator>,
    },
    Builder {
        /// Produces the builder instance.
        factory: MethodRef,
        args: Vec<ValueGenerator>,
        /// Fluent setters applied to the builder before the terminal call.
        setters: PropertySetter,
        terminal: MethodRef,
    },
}

impl ObjectConstructor {
    pub fn strategy(&self) -> ConstructionStrategy {
        match self {
            ObjectConstructor::Direct { .. } => ConstructionStrategy::Direct,
            ObjectConstructor::Factory { .. } => ConstructionStrategy::Factory,
            ObjectConstructor::Builder { .. } => ConstructionStrategy::Builder,
        }
    }

    /// Human-readable name of the member this constructor invokes.
    pub fn describe(&self) -> String {
        match self {
            ObjectConstructor::Direct { constructor, .. } => constructor.describe(),
            ObjectConstructor::Factory { method, .. } => method.describe(),
            ObjectConstructor::Builder {
                factory, terminal, ..
            } => format!("{} .. {}", factory.describe(), terminal.describe()),
        }
    }

    /// Number of parameters of the constructor or factory method.
    pub fn arity(&self) -> usize {
        match self {
            ObjectConstructor::Direct { constructor, .. } => constructor.def.params.len(),
            ObjectConstructor::Factory { method, .. }
            | ObjectConstructor::Builder {
                factory: method, ..
            } => method.def.params.len(),
        }
    }

    pub fn construct(&self) -> Result<Value, SynthError> {
        match self {
            ObjectConstructor::Direct { constructor, args } => {
                let values = generate_all(args)?;
                (constructor.def.body)(&values)
                    .map_err(|e| SynthError::invocation(constructor.describe(), e))
            }
            ObjectConstructor::Factory { method, args } => {
                let values = generate_all(args)?;
                method
                    .def
                    .call_static(&values)
                    .map_err(|e| SynthError::invocation(method.describe(), e))
            }
            ObjectConstructor::Builder {
                factory,
                args,
                setters,
                terminal,
            } => {
                let values = generate_all(args)?;
                let mut builder = factory
                    .def
                    .call_static(&values)
                    .map_err(|e| SynthError::invocation(factory.describe(), e))?;
                let report = setters.apply(&mut builder);
                if !report.is_clean() {
                    trace!(skipped = report.skipped.len(), "builder setters skipped");
                }
                terminal
                    .def
                    .call_instance(&mut builder, &[])
                    .map_err(|e| SynthError::invocation(terminal.describe(), e))?
                    .ok_or_else(|| SynthError::InvocationFailure {
                        target: terminal.describe(),
                        message: "terminal method returned no value".to_string(),
                    })
            }
        }
    }

    /// Argument generators in parameter order. For builders these are the
    /// generators of the fluent setters.
    pub fn value_generators(&self) -> Vec<ValueGenerator> {
        match self {
            ObjectConstructor::Direct { args, .. } | ObjectConstructor::Factory { args, .. } => {
                args.clone()
            }
            ObjectConstructor::Builder { setters, .. } => setters.value_generators(),
        }
    }

    /// Same constructor with its generators replaced, in the order returned
    /// by [`value_generators`](Self::value_generators).
    pub fn clone_with_generators(
        &self,
        generators: Vec<ValueGenerator>,
    ) -> Result<ObjectConstructor, SynthError> {
        let expected = self.value_generators().len();
        if generators.len() != expected {
            return Err(SynthError::invalid(format!(
                "{} expects {} generators, got {}",
                self.describe(),
                expected,
                generators.len()
            )));
        }
        Ok(match self {
            ObjectConstructor::Direct { constructor, .. } => ObjectConstructor::Direct {
                constructor: constructor.clone(),
                args: generators,
            },
            ObjectConstructor::Factory { method, .. } => ObjectConstructor::Factory {
                method: method.clone(),
                args: generators,
            },
            ObjectConstructor::Builder {
                factory,
                args,
                setters,
                terminal,
            } => ObjectConstructor::Builder {
                factory: factory.clone(),
                args: args.clone(),
                setters: setters.clone_with_generators(&mut generators.into_iter())?,
                terminal: terminal.clone(),
            },
        })
    }
}

impl fmt::Debug for ObjectConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.strategy(), self.describe())
    }
}

fn generate_all(generators: &[ValueGenerator]) -> Result<Vec<Value>, SynthError> {
    generators.iter().map(ValueGenerator::generate).collect()
}

/// Pick a constructor for the type behind `access`: direct, then factory,
/// then builder.
pub fn resolve(
    access: &TypeAccess<'_>,
    lookup: &dyn GeneratorLookup,
    scope: &mut ResolutionScope,
) -> Option<ObjectConstructor> {
    let found = direct::resolve(access, lookup, scope)
        .or_else(|| factory::resolve(access, lookup, scope))
        .or_else(|| builder::resolve(access, lookup, scope));
    if let Some(constructor) = &found {
        debug!(
            type_key = %access.source(),
            strategy = %constructor.strategy(),
            member = %constructor.describe(),
            "selected construction strategy"
        );
    }
    found
}

/// A candidate member with its ranking keys.
pub(crate) struct Ranked<T> {
    pub arity: usize,
    pub signature: String,
    pub index: usize,
    pub item: T,
}

/// Most parameters first, then signature text, then declaration order.
pub(crate) fn rank<T>(mut candidates: Vec<Ranked<T>>) -> Vec<T> {
    candidates.sort_by(|a, b| {
        b.arity
            .cmp(&a.arity)
            .then_with(|| a.signature.cmp(&b.signature))
            .then_with(|| a.index.cmp(&b.index))
    });
    candidates.into_iter().map(|c| c.item).collect()
}

/// Whether any parameter would have to be built from the target itself.
pub(crate) fn has_self_reference(access: &TypeAccess<'_>, params: &[TypeKey]) -> bool {
    params.iter().any(|p| access.is_self_referential(p))
}

/// Resolve one generator per parameter.
pub(crate) fn argument_generators(
    params: &[TypeKey],
    lookup: &dyn GeneratorLookup,
    scope: &mut ResolutionScope,
) -> Result<Vec<ValueGenerator>, SynthError> {
    params.iter().map(|p| lookup.lookup(p, scope)).collect()
}

/// Decorate arguments whose parameter name carries a declared constraint
/// on the target type.
pub(crate) fn constrain_parameters(
    constructor: ObjectConstructor,
    param_names: &[String],
    access: &TypeAccess<'_>,
    lookup: &dyn GeneratorLookup,
) -> ObjectConstructor {
    if param_names.is_empty() {
        return constructor;
    }
    let context = lookup.context();
    let mut generators = constructor.value_generators();
    let mut changed = false;
    for (generator, name) in generators.iter_mut().zip(param_names) {
        let constraints = context
            .constraint_source
            .constraints_for(access.source(), name);
        if !constraints.is_empty() {
            *generator = context.constraints.decorate(generator.clone(), &constraints);
            changed = true;
        }
    }
    if !changed {
        return constructor;
    }
    match constructor.clone_with_generators(generators) {
        Ok(decorated) => decorated,
        Err(err) => {
            trace!(error = %err, "keeping undecorated arguments");
            constructor
        }
    }
}

/// Trial run: a candidate qualifies only if it actually produces a value.
pub(crate) fn trial(candidate: ObjectConstructor) -> Option<ObjectConstructor> {
    match candidate.construct() {
        Ok(_) => Some(candidate),
        Err(err) => {
            trace!(
                member = %candidate.describe(),
                error = %err,
                "candidate failed trial construction"
            );
            None
        }
    }
}
