//! Generator handles.
//!
//! A [`ValueGenerator`] is a cheap, cloneable, thread-safe handle to one
//! generation strategy. Clones share the strategy, so cache identity is
//! observable through [`ValueGenerator::ptr_eq`].

use std::fmt;
use std::sync::Arc;

use synth_types::{Constraint, TypeKey, Value};
use tracing::debug;

use crate::construction::{ConstructionStrategy, ObjectConstructor};
use crate::error::SynthError;
use crate::property::{PopulationReport, PropertySetter};
use crate::random::RandomSource;

/// Zero-argument producer of values.
pub type SupplyFn = Arc<dyn Fn() -> anyhow::Result<Value> + Send + Sync>;

/// Enforcement routine of a constraint decorator.
pub type EnforceFn =
    Arc<dyn Fn(&ValueGenerator, &Constraint) -> Result<Value, SynthError> + Send + Sync>;

pub enum GeneratorKind {
    /// Built-in leaf generator.
    Builtin { type_key: TypeKey, supply: SupplyFn },
    /// Caller-supplied generator.
    Supplied { type_key: TypeKey, supply: SupplyFn },
    /// Uniform choice over a fixed, non-empty value list (enum variants).
    OneOf {
        type_key: TypeKey,
        choices: Vec<Value>,
        random: RandomSource,
    },
    Array {
        component: TypeKey,
        element: ValueGenerator,
        random: RandomSource,
        min_len: usize,
        max_len: usize,
    },
    /// Constructed object followed by property population.
    Class {
        type_key: TypeKey,
        constructor: ObjectConstructor,
        properties: PropertySetter,
    },
    /// Inner generator whose output is adjusted to satisfy a constraint.
    Constrained {
        inner: ValueGenerator,
        constraint: Constraint,
        enforce: EnforceFn,
    },
}

#[derive(Clone)]
pub struct ValueGenerator {
    inner: Arc<GeneratorKind>,
}

impl ValueGenerator {
    fn from_kind(kind: GeneratorKind) -> Self {
        Self {
            inner: Arc::new(kind),
        }
    }

    pub(crate) fn builtin<F>(type_key: impl Into<TypeKey>, supply: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::from_kind(GeneratorKind::Builtin {
            type_key: type_key.into(),
            supply: Arc::new(supply),
        })
    }

    /// Generator backed by a caller-supplied closure.
    pub fn from_fn<F>(type_key: impl Into<TypeKey>, supply: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::from_kind(GeneratorKind::Supplied {
            type_key: type_key.into(),
            supply: Arc::new(supply),
        })
    }

    /// Always yields a clone of `value`.
    pub fn constant(value: Value) -> Self {
        let type_key = value.runtime_type();
        Self::from_fn(type_key, move || Ok(value.clone()))
    }

    pub fn one_of(
        type_key: impl Into<TypeKey>,
        choices: Vec<Value>,
        random: RandomSource,
    ) -> Result<Self, SynthError> {
        let type_key = type_key.into();
        if choices.is_empty() {
            return Err(SynthError::invalid(format!(
                "no values to choose from for {}",
                type_key
            )));
        }
        Ok(Self::from_kind(GeneratorKind::OneOf {
            type_key,
            choices,
            random,
        }))
    }

    pub fn array(
        component: TypeKey,
        element: ValueGenerator,
        random: RandomSource,
        (min_len, max_len): (usize, usize),
    ) -> Result<Self, SynthError> {
        if min_len > max_len {
            return Err(SynthError::invalid(format!(
                "array length range {}..={} is empty",
                min_len, max_len
            )));
        }
        Ok(Self::from_kind(GeneratorKind::Array {
            component,
            element,
            random,
            min_len,
            max_len,
        }))
    }

    pub fn class(
        type_key: TypeKey,
        constructor: ObjectConstructor,
        properties: PropertySetter,
    ) -> Self {
        Self::from_kind(GeneratorKind::Class {
            type_key,
            constructor,
            properties,
        })
    }

    pub fn constrained(inner: ValueGenerator, constraint: Constraint, enforce: EnforceFn) -> Self {
        Self::from_kind(GeneratorKind::Constrained {
            inner,
            constraint,
            enforce,
        })
    }

    pub fn kind(&self) -> &GeneratorKind {
        &self.inner
    }

    /// Type this generator was built for.
    pub fn type_key(&self) -> TypeKey {
        match self.kind() {
            GeneratorKind::Builtin { type_key, .. }
            | GeneratorKind::Supplied { type_key, .. }
            | GeneratorKind::OneOf { type_key, .. }
            | GeneratorKind::Class { type_key, .. } => type_key.clone(),
            GeneratorKind::Array { component, .. } => TypeKey::array_of(component),
            GeneratorKind::Constrained { inner, .. } => inner.type_key(),
        }
    }

    /// Construction strategy behind an object generator.
    pub fn strategy(&self) -> Option<ConstructionStrategy> {
        match self.kind() {
            GeneratorKind::Class { constructor, .. } => Some(constructor.strategy()),
            GeneratorKind::Constrained { inner, .. } => inner.strategy(),
            _ => None,
        }
    }

    pub fn constructor(&self) -> Option<&ObjectConstructor> {
        match self.kind() {
            GeneratorKind::Class { constructor, .. } => Some(constructor),
            _ => None,
        }
    }

    pub fn properties(&self) -> Option<&PropertySetter> {
        match self.kind() {
            GeneratorKind::Class { properties, .. } => Some(properties),
            _ => None,
        }
    }

    /// Whether both handles share one strategy instance.
    pub fn ptr_eq(&self, other: &ValueGenerator) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn generate(&self) -> Result<Value, SynthError> {
        self.generate_with_report().map(|(value, _)| value)
    }

    /// Generate a value along with the soft failures hit while populating
    /// object properties.
    pub fn generate_with_report(&self) -> Result<(Value, PopulationReport), SynthError> {
        match self.kind() {
            GeneratorKind::Builtin { type_key, supply }
            | GeneratorKind::Supplied { type_key, supply } => {
                let value = supply().map_err(|e| {
                    SynthError::invocation(format!("generator for {}", type_key), e)
                })?;
                Ok((value, PopulationReport::default()))
            }
            GeneratorKind::OneOf {
                choices, random, ..
            } => {
                let index = random.gen_index(choices.len());
                Ok((choices[index].clone(), PopulationReport::default()))
            }
            GeneratorKind::Array {
                component,
                element,
                random,
                min_len,
                max_len,
            } => {
                let len = random.gen_len(*min_len..=*max_len);
                let mut report = PopulationReport::default();
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    let (item, item_report) = element.generate_with_report()?;
                    report.merge(item_report);
                    items.push(item);
                }
                let value = Value::Array {
                    component: component.clone(),
                    items,
                };
                Ok((value, report))
            }
            GeneratorKind::Class {
                type_key,
                constructor,
                properties,
            } => {
                let mut value = constructor.construct()?;
                let report = properties.apply(&mut value);
                if !report.is_clean() {
                    debug!(
                        type_key = %type_key,
                        skipped = report.skipped.len(),
                        "populated object with skipped properties"
                    );
                }
                Ok((value, report))
            }
            GeneratorKind::Constrained {
                inner,
                constraint,
                enforce,
            } => Ok((enforce(inner, constraint)?, PopulationReport::default())),
        }
    }
}

impl fmt::Debug for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorKind::Builtin { type_key, .. } => write!(f, "Builtin({})", type_key),
            GeneratorKind::Supplied { type_key, .. } => write!(f, "Supplied({})", type_key),
            GeneratorKind::OneOf {
                type_key, choices, ..
            } => write!(f, "OneOf({}, {} choices)", type_key, choices.len()),
            GeneratorKind::Array {
                component,
                element,
                min_len,
                max_len,
                ..
            } => write!(
                f,
                "Array([{}], {}..={}, {:?})",
                component, min_len, max_len, element
            ),
            GeneratorKind::Class {
                type_key,
                constructor,
                properties,
            } => write!(
                f,
                "Class({} via {:?}, {} properties)",
                type_key,
                constructor.strategy(),
                properties.len()
            ),
            GeneratorKind::Constrained {
                inner, constraint, ..
            } => write!(f, "Constrained({:?}, {:?})", inner, constraint),
        }
    }
}

impl fmt::Debug for ValueGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueGenerator({:?})", self.kind())
    }
}
