//! Constraint decorators.
//!
//! Validators wrap a generator so that its output satisfies a declared
//! [`Constraint`]. The size validator understands strings, sequences and
//! maps; every other value passes through untouched.

use std::sync::Arc;

use synth_types::{Constraint, ConstraintKind, Value};
use tracing::trace;

use crate::error::SynthError;
use crate::generator::ValueGenerator;

/// Consecutive regeneration rounds without growth before giving up.
const MAX_STALLED_ROUNDS: usize = 16;

pub trait ConstraintValidator: Send + Sync {
    fn supports(&self, constraint: &Constraint) -> bool;

    /// Wrap `generator` so its output honors `constraint`.
    fn decorate(&self, generator: ValueGenerator, constraint: &Constraint) -> ValueGenerator;
}

/// Grows values below `min` by regenerating and appending, and trims values
/// above `max` from the front.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeConstraintValidator;

impl ConstraintValidator for SizeConstraintValidator {
    fn supports(&self, constraint: &Constraint) -> bool {
        constraint.kind == ConstraintKind::Size
    }

    fn decorate(&self, generator: ValueGenerator, constraint: &Constraint) -> ValueGenerator {
        ValueGenerator::constrained(generator, *constraint, Arc::new(enforce_size))
    }
}

fn enforce_size(inner: &ValueGenerator, constraint: &Constraint) -> Result<Value, SynthError> {
    if !constraint.is_valid() {
        return Err(SynthError::invalid(format!(
            "size constraint min {} exceeds max {}",
            constraint.min, constraint.max
        )));
    }
    let mut value = inner.generate()?;
    if !is_sized(&value) {
        return Ok(value);
    }

    let mut len = value.len().unwrap_or(0);
    let mut stalled = 0;
    while len < constraint.min {
        let more = inner.generate()?;
        append(&mut value, more);
        let grown = value.len().unwrap_or(0);
        if grown == len {
            stalled += 1;
            if stalled >= MAX_STALLED_ROUNDS {
                return Err(SynthError::InvocationFailure {
                    target: format!("size constraint on {}", inner.type_key()),
                    message: format!(
                        "generator stopped growing at {} of {} required",
                        len, constraint.min
                    ),
                });
            }
        } else {
            stalled = 0;
        }
        len = grown;
    }

    if len > constraint.max {
        trace!(len, max = constraint.max, "trimming oversized value");
        truncate_front(&mut value, len - constraint.max);
    }
    Ok(value)
}

fn is_sized(value: &Value) -> bool {
    matches!(value, Value::Str(_) | Value::Seq { .. } | Value::Map(_))
}

fn append(target: &mut Value, more: Value) {
    match more {
        Value::Str(extra) => {
            if let Value::Str(s) = target {
                s.push_str(&extra);
            }
        }
        Value::Seq { items, .. } => {
            for item in items {
                target.push(item);
            }
        }
        Value::Map(entries) => {
            for (k, v) in entries {
                target.insert_entry(k, v);
            }
        }
        _ => {}
    }
}

fn truncate_front(value: &mut Value, excess: usize) {
    match value {
        Value::Str(s) => {
            let cut = s.char_indices().nth(excess).map_or(s.len(), |(i, _)| i);
            s.drain(..cut);
        }
        Value::Seq { items, .. } => {
            items.drain(..excess.min(items.len()));
        }
        Value::Map(entries) => {
            entries.drain(..excess.min(entries.len()));
        }
        _ => {}
    }
}

/// Ordered set of validators applied to constrained members.
#[derive(Clone)]
pub struct ConstraintRegistry {
    validators: Vec<Arc<dyn ConstraintValidator>>,
}

impl ConstraintRegistry {
    /// Registry with no validators; constraints are ignored.
    pub fn empty() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    pub fn with_validator(mut self, validator: impl ConstraintValidator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// For each validator, apply the first constraint it supports.
    pub fn decorate(&self, generator: ValueGenerator, constraints: &[Constraint]) -> ValueGenerator {
        let mut decorated = generator;
        for validator in &self.validators {
            if let Some(constraint) = constraints.iter().find(|c| validator.supports(c)) {
                decorated = validator.decorate(decorated, constraint);
            }
        }
        decorated
    }
}

impl Default for ConstraintRegistry {
    fn default() -> Self {
        Self::empty().with_validator(SizeConstraintValidator)
    }
}
