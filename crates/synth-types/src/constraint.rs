//! Declared member constraints.

use serde::{Deserialize, Serialize};

/// What a constraint restricts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Length of a string, or size of a collection/map.
    Size,
}

/// A `[min, max]` bound declared on a field or method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub min: usize,
    pub max: usize,
}

impl Constraint {
    pub fn size(min: usize, max: usize) -> Self {
        Self {
            kind: ConstraintKind::Size,
            min,
            max,
        }
    }

    /// A bound is usable only when it is non-inverted.
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    pub fn admits(&self, len: usize) -> bool {
        (self.min..=self.max).contains(&len)
    }
}
