//! Recursion guard for nested resolution.

use synth_types::TypeKey;

use crate::error::SynthError;

/// Types currently being resolved, outermost first.
///
/// A type may appear at most once, and the chain may not grow past
/// `max_depth`. Either violation disqualifies the candidate that triggered
/// it instead of recursing further. Rejections are counted, so a caller can
/// tell whether a result was shaped by the chain it was resolved under.
#[derive(Debug, Clone)]
pub struct ResolutionScope {
    in_progress: Vec<TypeKey>,
    max_depth: usize,
    rejections: usize,
}

impl ResolutionScope {
    pub fn new(max_depth: usize) -> Self {
        Self {
            in_progress: Vec::new(),
            max_depth,
            rejections: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.in_progress.len()
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.in_progress.contains(key)
    }

    /// Number of `enter` calls refused so far.
    pub fn rejections(&self) -> usize {
        self.rejections
    }

    /// Mark `key` as in progress.
    pub fn enter(&mut self, key: &TypeKey) -> Result<(), SynthError> {
        if self.contains(key) {
            self.rejections += 1;
            return Err(SynthError::unconstructible(
                key,
                format!("cyclic dependency through {}", self.path()),
            ));
        }
        if self.depth() >= self.max_depth {
            self.rejections += 1;
            return Err(SynthError::unconstructible(
                key,
                format!("resolution depth {} exceeded", self.max_depth),
            ));
        }
        self.in_progress.push(key.clone());
        Ok(())
    }

    /// Finish `key`. Entries above it (left behind by an aborted nested
    /// resolution) are dropped too.
    pub fn exit(&mut self, key: &TypeKey) {
        if let Some(pos) = self.in_progress.iter().rposition(|k| k == key) {
            self.in_progress.truncate(pos);
        }
    }

    fn path(&self) -> String {
        self.in_progress
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
