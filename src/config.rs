//! Generator configuration.

use serde::{Deserialize, Serialize};
use synth_core::{EngineSettings, SynthError};
use synth_types::env_utils::{env_bool, env_var, env_var_or};

pub const ENV_SEED: &str = "FIXTURE_SYNTH_SEED";
pub const ENV_ATTEMPTS: &str = "FIXTURE_SYNTH_ATTEMPTS";
pub const ENV_MAX_DEPTH: &str = "FIXTURE_SYNTH_MAX_DEPTH";
pub const ENV_CACHING: &str = "FIXTURE_SYNTH_CACHING";

/// Configuration for an [`ObjectGenerator`](crate::ObjectGenerator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Seed for the shared random source; entropy when absent.
    pub seed: Option<u64>,
    /// Attempts made by `generate` before giving up.
    pub max_attempts: usize,
    /// Maximum nesting of in-progress type resolutions.
    pub max_depth: usize,
    /// Inclusive length range of generated arrays.
    pub array_len: (usize, usize),
    /// Length of built-in random strings.
    pub string_len: usize,
    /// Number of values produced by `generate_list`.
    pub list_len: usize,
    /// Start with the generator cache enabled.
    pub caching: bool,
}

impl Default for SynthConfig {
    fn default() -> Self {
        let settings = EngineSettings::default();
        Self {
            seed: None,
            max_attempts: 5,
            max_depth: settings.max_depth,
            array_len: settings.array_len,
            string_len: settings.string_len,
            list_len: 2,
            caching: false,
        }
    }
}

impl SynthConfig {
    /// Fixed seed, everything else default.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Defaults overridden by `FIXTURE_SYNTH_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            seed: env_var(ENV_SEED),
            max_attempts: env_var_or(ENV_ATTEMPTS, defaults.max_attempts),
            max_depth: env_var_or(ENV_MAX_DEPTH, defaults.max_depth),
            caching: env_bool(ENV_CACHING),
            ..defaults
        }
    }

    pub fn validate(&self) -> Result<(), SynthError> {
        if self.max_attempts == 0 {
            return Err(SynthError::invalid("max_attempts must be at least 1"));
        }
        if self.max_depth == 0 {
            return Err(SynthError::invalid("max_depth must be at least 1"));
        }
        if self.array_len.0 > self.array_len.1 {
            return Err(SynthError::invalid(format!(
                "array_len {}..={} is empty",
                self.array_len.0, self.array_len.1
            )));
        }
        if self.string_len == 0 {
            return Err(SynthError::invalid("string_len must be at least 1"));
        }
        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            max_depth: self.max_depth,
            array_len: self.array_len,
            string_len: self.string_len,
        }
    }
}
