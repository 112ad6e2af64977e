//! Environment variable parsing used by configuration loading.
//!
//! ```
//! use synth_types::env_utils::{env_bool, env_var, env_var_or};
//!
//! let attempts: usize = env_var_or("FIXTURE_SYNTH_ATTEMPTS", 5);
//! let seed: Option<u64> = env_var("FIXTURE_SYNTH_SEED");
//! let caching = env_bool("FIXTURE_SYNTH_CACHING");
//! # let _ = (attempts, seed, caching);
//! ```

use std::str::FromStr;

/// Parse an environment variable; `None` when unset or unparseable.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse an environment variable, falling back to `default`.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Truthy when set to "1", "true", "yes" or "on" (case-insensitive).
pub fn env_bool(key: &str) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
