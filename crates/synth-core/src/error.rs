//! Engine error types.
//!
//! Hard failures surface as [`SynthError`]. Failures while populating
//! individual properties are soft: they are collected in a
//! [`PopulationReport`](crate::property::PopulationReport) and never abort
//! generation of the enclosing object.

use synth_types::TypeKey;

#[derive(Debug, Clone)]
pub enum SynthError {
    /// No strategy can produce a value of this type.
    UnconstructibleType {
        type_key: TypeKey,
        /// Why the last strategy gave up
        reason: String,
    },

    /// A constructor, factory, builder or user-supplied body failed.
    InvocationFailure {
        /// What was being invoked (e.g. `shop::Item::new(string, i32)`)
        target: String,
        message: String,
    },

    /// Caller-supplied input is unusable (zero attempts, empty choice list,
    /// inverted constraint bounds, ...). Never retried.
    InvalidConfiguration { message: String },

    /// The facade retry budget ran out.
    GenerationExhausted {
        type_key: TypeKey,
        attempts: usize,
        last: Option<Box<SynthError>>,
    },
}

impl SynthError {
    pub fn unconstructible(type_key: &TypeKey, reason: impl Into<String>) -> Self {
        SynthError::UnconstructibleType {
            type_key: type_key.clone(),
            reason: reason.into(),
        }
    }

    /// Wrap an error raised by a member body.
    pub fn invocation(target: impl Into<String>, err: anyhow::Error) -> Self {
        SynthError::InvocationFailure {
            target: target.into(),
            message: format!("{:#}", err),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        SynthError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SynthError::InvalidConfiguration { .. })
    }
}

impl std::fmt::Display for SynthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SynthError::UnconstructibleType { type_key, reason } => {
                write!(f, "no generator can construct {}: {}", type_key, reason)
            }
            SynthError::InvocationFailure { target, message } => {
                write!(f, "invocation of {} failed: {}", target, message)
            }
            SynthError::InvalidConfiguration { message } => {
                write!(f, "invalid configuration: {}", message)
            }
            SynthError::GenerationExhausted {
                type_key,
                attempts,
                last,
            } => {
                write!(f, "failed to generate {} after {} attempts", type_key, attempts)?;
                if let Some(last) = last {
                    write!(f, " (last error: {})", last)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SynthError {}
