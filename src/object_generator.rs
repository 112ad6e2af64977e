//! Public entry point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use serde::de::DeserializeOwned;
use synth_core::{
    CachedRegistry, EngineContext, GeneratorLookup, PopulationReport, RandomSource, SynthError,
    TypeModel, ValueGenerator, ValueGeneratorRegistry,
};
use synth_types::{well_known, TypeKey, Value};
use tracing::{debug, warn};

use crate::config::SynthConfig;

/// Generates populated random values for the types of one [`TypeModel`].
///
/// Overrides and the cache are shared state; all methods take `&self` and
/// the generator can be shared across threads.
pub struct ObjectGenerator {
    config: SynthConfig,
    registry: Arc<ValueGeneratorRegistry>,
    cache: CachedRegistry,
    caching: AtomicBool,
}

impl ObjectGenerator {
    /// Generator with default configuration and an entropy-seeded source.
    pub fn new(model: TypeModel) -> Self {
        let config = SynthConfig::default();
        let context = EngineContext::new(
            model,
            RandomSource::from_seed(config.seed),
            config.engine_settings(),
        );
        Self::build(context, config)
    }

    pub fn with_config(model: TypeModel, config: SynthConfig) -> Result<Self, SynthError> {
        config.validate()?;
        let context = EngineContext::new(
            model,
            RandomSource::from_seed(config.seed),
            config.engine_settings(),
        );
        Ok(Self::build(context, config))
    }

    /// Generator over a prepared context (custom constraint validators,
    /// constraint source or subtype discovery). The context's own settings
    /// and random source are used as given.
    pub fn with_context(context: EngineContext, config: SynthConfig) -> Result<Self, SynthError> {
        config.validate()?;
        Ok(Self::build(context, config))
    }

    fn build(context: EngineContext, config: SynthConfig) -> Self {
        let registry = Arc::new(ValueGeneratorRegistry::new(context));
        Self {
            cache: CachedRegistry::new(registry.clone()),
            caching: AtomicBool::new(config.caching),
            registry,
            config,
        }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn model(&self) -> &TypeModel {
        &self.registry.context().model
    }

    /// Shared random source, for override closures that want reproducible
    /// randomness.
    pub fn random(&self) -> &RandomSource {
        &self.registry.context().random
    }

    fn lookup(&self) -> &dyn GeneratorLookup {
        if self.is_caching() {
            &self.cache
        } else {
            self.registry.as_ref()
        }
    }

    /// Resolve the generator for `key` without producing a value.
    pub fn get_generator(&self, key: impl Into<TypeKey>) -> Result<ValueGenerator, SynthError> {
        let key = checked_key(key.into())?;
        self.lookup().get(&key)
    }

    /// Generate one value, retrying up to the configured attempt count.
    pub fn generate(&self, key: impl Into<TypeKey>) -> Result<Value, SynthError> {
        self.generate_with_attempts(key, self.config.max_attempts)
    }

    /// Generate one value, retrying up to `attempts` times. Configuration
    /// errors are returned immediately.
    pub fn generate_with_attempts(
        &self,
        key: impl Into<TypeKey>,
        attempts: usize,
    ) -> Result<Value, SynthError> {
        let key = checked_key(key.into())?;
        if attempts == 0 {
            return Err(SynthError::invalid("attempts must be at least 1"));
        }
        let mut last = None;
        for attempt in 1..=attempts {
            match self.lookup().get(&key).and_then(|g| g.generate()) {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => {
                    warn!(
                        type_key = %key,
                        attempt,
                        attempts,
                        error = %err,
                        "generation attempt failed"
                    );
                    last = Some(Box::new(err));
                }
            }
        }
        Err(SynthError::GenerationExhausted {
            type_key: key,
            attempts,
            last,
        })
    }

    /// Single attempt, also returning the properties that were skipped.
    pub fn generate_with_report(
        &self,
        key: impl Into<TypeKey>,
    ) -> Result<(Value, PopulationReport), SynthError> {
        self.get_generator(key)?.generate_with_report()
    }

    /// `count` independently generated values.
    pub fn generate_many(
        &self,
        key: impl Into<TypeKey>,
        count: usize,
    ) -> Result<Vec<Value>, SynthError> {
        let key = checked_key(key.into())?;
        (0..count).map(|_| self.generate(key.clone())).collect()
    }

    /// The configured default number of values (two unless changed).
    pub fn generate_list(&self, key: impl Into<TypeKey>) -> Result<Vec<Value>, SynthError> {
        self.generate_many(key, self.config.list_len)
    }

    /// Generate a value and deserialize its JSON form into `T`.
    pub fn generate_as<T: DeserializeOwned>(&self, key: impl Into<TypeKey>) -> anyhow::Result<T> {
        let key = key.into();
        let value = self.generate(key.clone())?;
        serde_json::from_value(value.to_json())
            .with_context(|| format!("generated {} does not deserialize", key))
    }

    /// Use `supply` for every value of exactly `key`.
    pub fn register<F>(&self, key: impl Into<TypeKey>, supply: F)
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let key = key.into();
        self.register_generator(key.clone(), ValueGenerator::from_fn(key, supply));
    }

    pub fn register_generator(&self, key: impl Into<TypeKey>, generator: ValueGenerator) {
        self.registry.put(key.into(), generator);
        self.invalidate();
    }

    /// Use `supply` for `member` of `owner` (and of its subtypes).
    pub fn register_member<F>(&self, owner: impl Into<TypeKey>, member: &str, supply: F)
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let generator = ValueGenerator::from_fn(well_known::ANY, supply);
        self.register_member_generator(owner, member, generator);
    }

    pub fn register_member_generator(
        &self,
        owner: impl Into<TypeKey>,
        member: &str,
        generator: ValueGenerator,
    ) {
        self.registry.put_member(owner.into(), member, generator);
        self.invalidate();
    }

    /// Endless, restartable sequence of values of `key`.
    pub fn possible_values(&self, key: impl Into<TypeKey>) -> PossibleValues<'_> {
        PossibleValues {
            generator: self,
            type_key: key.into(),
        }
    }

    pub fn enable_caching(&self) {
        debug!("generator caching enabled");
        self.caching.store(true, Ordering::SeqCst);
    }

    /// Disable caching and forget every cached generator.
    pub fn disable_caching(&self) {
        debug!("generator caching disabled");
        self.caching.store(false, Ordering::SeqCst);
        self.cache.clear();
    }

    pub fn is_caching(&self) -> bool {
        self.caching.load(Ordering::SeqCst)
    }

    // Cached generators may embed the replaced generators.
    fn invalidate(&self) {
        self.cache.clear();
    }
}

fn checked_key(key: TypeKey) -> Result<TypeKey, SynthError> {
    if key.as_str().trim().is_empty() {
        return Err(SynthError::invalid("type key must not be empty"));
    }
    Ok(key)
}

/// Endless sequence of values of one type. Every pull generates a fresh
/// value, so any clone is an independent restart.
#[derive(Clone)]
pub struct PossibleValues<'a> {
    generator: &'a ObjectGenerator,
    type_key: TypeKey,
}

impl PossibleValues<'_> {
    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }
}

impl Iterator for PossibleValues<'_> {
    type Item = Result<Value, SynthError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generator.generate(self.type_key.clone()))
    }
}
