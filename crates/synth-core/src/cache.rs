//! Memoizing layer over the registry.
//!
//! Once a type key has been resolved, every later lookup returns the same
//! generator handle, including lookups made while resolving other types.
//!
//! A generator whose resolution refused a nested entry (a cycle or the
//! depth bound) depends on the chain it was built under. Such a generator
//! is memoized only when it was resolved at the top of a chain and is then
//! served only to top-level lookups. Nested lookups rebuild it, so cached
//! and uncached resolution produce the same shape.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use synth_core::cache::CachedRegistry;
//! use synth_core::model::{TypeDef, TypeModel};
//! use synth_core::random::RandomSource;
//! use synth_core::registry::{
//!     EngineContext, EngineSettings, GeneratorLookup, ValueGeneratorRegistry,
//! };
//!
//! let model = TypeModel::new().with(TypeDef::record("a::Point", &[("x", "i32")]));
//! let registry = Arc::new(ValueGeneratorRegistry::new(EngineContext::new(
//!     model,
//!     RandomSource::seeded(1),
//!     EngineSettings::default(),
//! )));
//! let cached = CachedRegistry::new(registry);
//!
//! let first = cached.get(&"a::Point".into()).unwrap();
//! let second = cached.get(&"a::Point".into()).unwrap();
//! assert!(first.ptr_eq(&second));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use synth_types::TypeKey;
use tracing::trace;

use crate::error::SynthError;
use crate::generator::ValueGenerator;
use crate::registry::{EngineContext, GeneratorLookup, MemberOverride, ValueGeneratorRegistry};
use crate::scope::ResolutionScope;

#[derive(Clone)]
struct CachedGenerator {
    generator: ValueGenerator,
    /// Resolved without any refused scope entry.
    context_free: bool,
}

impl CachedGenerator {
    fn serves(&self, scope: &ResolutionScope) -> bool {
        self.context_free || scope.depth() == 0
    }
}

pub struct CachedRegistry {
    inner: Arc<ValueGeneratorRegistry>,
    generators: RwLock<HashMap<TypeKey, CachedGenerator>>,
}

impl CachedRegistry {
    pub fn new(inner: Arc<ValueGeneratorRegistry>) -> Self {
        Self {
            inner,
            generators: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &Arc<ValueGeneratorRegistry> {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.generators.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.read().is_empty()
    }

    /// Drop every memoized generator.
    pub fn clear(&self) {
        self.generators.write().clear();
    }
}

impl GeneratorLookup for CachedRegistry {
    fn lookup(
        &self,
        key: &TypeKey,
        scope: &mut ResolutionScope,
    ) -> Result<ValueGenerator, SynthError> {
        if let Some(cached) = self.generators.read().get(key) {
            if cached.serves(scope) {
                trace!(type_key = %key, "generator cache hit");
                return Ok(cached.generator.clone());
            }
        }
        let rejections = scope.rejections();
        let generator = self.inner.resolve(key, scope, self)?;
        let cached = CachedGenerator {
            generator,
            context_free: scope.rejections() == rejections,
        };
        if !cached.serves(scope) {
            trace!(type_key = %key, "not caching generator shaped by an enclosing cycle");
            return Ok(cached.generator);
        }
        // Concurrent resolutions of one key keep whichever landed first.
        let mut generators = self.generators.write();
        Ok(generators.entry(key.clone()).or_insert(cached).generator.clone())
    }

    fn context(&self) -> &EngineContext {
        self.inner.context()
    }

    fn member_overrides(&self, owner: &TypeKey) -> Vec<MemberOverride> {
        self.inner.member_overrides(owner)
    }
}
