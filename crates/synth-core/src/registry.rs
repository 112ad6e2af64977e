//! Generator registry and lookup order.
//!
//! Resolution of a type key tries, in order:
//!
//! 1. built-in leaf generators
//! 2. caller overrides registered for exactly this key
//! 3. enumeration variants
//! 4. construction through public members
//! 5. construction through any member
//! 6. arrays, built from their component generator
//! 7. the first override registered for an assignable type
//!
//! and fails with [`SynthError::UnconstructibleType`] otherwise. Nested
//! lookups go through a [`GeneratorLookup`], which lets the caching layer
//! interpose on every level of the recursion.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use synth_types::{TypeKey, Value};
use tracing::{debug, trace};

use crate::access::{AccessPolicy, TypeAccess};
use crate::construction;
use crate::constraint::ConstraintRegistry;
use crate::error::SynthError;
use crate::generator::ValueGenerator;
use crate::leaf;
use crate::model::{ConstraintSource, SubtypeDiscovery, TypeKind, TypeModel};
use crate::property;
use crate::random::RandomSource;
use crate::scope::ResolutionScope;

/// Tunables shared by every generator of one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Maximum nesting of in-progress type resolutions.
    pub max_depth: usize,
    /// Inclusive length range of generated arrays.
    pub array_len: (usize, usize),
    /// Length of built-in random strings.
    pub string_len: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_depth: 16,
            array_len: (1, 10),
            string_len: leaf::DEFAULT_STRING_LEN,
        }
    }
}

/// Everything a resolution needs besides the registry state.
#[derive(Clone)]
pub struct EngineContext {
    pub model: Arc<TypeModel>,
    pub random: RandomSource,
    pub settings: EngineSettings,
    pub constraints: ConstraintRegistry,
    pub constraint_source: Arc<dyn ConstraintSource>,
    pub subtypes: Arc<dyn SubtypeDiscovery>,
}

impl EngineContext {
    /// Context whose constraint and subtype queries are answered by `model`.
    pub fn new(model: TypeModel, random: RandomSource, settings: EngineSettings) -> Self {
        let model = Arc::new(model);
        Self {
            constraint_source: model.clone(),
            subtypes: model.clone(),
            model,
            random,
            settings,
            constraints: ConstraintRegistry::default(),
        }
    }

    pub fn with_constraints(mut self, constraints: ConstraintRegistry) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_constraint_source(mut self, source: Arc<dyn ConstraintSource>) -> Self {
        self.constraint_source = source;
        self
    }

    pub fn with_subtype_discovery(mut self, subtypes: Arc<dyn SubtypeDiscovery>) -> Self {
        self.subtypes = subtypes;
        self
    }

    pub fn new_scope(&self) -> ResolutionScope {
        ResolutionScope::new(self.settings.max_depth)
    }
}

/// Generator registered for one member of one type (and its subtypes).
#[derive(Debug, Clone)]
pub struct MemberOverride {
    pub owner: TypeKey,
    pub member: String,
    pub generator: ValueGenerator,
}

/// Source of generators for nested resolution.
pub trait GeneratorLookup: Send + Sync {
    fn lookup(
        &self,
        key: &TypeKey,
        scope: &mut ResolutionScope,
    ) -> Result<ValueGenerator, SynthError>;

    fn context(&self) -> &EngineContext;

    /// Member overrides that apply to `owner`.
    fn member_overrides(&self, owner: &TypeKey) -> Vec<MemberOverride>;

    /// Top-level lookup with a fresh scope.
    fn get(&self, key: &TypeKey) -> Result<ValueGenerator, SynthError> {
        let mut scope = self.context().new_scope();
        self.lookup(key, &mut scope)
    }
}

pub struct ValueGeneratorRegistry {
    context: EngineContext,
    builtins: HashMap<TypeKey, ValueGenerator>,
    overrides: RwLock<HashMap<TypeKey, ValueGenerator>>,
    member_overrides: RwLock<Vec<MemberOverride>>,
}

impl ValueGeneratorRegistry {
    pub fn new(context: EngineContext) -> Self {
        let builtins = leaf::builtin_generators(&context.random, context.settings.string_len);
        Self {
            context,
            builtins,
            overrides: RwLock::new(HashMap::new()),
            member_overrides: RwLock::new(Vec::new()),
        }
    }

    /// Register `generator` for exactly `key`, replacing any previous one.
    pub fn put(&self, key: TypeKey, generator: ValueGenerator) {
        debug!(type_key = %key, "registered generator override");
        self.overrides.write().insert(key, generator);
    }

    /// Register `generator` for `member` of `owner` and its subtypes.
    pub fn put_member(&self, owner: TypeKey, member: &str, generator: ValueGenerator) {
        debug!(owner = %owner, member, "registered member override");
        let mut overrides = self.member_overrides.write();
        overrides.retain(|o| !(o.owner == owner && o.member.eq_ignore_ascii_case(member)));
        overrides.push(MemberOverride {
            owner,
            member: member.to_string(),
            generator,
        });
    }

    pub fn registered(&self, key: &TypeKey) -> Option<ValueGenerator> {
        self.overrides.read().get(key).cloned()
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    /// Run the lookup order for `key`, delegating nested lookups to `lookup`.
    pub fn resolve(
        &self,
        key: &TypeKey,
        scope: &mut ResolutionScope,
        lookup: &dyn GeneratorLookup,
    ) -> Result<ValueGenerator, SynthError> {
        if let Some(generator) = self.builtins.get(key) {
            return Ok(generator.clone());
        }
        if let Some(generator) = self.registered(key) {
            return Ok(generator);
        }

        let model = &*self.context.model;
        if let Some(TypeKind::Enum { variants }) = model.get(key).map(|d| &d.kind) {
            return leaf::enum_choice(&self.context.random, key, variants)
                .map_err(|_| SynthError::unconstructible(key, "enumeration has no variants"));
        }

        let mut failure = None;
        if !key.is_array() {
            match scope.enter(key) {
                Ok(()) => {
                    let found = [AccessPolicy::PublicOnly, AccessPolicy::AllMembers]
                        .into_iter()
                        .find_map(|policy| {
                            let access = TypeAccess::new(model, key.clone(), policy);
                            self.construct(&access, scope, lookup)
                        });
                    scope.exit(key);
                    if let Some(generator) = found {
                        return Ok(generator);
                    }
                }
                Err(err) => {
                    trace!(type_key = %key, error = %err, "skipping construction");
                    failure = Some(err);
                }
            }
        }

        if let Some(component) = key.component() {
            match lookup.lookup(&component, scope) {
                Ok(element) => {
                    return ValueGenerator::array(
                        component,
                        element,
                        self.context.random.clone(),
                        self.context.settings.array_len,
                    );
                }
                Err(err) => failure = Some(err),
            }
        }

        if let Some(generator) = self.assignable_override(key) {
            return Ok(generator);
        }

        Err(failure.unwrap_or_else(|| {
            SynthError::unconstructible(key, "no usable constructor, factory or builder")
        }))
    }

    /// Build from the type itself, or else from one of its implementations,
    /// preferring implementations that already have an override.
    fn construct(
        &self,
        access: &TypeAccess<'_>,
        scope: &mut ResolutionScope,
        lookup: &dyn GeneratorLookup,
    ) -> Option<ValueGenerator> {
        if access.constructable() {
            if let Some(generator) = self.try_construct(access, scope, lookup) {
                return Some(generator);
            }
        }

        let mut implementations = self.context.subtypes.implementations(access.source());
        {
            let overrides = self.overrides.read();
            implementations.sort_by_key(|k| !overrides.contains_key(k));
        }
        for implementation in implementations {
            if let Some(generator) = self.registered(&implementation) {
                return Some(generator);
            }
            let child = access.wrap(&implementation);
            if !child.constructable() {
                continue;
            }
            if let Err(err) = scope.enter(&implementation) {
                trace!(type_key = %implementation, error = %err, "skipping implementation");
                continue;
            }
            let found = self.try_construct(&child, scope, lookup);
            scope.exit(&implementation);
            if found.is_some() {
                return found;
            }
        }
        None
    }

    fn try_construct(
        &self,
        access: &TypeAccess<'_>,
        scope: &mut ResolutionScope,
        lookup: &dyn GeneratorLookup,
    ) -> Option<ValueGenerator> {
        let constructor = construction::resolve(access, lookup, scope)?;
        let properties = property::construct_property_setter(access, lookup, scope);
        debug!(
            type_key = %access.source(),
            strategy = ?constructor.strategy(),
            policy = ?access.policy(),
            properties = properties.len(),
            "resolved object generator"
        );
        Some(ValueGenerator::class(
            access.source().clone(),
            constructor,
            properties,
        ))
    }

    /// Override registered for the first (by key order) type assignable to `key`.
    fn assignable_override(&self, key: &TypeKey) -> Option<ValueGenerator> {
        let model = &*self.context.model;
        let overrides = self.overrides.read();
        let mut candidates: Vec<_> = overrides
            .iter()
            .filter(|(registered, _)| model.is_assignable(registered, key))
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(b.0));
        candidates.first().map(|(_, generator)| (*generator).clone())
    }

    /// Convenience for callers producing one-off values without a facade.
    pub fn generate(&self, key: &TypeKey) -> Result<Value, SynthError> {
        self.get(key)?.generate()
    }
}

impl GeneratorLookup for ValueGeneratorRegistry {
    fn lookup(
        &self,
        key: &TypeKey,
        scope: &mut ResolutionScope,
    ) -> Result<ValueGenerator, SynthError> {
        self.resolve(key, scope, self)
    }

    fn context(&self) -> &EngineContext {
        &self.context
    }

    fn member_overrides(&self, owner: &TypeKey) -> Vec<MemberOverride> {
        let model = &*self.context.model;
        self.member_overrides
            .read()
            .iter()
            .filter(|o| model.is_assignable(owner, &o.owner))
            .cloned()
            .collect()
    }
}
