//! Property population.
//!
//! After construction, an object is populated through its writable fields
//! and one-argument `set*`/`add*` methods. Members typed as collections get
//! an empty container followed by one call to a matching `add*` method. A
//! collection member with declared size constraints is instead assigned a
//! container already filled to a conforming size with elements of the
//! `add*` parameter type.
//!
//! Population is best effort: a member that cannot be written is recorded
//! as a [`SoftFailure`] and the remaining members are still applied. A
//! non-public member is first attempted as-is and then retried once with
//! elevated access.

use std::collections::HashSet;

use anyhow::{bail, Result};
use synth_types::{well_known, TypeKey, Value};
use tracing::trace;

use crate::access::{FieldRef, MethodRef, TypeAccess};
use crate::error::SynthError;
use crate::generator::ValueGenerator;
use crate::model::set_field;
use crate::registry::GeneratorLookup;
use crate::scope::ResolutionScope;

/// One member that could not be populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftFailure {
    pub member: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct PopulationReport {
    pub applied: usize,
    pub skipped: Vec<SoftFailure>,
}

impl PopulationReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn merge(&mut self, other: PopulationReport) {
        self.applied += other.applied;
        self.skipped.extend(other.skipped);
    }
}

/// Writes one generated value through a setter method or, failing that, a
/// field.
#[derive(Debug, Clone)]
pub struct SimpleSetter {
    pub field: Option<FieldRef>,
    pub method: Option<MethodRef>,
    pub generator: ValueGenerator,
}

impl SimpleSetter {
    pub fn member(&self) -> String {
        match (&self.field, &self.method) {
            (Some(field), _) => format!("{}.{}", field.declaring, field.def.name),
            (None, Some(method)) => method.describe(),
            (None, None) => String::from("<none>"),
        }
    }

    /// Structural identity used for de-duplication.
    pub fn identity(&self) -> (String, String) {
        (
            self.field
                .as_ref()
                .map(|f| f.def.name.to_lowercase())
                .unwrap_or_default(),
            self.method
                .as_ref()
                .map(|m| m.def.name.clone())
                .unwrap_or_default(),
        )
    }

    fn assign(&self, target: &mut Value, value: Value, elevated: bool) -> Result<()> {
        if let Some(method) = &self.method {
            if !elevated && !method.def.visibility.is_public() {
                bail!("{} is not accessible", method.describe());
            }
            method.def.call_instance(target, &[value])?;
            return Ok(());
        }
        if let Some(field) = &self.field {
            if !elevated && !field.def.visibility.is_public() {
                bail!("field {} is not accessible", field.def.name);
            }
            return set_field(target, &field.def.name, value);
        }
        bail!("setter has neither a method nor a field")
    }

    fn apply(&self, target: &mut Value) -> Result<(), SoftFailure> {
        let value = self
            .generator
            .generate()
            .map_err(|e| soft(self.member(), e.to_string()))?;
        with_access_retry(&self.member(), |elevated| {
            self.assign(target, value.clone(), elevated)
        })
    }
}

/// `add*` call applied after a collection member is initialized.
#[derive(Debug, Clone)]
pub struct AddSetter {
    pub method: MethodRef,
    pub generator: ValueGenerator,
}

/// Empty container first, then one element through the add method.
#[derive(Debug, Clone)]
pub struct CollectionSetter {
    pub initial: SimpleSetter,
    pub add: Option<AddSetter>,
    /// `initial` assigns a container already filled within the member's
    /// size constraints, so `add` is never called.
    pub prefilled: bool,
}

impl CollectionSetter {
    fn apply(&self, target: &mut Value) -> Result<(), SoftFailure> {
        self.initial.apply(target)?;
        let Some(add) = self.add.as_ref().filter(|_| !self.prefilled) else {
            return Ok(());
        };
        let member = add.method.describe();
        let item = add
            .generator
            .generate()
            .map_err(|e| soft(member.clone(), e.to_string()))?;
        with_access_retry(&member, |elevated| {
            if !elevated && !add.method.def.visibility.is_public() {
                bail!("{} is not accessible", member);
            }
            add.method.def.call_instance(target, &[item.clone()])?;
            Ok(())
        })
    }
}

#[derive(Debug, Clone)]
pub enum PropertySetter {
    Simple(SimpleSetter),
    Collection(CollectionSetter),
    Combined(Vec<PropertySetter>),
}

impl PropertySetter {
    /// Populate `target`, collecting failures instead of stopping at them.
    pub fn apply(&self, target: &mut Value) -> PopulationReport {
        let mut report = PopulationReport::default();
        self.apply_into(target, &mut report);
        report
    }

    fn apply_into(&self, target: &mut Value, report: &mut PopulationReport) {
        let outcome = match self {
            PropertySetter::Simple(setter) => setter.apply(target),
            PropertySetter::Collection(setter) => setter.apply(target),
            PropertySetter::Combined(setters) => {
                for setter in setters {
                    setter.apply_into(target, report);
                }
                return;
            }
        };
        match outcome {
            Ok(()) => report.applied += 1,
            Err(failure) => {
                trace!(member = %failure.member, reason = %failure.reason, "skipped property");
                report.skipped.push(failure);
            }
        }
    }

    /// Number of top-level setters.
    pub fn len(&self) -> usize {
        match self {
            PropertySetter::Combined(setters) => setters.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, PropertySetter::Collection(_))
    }

    pub fn identity(&self) -> (String, String) {
        match self {
            PropertySetter::Simple(setter) => setter.identity(),
            PropertySetter::Collection(setter) => setter.initial.identity(),
            PropertySetter::Combined(_) => (String::new(), String::new()),
        }
    }

    /// Generators that produce member values. A collection setter only
    /// contributes its element generator, or its container generator when
    /// prefilled.
    pub fn value_generators(&self) -> Vec<ValueGenerator> {
        match self {
            PropertySetter::Simple(setter) => vec![setter.generator.clone()],
            PropertySetter::Collection(setter) if setter.prefilled => {
                vec![setter.initial.generator.clone()]
            }
            PropertySetter::Collection(setter) => setter
                .add
                .iter()
                .map(|add| add.generator.clone())
                .collect(),
            PropertySetter::Combined(setters) => {
                setters.iter().flat_map(|s| s.value_generators()).collect()
            }
        }
    }

    /// Same setters, drawing replacement generators from `generators` in
    /// [`value_generators`](Self::value_generators) order.
    pub fn clone_with_generators(
        &self,
        generators: &mut dyn Iterator<Item = ValueGenerator>,
    ) -> Result<PropertySetter, SynthError> {
        Ok(match self {
            PropertySetter::Simple(setter) => PropertySetter::Simple(SimpleSetter {
                generator: next_generator(generators)?,
                ..setter.clone()
            }),
            PropertySetter::Collection(setter) if setter.prefilled => {
                PropertySetter::Collection(CollectionSetter {
                    initial: SimpleSetter {
                        generator: next_generator(generators)?,
                        ..setter.initial.clone()
                    },
                    ..setter.clone()
                })
            }
            PropertySetter::Collection(setter) => {
                let add = match &setter.add {
                    Some(add) => Some(AddSetter {
                        method: add.method.clone(),
                        generator: next_generator(generators)?,
                    }),
                    None => None,
                };
                PropertySetter::Collection(CollectionSetter {
                    initial: setter.initial.clone(),
                    add,
                    prefilled: false,
                })
            }
            PropertySetter::Combined(setters) => PropertySetter::Combined(
                setters
                    .iter()
                    .map(|s| s.clone_with_generators(generators))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

fn next_generator(
    generators: &mut dyn Iterator<Item = ValueGenerator>,
) -> Result<ValueGenerator, SynthError> {
    generators
        .next()
        .ok_or_else(|| SynthError::invalid("too few generators for property setters"))
}

fn soft(member: String, reason: String) -> SoftFailure {
    SoftFailure { member, reason }
}

/// Run `assign` normally, then once more with elevated access on failure.
fn with_access_retry(
    member: &str,
    mut assign: impl FnMut(bool) -> Result<()>,
) -> Result<(), SoftFailure> {
    if let Err(first) = assign(false) {
        trace!(member, error = %first, "retrying with elevated access");
        assign(true).map_err(|e| soft(member.to_string(), format!("{:#}", e)))?;
    }
    Ok(())
}

/// `setName` / `addName` / `getName` -> `name`, lower-cased.
pub fn extract_member_name(name: &str) -> String {
    let lower = name.to_lowercase();
    for prefix in ["set", "add", "get"] {
        if let Some(rest) = lower.strip_prefix(prefix) {
            return rest.to_string();
        }
    }
    lower
}

/// Combined setter for every populatable member of the type behind `access`.
pub fn construct_property_setter(
    access: &TypeAccess<'_>,
    lookup: &dyn GeneratorLookup,
    scope: &mut ResolutionScope,
) -> PropertySetter {
    PropertySetter::Combined(extract_available_properties(access, lookup, scope))
}

/// Setters for member overrides, writable fields and property methods,
/// de-duplicated by identity (most derived declaration wins) and ordered
/// with collection setters last.
pub fn extract_available_properties(
    access: &TypeAccess<'_>,
    lookup: &dyn GeneratorLookup,
    scope: &mut ResolutionScope,
) -> Vec<PropertySetter> {
    let fields: Vec<FieldRef> = access
        .fields()
        .into_iter()
        .filter(|f| f.def.writable)
        .collect();
    let methods: Vec<MethodRef> = access
        .methods()
        .into_iter()
        .filter(|m| is_property_method(access.source(), m))
        .collect();

    let mut seen = HashSet::new();
    let mut setters = Vec::new();
    let mut keep = |setter: PropertySetter, setters: &mut Vec<PropertySetter>| {
        if seen.insert(setter.identity()) {
            setters.push(setter);
        }
    };

    for member_override in lookup.member_overrides(access.source()) {
        let member = member_override.member.to_lowercase();
        let field = find_field(&fields, &member);
        let method = find_set_method(&methods, &member);
        if field.is_none() && method.is_none() {
            trace!(member = %member, "member override matches nothing");
            continue;
        }
        let generator = constrain(access, lookup, &member, member_override.generator);
        keep(
            PropertySetter::Simple(SimpleSetter {
                field,
                method,
                generator,
            }),
            &mut setters,
        );
    }

    for field in &fields {
        let member = field.def.name.to_lowercase();
        let method = find_set_method(&methods, &member);
        if let Some(setter) =
            create_setter(access, lookup, scope, Some(field.clone()), method, &methods)
        {
            keep(setter, &mut setters);
        }
    }

    for method in &methods {
        let member = extract_member_name(&method.def.name);
        let field = find_field(&fields, &member);
        if let Some(setter) =
            create_setter(access, lookup, scope, field, Some(method.clone()), &methods)
        {
            keep(setter, &mut setters);
        }
    }

    // add methods already driven by a collection setter are not applied on their own
    let claimed: HashSet<String> = setters
        .iter()
        .filter_map(|s| match s {
            PropertySetter::Collection(c) => c.add.as_ref().map(|a| a.method.def.name.clone()),
            _ => None,
        })
        .collect();
    setters.retain(|s| match s {
        PropertySetter::Simple(simple) => !(simple.field.is_none()
            && simple
                .method
                .as_ref()
                .is_some_and(|m| claimed.contains(&m.def.name))),
        _ => true,
    });

    setters.sort_by(|a, b| {
        a.is_collection()
            .cmp(&b.is_collection())
            .then_with(|| a.identity().cmp(&b.identity()))
    });
    setters
}

/// One-argument instance `set*`/`add*` method whose parameter is neither the
/// catch-all type nor the owner itself.
fn is_property_method(owner: &TypeKey, method: &MethodRef) -> bool {
    let name = method.def.name.to_lowercase();
    !method.def.is_static()
        && method.def.params.len() == 1
        && (name.starts_with("set") || name.starts_with("add"))
        && !method.def.params[0].is_any()
        && method.def.params[0] != *owner
}

fn find_field(fields: &[FieldRef], member: &str) -> Option<FieldRef> {
    fields
        .iter()
        .find(|f| f.def.name.to_lowercase() == member)
        .cloned()
}

fn find_set_method(methods: &[MethodRef], member: &str) -> Option<MethodRef> {
    methods
        .iter()
        .find(|m| {
            m.def.name.to_lowercase().starts_with("set")
                && extract_member_name(&m.def.name) == member
        })
        .cloned()
}

/// `add*` method whose member name is a prefix of `member` or vice versa
/// (`addItem` serves `items`).
fn find_add_method(methods: &[MethodRef], member: &str) -> Option<MethodRef> {
    methods
        .iter()
        .find(|m| {
            if !m.def.name.to_lowercase().starts_with("add") {
                return false;
            }
            let added = extract_member_name(&m.def.name);
            !added.is_empty() && (member.starts_with(&added) || added.starts_with(member))
        })
        .cloned()
}

fn create_setter(
    access: &TypeAccess<'_>,
    lookup: &dyn GeneratorLookup,
    scope: &mut ResolutionScope,
    field: Option<FieldRef>,
    method: Option<MethodRef>,
    methods: &[MethodRef],
) -> Option<PropertySetter> {
    let (ty, member) = match (&field, &method) {
        (Some(f), _) => (f.def.ty.clone(), f.def.name.to_lowercase()),
        (None, Some(m)) => (m.def.params[0].clone(), extract_member_name(&m.def.name)),
        (None, None) => return None,
    };
    let generator = match lookup.lookup(&ty, scope) {
        Ok(generator) => generator,
        Err(err) => {
            trace!(
                owner = %access.source(),
                member = %member,
                error = %err,
                "no generator for member"
            );
            return None;
        }
    };

    let model = &lookup.context().model;
    if model.is_assignable(&ty, &well_known::COLLECTION.into()) {
        let add = find_add_method(methods, &member).and_then(|m| {
            let element = lookup.lookup(&m.def.params[0], scope).ok()?;
            Some(AddSetter {
                method: m,
                generator: element,
            })
        });
        let context = lookup.context();
        let constraints = context
            .constraint_source
            .constraints_for(access.source(), &member);
        if constraints.is_empty() {
            return Some(PropertySetter::Collection(CollectionSetter {
                initial: SimpleSetter {
                    field,
                    method,
                    generator,
                },
                add,
                prefilled: false,
            }));
        }
        let filled = match &add {
            Some(add) => filled_container(generator, add.generator.clone()),
            None => generator,
        };
        return Some(PropertySetter::Collection(CollectionSetter {
            initial: SimpleSetter {
                field,
                method,
                generator: context.constraints.decorate(filled, &constraints),
            },
            add,
            prefilled: true,
        }));
    }

    Some(PropertySetter::Simple(SimpleSetter {
        field,
        method,
        generator: constrain(access, lookup, &member, generator),
    }))
}

/// Container holding one generated element. Size enforcement grows it by
/// appending further draws.
fn filled_container(container: ValueGenerator, element: ValueGenerator) -> ValueGenerator {
    ValueGenerator::from_fn(container.type_key(), move || {
        let mut items = container.generate()?;
        items.push(element.generate()?);
        Ok(items)
    })
}

fn constrain(
    access: &TypeAccess<'_>,
    lookup: &dyn GeneratorLookup,
    member: &str,
    generator: ValueGenerator,
) -> ValueGenerator {
    let context = lookup.context();
    let constraints = context.constraint_source.constraints_for(access.source(), member);
    if constraints.is_empty() {
        generator
    } else {
        context.constraints.decorate(generator, &constraints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TypeDef, TypeModel, Visibility};
    use crate::random::RandomSource;
    use crate::registry::{EngineContext, EngineSettings, ValueGeneratorRegistry};
    use synth_types::{Constraint, Object};

    fn registry(model: TypeModel) -> ValueGeneratorRegistry {
        ValueGeneratorRegistry::new(EngineContext::new(
            model,
            RandomSource::seeded(13),
            EngineSettings::default(),
        ))
    }

    fn setters_for(reg: &ValueGeneratorRegistry, key: &str) -> Vec<PropertySetter> {
        let access = TypeAccess::public(&reg.context().model, key.into());
        let mut scope = reg.context().new_scope();
        extract_available_properties(&access, reg, &mut scope)
    }

    #[test]
    fn test_member_name_extraction() {
        assert_eq!(extract_member_name("setName"), "name");
        assert_eq!(extract_member_name("AddItem"), "item");
        assert_eq!(extract_member_name("getId"), "id");
        assert_eq!(extract_member_name("reset"), "reset");
    }

    #[test]
    fn test_field_and_setter_collapse_into_one() {
        let reg = registry(TypeModel::new().with(
            TypeDef::record("a::User", &[("name", "string")]).setter("name", "string"),
        ));
        let setters = setters_for(&reg, "a::User");
        assert_eq!(setters.len(), 1);
        assert_eq!(
            setters[0].identity(),
            ("name".to_string(), "setName".to_string())
        );
    }

    #[test]
    fn test_collections_last_with_single_add() {
        let reg = registry(
            TypeModel::new().with(
                TypeDef::record("a::Cart", &[("items", "list"), ("owner", "string")])
                    .adder("item", "items", "string"),
            ),
        );
        let setters = setters_for(&reg, "a::Cart");
        assert_eq!(setters.len(), 2);
        assert!(!setters[0].is_collection());
        assert!(setters[1].is_collection());

        let mut cart = Value::Object(Object::new("a::Cart"));
        let report = PropertySetter::Combined(setters).apply(&mut cart);
        assert!(report.is_clean());
        assert_eq!(report.applied, 2);
        assert_eq!(cart.field("items").and_then(Value::len), Some(1));
    }

    #[test]
    fn test_self_typed_and_any_methods_excluded() {
        let reg = registry(
            TypeModel::new().with(
                TypeDef::record("a::Node", &[])
                    .method("setNext", Visibility::Public, &["a::Node"], None, |_, _| Ok(None))
                    .method("setTag", Visibility::Public, &["any"], None, |_, _| Ok(None)),
            ),
        );
        assert!(setters_for(&reg, "a::Node").is_empty());
    }

    #[test]
    fn test_self_typed_field_skipped_during_resolution() {
        let reg = registry(TypeModel::new().with(TypeDef::record(
            "a::Node",
            &[("next", "a::Node"), ("label", "string")],
        )));
        let generator = reg.get(&"a::Node".into()).unwrap();
        let value = generator.generate().unwrap();
        assert!(value.field("label").is_some());
        assert!(value.field("next").is_none());
    }

    #[test]
    fn test_private_field_written_after_elevation() {
        let reg = registry(TypeModel::new().with(
            TypeDef::class("a::Account")
                .default_constructor()
                .field("balance", "i64", Visibility::Private)
                .method("setBalance", Visibility::Public, &["i64"], None, |v, args| {
                    set_field(v, "balance", args[0].clone())?;
                    Ok(None)
                }),
        ));
        let access = TypeAccess::all_members(&reg.context().model, "a::Account".into());
        let mut scope = reg.context().new_scope();
        let setters = extract_available_properties(&access, &reg, &mut scope);
        assert_eq!(setters.len(), 1);

        let private_only = SimpleSetter {
            method: None,
            ..match &setters[0] {
                PropertySetter::Simple(s) => s.clone(),
                other => panic!("unexpected setter {:?}", other),
            }
        };
        let mut account = Value::Object(Object::new("a::Account"));
        let report = PropertySetter::Simple(private_only).apply(&mut account);
        assert!(report.is_clean());
        assert!(matches!(account.field("balance"), Some(Value::I64(_))));
    }

    #[test]
    fn test_failing_setter_is_soft() {
        let reg = registry(
            TypeModel::new().with(
                TypeDef::record("a::Form", &[("title", "string")]).method(
                    "setCount",
                    Visibility::Public,
                    &["i32"],
                    None,
                    |_, _| Err(anyhow::anyhow!("rejected")),
                ),
            ),
        );
        let generator = reg.get(&"a::Form".into()).unwrap();
        let (value, report) = generator.generate_with_report().unwrap();
        assert!(value.field("title").is_some());
        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("rejected"));
    }

    #[test]
    fn test_constraints_and_member_overrides() {
        let reg = registry(
            TypeModel::new().with(
                TypeDef::record("a::Tagged", &[("tags", "list"), ("code", "string")])
                    .constraint("code", Constraint::size(3, 3)),
            ),
        );
        reg.put_member(
            "a::Tagged".into(),
            "tags",
            ValueGenerator::constant(Value::Seq {
                kind: synth_types::SeqKind::List,
                items: vec![Value::I32(1)],
            }),
        );
        let value = reg.generate(&"a::Tagged".into()).unwrap();
        assert_eq!(value.field("code").and_then(Value::len), Some(3));
        assert_eq!(value.field("tags").and_then(Value::len), Some(1));
    }

    #[test]
    fn test_size_constraint_fills_collection_member() {
        let reg = registry(
            TypeModel::new().with(
                TypeDef::record("a::Bag", &[("items", "list")])
                    .adder("item", "items", "string")
                    .constraint("items", Constraint::size(3, 5)),
            ),
        );
        let setters = setters_for(&reg, "a::Bag");
        assert_eq!(setters.len(), 1);
        assert!(matches!(&setters[0], PropertySetter::Collection(c) if c.prefilled));

        let generator = reg.get(&"a::Bag".into()).unwrap();
        for _ in 0..10 {
            let (bag, report) = generator.generate_with_report().unwrap();
            assert!(report.is_clean());
            let items = bag.field("items").unwrap();
            assert!((3..=5).contains(&items.len().unwrap()));
            let Value::Seq { items, .. } = items else {
                panic!("unexpected items {:?}", items);
            };
            assert!(items.iter().all(|i| i.as_str().is_some()));
        }
    }

    #[test]
    fn test_clone_with_generators_replaces_in_order() {
        let reg = registry(TypeModel::new().with(TypeDef::record(
            "a::Pair",
            &[("left", "i32"), ("right", "i32")],
        )));
        let setter = construct_property_setter(
            &TypeAccess::public(&reg.context().model, "a::Pair".into()),
            &reg,
            &mut reg.context().new_scope(),
        );
        let replaced = setter
            .clone_with_generators(
                &mut vec![
                    ValueGenerator::constant(Value::I32(1)),
                    ValueGenerator::constant(Value::I32(2)),
                ]
                .into_iter(),
            )
            .unwrap();
        let mut pair = Value::Object(Object::new("a::Pair"));
        replaced.apply(&mut pair);
        assert_eq!(pair.field("left"), Some(&Value::I32(1)));
        assert_eq!(pair.field("right"), Some(&Value::I32(2)));

        let too_few = setter.clone_with_generators(&mut std::iter::empty::<ValueGenerator>());
        assert!(matches!(too_few, Err(SynthError::InvalidConfiguration { .. })));
    }
}
