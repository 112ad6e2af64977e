//! Type model: the declared shape of every type the engine may synthesize.
//!
//! Rust has no runtime reflection, so callers describe their types once as
//! [`TypeDef`]s: constructors, static and instance methods, and fields, each
//! with a visibility and a callable body. The engine then introspects this
//! model exactly the way a reflective generator introspects class metadata.
//!
//! ```
//! use synth_core::model::{TypeDef, TypeModel, Visibility};
//! use synth_types::{Object, Value};
//!
//! let mut model = TypeModel::new();
//! model.register(
//!     TypeDef::class("shop::Item")
//!         .constructor(&["string", "i32"], |args| {
//!             Ok(Value::Object(
//!                 Object::new("shop::Item")
//!                     .with_field("name", args[0].clone())
//!                     .with_field("qty", args[1].clone()),
//!             ))
//!         })
//!         .field("note", "string", Visibility::Private)
//!         .setter("note", "string"),
//! );
//! assert!(model.contains(&"shop::Item".into()));
//! ```

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use synth_types::{well_known, Constraint, TypeKey, Value};

/// Body of a constructor or static method.
pub type StaticBody = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// Body of an instance method. Mutates the receiver in place and optionally
/// returns a value (a built instance, or the receiver itself for fluent APIs).
pub type InstanceBody = Arc<dyn Fn(&mut Value, &[Value]) -> Result<Option<Value>> + Send + Sync>;

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// What kind of type a definition declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Abstract,
    Interface,
    Enum { variants: Vec<String> },
}

#[derive(Clone)]
pub struct ConstructorDef {
    pub visibility: Visibility,
    pub params: Vec<TypeKey>,
    /// Parameter names, either empty or one per parameter. Named parameters
    /// pick up constraints declared on the member with the same name.
    pub param_names: Vec<String>,
    pub body: StaticBody,
}

impl ConstructorDef {
    /// Human-readable parameter list, also used for candidate ordering.
    pub fn signature(&self) -> String {
        join_keys(&self.params)
    }
}

impl fmt::Debug for ConstructorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} new({})", self.visibility, self.signature())
    }
}

#[derive(Clone)]
pub enum MethodBody {
    Static(StaticBody),
    Instance(InstanceBody),
}

#[derive(Clone)]
pub struct MethodDef {
    pub name: String,
    pub visibility: Visibility,
    pub params: Vec<TypeKey>,
    pub returns: Option<TypeKey>,
    pub body: MethodBody,
    pub constraints: Vec<Constraint>,
}

impl MethodDef {
    pub fn is_static(&self) -> bool {
        matches!(self.body, MethodBody::Static(_))
    }

    pub fn signature(&self) -> String {
        format!("{}({})", self.name, join_keys(&self.params))
    }

    /// Invoke as a static method.
    pub fn call_static(&self, args: &[Value]) -> Result<Value> {
        match &self.body {
            MethodBody::Static(body) => body(args),
            MethodBody::Instance(_) => Err(anyhow!("{} is an instance method", self.name)),
        }
    }

    /// Invoke as an instance method on `receiver`.
    pub fn call_instance(&self, receiver: &mut Value, args: &[Value]) -> Result<Option<Value>> {
        match &self.body {
            MethodBody::Instance(body) => body(receiver, args),
            MethodBody::Static(_) => Err(anyhow!("{} is a static method", self.name)),
        }
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_static() { "static " } else { "" };
        write!(f, "{:?} {}{}", self.visibility, kind, self.signature())?;
        if let Some(ret) = &self.returns {
            write!(f, " -> {}", ret)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeKey,
    pub visibility: Visibility,
    /// Read-only fields are owned by the constructor and never populated.
    pub writable: bool,
    pub constraints: Vec<Constraint>,
}

/// Declaration of one type.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub key: TypeKey,
    pub kind: TypeKind,
    /// Direct supertypes (extended classes and implemented interfaces).
    pub supertypes: Vec<TypeKey>,
    pub constructors: Vec<ConstructorDef>,
    pub methods: Vec<MethodDef>,
    pub fields: Vec<FieldDef>,
}

impl TypeDef {
    fn with_kind(key: impl Into<TypeKey>, kind: TypeKind) -> Self {
        Self {
            key: key.into(),
            kind,
            supertypes: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn class(key: impl Into<TypeKey>) -> Self {
        Self::with_kind(key, TypeKind::Class)
    }

    pub fn abstract_class(key: impl Into<TypeKey>) -> Self {
        Self::with_kind(key, TypeKind::Abstract)
    }

    pub fn interface(key: impl Into<TypeKey>) -> Self {
        Self::with_kind(key, TypeKind::Interface)
    }

    pub fn enumeration(key: impl Into<TypeKey>, variants: &[&str]) -> Self {
        Self::with_kind(
            key,
            TypeKind::Enum {
                variants: variants.iter().map(|v| v.to_string()).collect(),
            },
        )
    }

    /// Class with a public no-argument constructor and public writable fields.
    pub fn record(key: impl Into<TypeKey>, fields: &[(&str, &str)]) -> Self {
        let mut def = Self::class(key).default_constructor();
        for (name, ty) in fields {
            def = def.field(name, ty, Visibility::Public);
        }
        def
    }

    pub fn extends(mut self, parent: impl Into<TypeKey>) -> Self {
        self.supertypes.push(parent.into());
        self
    }

    /// Public constructor with unnamed parameters.
    pub fn constructor<F>(self, params: &[&str], body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.constructor_with(Visibility::Public, params, body)
    }

    pub fn constructor_with<F>(mut self, visibility: Visibility, params: &[&str], body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.constructors.push(ConstructorDef {
            visibility,
            params: keys(params),
            param_names: Vec::new(),
            body: Arc::new(body),
        });
        self
    }

    /// Constructor whose parameters are given as `(name, type)` pairs.
    pub fn named_constructor<F>(
        mut self,
        visibility: Visibility,
        params: &[(&str, &str)],
        body: F,
    ) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.constructors.push(ConstructorDef {
            visibility,
            params: params.iter().map(|(_, ty)| TypeKey::from(*ty)).collect(),
            param_names: params.iter().map(|(name, _)| name.to_string()).collect(),
            body: Arc::new(body),
        });
        self
    }

    /// Public no-argument constructor producing an empty object of this type.
    pub fn default_constructor(self) -> Self {
        let key = self.key.clone();
        self.constructor(&[], move |_| Ok(Value::Object(synth_types::Object::new(key.clone()))))
    }

    pub fn static_method<F>(
        mut self,
        name: &str,
        visibility: Visibility,
        params: &[&str],
        returns: &str,
        body: F,
    ) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.methods.push(MethodDef {
            name: name.to_string(),
            visibility,
            params: keys(params),
            returns: Some(returns.into()),
            body: MethodBody::Static(Arc::new(body)),
            constraints: Vec::new(),
        });
        self
    }

    pub fn method<F>(
        mut self,
        name: &str,
        visibility: Visibility,
        params: &[&str],
        returns: Option<&str>,
        body: F,
    ) -> Self
    where
        F: Fn(&mut Value, &[Value]) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        self.methods.push(MethodDef {
            name: name.to_string(),
            visibility,
            params: keys(params),
            returns: returns.map(TypeKey::from),
            body: MethodBody::Instance(Arc::new(body)),
            constraints: Vec::new(),
        });
        self
    }

    pub fn field(mut self, name: &str, ty: &str, visibility: Visibility) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            ty: ty.into(),
            visibility,
            writable: true,
            constraints: Vec::new(),
        });
        self
    }

    /// Field assigned only by a constructor.
    pub fn final_field(mut self, name: &str, ty: &str, visibility: Visibility) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            ty: ty.into(),
            visibility,
            writable: false,
            constraints: Vec::new(),
        });
        self
    }

    /// Public `set<Field>` method writing `field`.
    pub fn setter(self, field: &str, ty: &str) -> Self {
        let name = format!("set{}", capitalize(field));
        let target = field.to_string();
        self.method(&name, Visibility::Public, &[ty], None, move |receiver, args| {
            let value = args.first().cloned().ok_or_else(|| anyhow!("missing argument"))?;
            set_field(receiver, &target, value)?;
            Ok(None)
        })
    }

    /// Public `add<Element>` method appending to the sequence stored in `field`.
    pub fn adder(self, element: &str, field: &str, element_ty: &str) -> Self {
        let name = format!("add{}", capitalize(element));
        let target = field.to_string();
        self.method(&name, Visibility::Public, &[element_ty], None, move |receiver, args| {
            let value = args.first().cloned().ok_or_else(|| anyhow!("missing argument"))?;
            let obj = receiver
                .as_object_mut()
                .ok_or_else(|| anyhow!("receiver is not an object"))?;
            let seq = obj
                .get_mut(&target)
                .ok_or_else(|| anyhow!("field {} is not initialized", target))?;
            seq.push(value);
            Ok(None)
        })
    }

    /// Attach a constraint to the field named `member`, or failing that to
    /// every method with that name.
    pub fn constraint(mut self, member: &str, constraint: Constraint) -> Self {
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == member) {
            field.constraints.push(constraint);
        } else {
            for method in self.methods.iter_mut().filter(|m| m.name == member) {
                method.constraints.push(constraint);
            }
        }
        self
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self.kind, TypeKind::Class)
    }
}

/// Assign `name` on an object value.
pub fn set_field(target: &mut Value, name: &str, value: Value) -> Result<()> {
    let runtime = target.runtime_type();
    let obj = target
        .as_object_mut()
        .ok_or_else(|| anyhow!("cannot set field {} on {}", name, runtime))?;
    obj.set(name, value);
    Ok(())
}

/// Declared-constraint lookup for a member of an enclosing type.
pub trait ConstraintSource: Send + Sync {
    fn constraints_for(&self, owner: &TypeKey, member: &str) -> Vec<Constraint>;
}

/// Concrete implementations of an abstract type or interface.
pub trait SubtypeDiscovery: Send + Sync {
    fn implementations(&self, target: &TypeKey) -> Vec<TypeKey>;
}

/// All declared types, keyed (and iterated) in key order.
#[derive(Debug, Clone, Default)]
pub struct TypeModel {
    types: BTreeMap<TypeKey, TypeDef>,
}

impl TypeModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a type definition.
    pub fn register(&mut self, def: TypeDef) -> &mut Self {
        self.types.insert(def.key.clone(), def);
        self
    }

    /// Builder-style registration.
    pub fn with(mut self, def: TypeDef) -> Self {
        self.register(def);
        self
    }

    pub fn get(&self, key: &TypeKey) -> Option<&TypeDef> {
        self.types.get(key)
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.types.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Direct supertypes of `key`, including built-in container relations.
    fn direct_supertypes(&self, key: &TypeKey) -> Vec<TypeKey> {
        let mut supers: Vec<TypeKey> = well_known::builtin_supertypes(key.as_str())
            .iter()
            .map(|s| TypeKey::from(*s))
            .collect();
        if let Some(def) = self.types.get(key) {
            supers.extend(def.supertypes.iter().cloned());
        }
        supers
    }

    /// `key` followed by all of its transitive supertypes, nearest first.
    pub fn ancestry(&self, key: &TypeKey) -> Vec<TypeKey> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([key.clone()]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            queue.extend(self.direct_supertypes(&current));
            order.push(current);
        }
        order
    }

    /// Whether a value of type `from` may stand where `to` is expected.
    pub fn is_assignable(&self, from: &TypeKey, to: &TypeKey) -> bool {
        if from == to || to.is_any() {
            return true;
        }
        if let (Some(a), Some(b)) = (from.component(), to.component()) {
            return self.is_assignable(&a, &b);
        }
        self.ancestry(from).iter().any(|k| k == to)
    }
}

impl ConstraintSource for TypeModel {
    /// Constraints on the field named `member` (case-insensitive), then on
    /// methods whose name contains it, across `owner` and its supertypes.
    fn constraints_for(&self, owner: &TypeKey, member: &str) -> Vec<Constraint> {
        let needle = member.to_lowercase();
        let mut found = Vec::new();
        for key in self.ancestry(owner) {
            let Some(def) = self.types.get(&key) else {
                continue;
            };
            for field in def.fields.iter().filter(|f| f.name.to_lowercase() == needle) {
                found.extend(field.constraints.iter().copied());
            }
            for method in def
                .methods
                .iter()
                .filter(|m| m.name.to_lowercase().contains(&needle))
            {
                found.extend(method.constraints.iter().copied());
            }
        }
        found
    }
}

impl SubtypeDiscovery for TypeModel {
    /// Concrete classes within the target's namespace that are assignable to it.
    fn implementations(&self, target: &TypeKey) -> Vec<TypeKey> {
        let namespace = target.namespace();
        self.types
            .values()
            .filter(|def| def.is_concrete() && def.key != *target)
            .filter(|def| def.key.is_within(namespace))
            .filter(|def| self.is_assignable(&def.key, target))
            .map(|def| def.key.clone())
            .collect()
    }
}

fn keys(params: &[&str]) -> Vec<TypeKey> {
    params.iter().map(|p| TypeKey::from(*p)).collect()
}

fn join_keys(keys: &[TypeKey]) -> String {
    keys.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ")
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synth_types::Object;

    fn animals() -> TypeModel {
        TypeModel::new()
            .with(TypeDef::interface("zoo::Animal"))
            .with(TypeDef::abstract_class("zoo::Mammal").extends("zoo::Animal"))
            .with(TypeDef::record("zoo::Dog", &[("name", "string")]).extends("zoo::Mammal"))
            .with(TypeDef::record("zoo::wild::Wolf", &[]).extends("zoo::Mammal"))
            .with(TypeDef::record("farm::Cow", &[]).extends("zoo::Animal"))
    }

    #[test]
    fn test_transitive_assignability() {
        let model = animals();
        let dog = TypeKey::from("zoo::Dog");
        let animal = TypeKey::from("zoo::Animal");
        assert!(model.is_assignable(&dog, &animal));
        assert!(!model.is_assignable(&animal, &dog));
        assert!(model.is_assignable(&dog, &well_known::ANY.into()));
        assert!(model.is_assignable(&well_known::DEQUE.into(), &well_known::COLLECTION.into()));
    }

    #[test]
    fn test_array_assignability_is_covariant() {
        let model = animals();
        let dogs = TypeKey::array_of(&"zoo::Dog".into());
        let animals = TypeKey::array_of(&"zoo::Animal".into());
        assert!(model.is_assignable(&dogs, &animals));
        assert!(!model.is_assignable(&animals, &dogs));
    }

    #[test]
    fn test_cyclic_supertypes_terminate() {
        let model = TypeModel::new()
            .with(TypeDef::class("a::A").extends("a::B"))
            .with(TypeDef::class("a::B").extends("a::A"));
        assert!(model.is_assignable(&"a::A".into(), &"a::B".into()));
        assert!(!model.is_assignable(&"a::A".into(), &"a::C".into()));
    }

    #[test]
    fn test_implementations_stay_in_namespace() {
        let model = animals();
        let found = model.implementations(&"zoo::Animal".into());
        assert_eq!(
            found,
            vec![TypeKey::from("zoo::Dog"), TypeKey::from("zoo::wild::Wolf")]
        );
    }

    #[test]
    fn test_top_level_interface_discovers_top_level_types_only() {
        let model = TypeModel::new()
            .with(TypeDef::interface("Shape"))
            .with(TypeDef::record("Circle", &[]).extends("Shape"))
            .with(TypeDef::record("geo::Square", &[]).extends("Shape"));
        let found = model.implementations(&"Shape".into());
        assert_eq!(found, vec![TypeKey::from("Circle")]);
    }

    #[test]
    fn test_set_field_requires_an_object() {
        let mut point = Value::Object(Object::new("a::Point"));
        set_field(&mut point, "x", Value::I32(4)).unwrap();
        assert_eq!(point.field("x"), Some(&Value::I32(4)));

        let mut number = Value::I32(1);
        let err = set_field(&mut number, "x", Value::I32(4)).unwrap_err();
        assert!(err.to_string().contains("cannot set field x on i32"));
        assert_eq!(number, Value::I32(1));
    }

    #[test]
    fn test_constraints_from_field_and_method() {
        let model = TypeModel::new().with(
            TypeDef::record("a::User", &[("name", "string")])
                .setter("name", "string")
                .constraint("name", Constraint::size(2, 4))
                .constraint("setName", Constraint::size(1, 8)),
        );
        let found = model.constraints_for(&"a::User".into(), "NAME");
        assert_eq!(found, vec![Constraint::size(2, 4), Constraint::size(1, 8)]);
    }

    #[test]
    fn test_setter_and_adder_bodies() {
        let def = TypeDef::record("a::Cart", &[("items", "list")])
            .setter("items", "list")
            .adder("item", "items", "string");
        let mut cart = Value::Object(Object::new("a::Cart"));

        let set = def.methods.iter().find(|m| m.name == "setItems").unwrap();
        set.call_instance(&mut cart, &[Value::empty_seq(synth_types::SeqKind::List)])
            .unwrap();
        let add = def.methods.iter().find(|m| m.name == "addItem").unwrap();
        add.call_instance(&mut cart, &[Value::Str("apple".into())]).unwrap();

        assert_eq!(cart.field("items").and_then(Value::len), Some(1));
        assert!(add.call_static(&[]).is_err());
    }
}
