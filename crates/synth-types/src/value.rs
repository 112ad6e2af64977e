//! Dynamically typed instances.
//!
//! Generators produce [`Value`]s. Scalars map to Rust primitives, containers
//! keep their items in insertion order, and user-declared types become
//! [`Object`]s carrying their runtime [`TypeKey`] plus named fields.

use std::collections::BTreeMap;

use crate::type_key::TypeKey;
use crate::well_known;

/// Flavour of a sequence container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeqKind {
    Collection,
    List,
    /// Keeps unique items; duplicate pushes are ignored.
    Set,
    Queue,
    Deque,
}

impl SeqKind {
    /// Container flavour for a built-in collection type key.
    pub fn from_type_key(key: &TypeKey) -> Option<Self> {
        match key.as_str() {
            well_known::COLLECTION => Some(SeqKind::Collection),
            well_known::LIST => Some(SeqKind::List),
            well_known::SET => Some(SeqKind::Set),
            well_known::QUEUE => Some(SeqKind::Queue),
            well_known::DEQUE => Some(SeqKind::Deque),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SeqKind::Collection => well_known::COLLECTION,
            SeqKind::List => well_known::LIST,
            SeqKind::Set => well_known::SET,
            SeqKind::Queue => well_known::QUEUE,
            SeqKind::Deque => well_known::DEQUE,
        }
    }
}

/// Instance of a user-declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Runtime type of the instance (may be a subtype of the requested one).
    pub type_key: TypeKey,
    pub fields: BTreeMap<String, Value>,
}

impl Object {
    pub fn new(type_key: impl Into<TypeKey>) -> Self {
        Self {
            type_key: type_key.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field assignment.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }
}

/// A generated value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    Str(String),
    Seq { kind: SeqKind, items: Vec<Value> },
    /// Entries in insertion order; keys are unique.
    Map(Vec<(Value, Value)>),
    Array { component: TypeKey, items: Vec<Value> },
    Enum { type_key: TypeKey, variant: String },
    Object(Object),
}

impl Value {
    pub fn empty_seq(kind: SeqKind) -> Self {
        Value::Seq {
            kind,
            items: Vec::new(),
        }
    }

    pub fn empty_map() -> Self {
        Value::Map(Vec::new())
    }

    /// Runtime type of this value.
    pub fn runtime_type(&self) -> TypeKey {
        match self {
            Value::Bool(_) => well_known::BOOL.into(),
            Value::I8(_) => well_known::I8.into(),
            Value::I16(_) => well_known::I16.into(),
            Value::I32(_) => well_known::I32.into(),
            Value::I64(_) => well_known::I64.into(),
            Value::F32(_) => well_known::F32.into(),
            Value::F64(_) => well_known::F64.into(),
            Value::Char(_) => well_known::CHAR.into(),
            Value::Str(_) => well_known::STRING.into(),
            Value::Seq { kind, .. } => kind.type_name().into(),
            Value::Map(_) => well_known::MAP.into(),
            Value::Array { component, .. } => TypeKey::array_of(component),
            Value::Enum { type_key, .. } => type_key.clone(),
            Value::Object(obj) => obj.type_key.clone(),
        }
    }

    /// Size of a string (in chars), sequence, map or array.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::Seq { items, .. } | Value::Array { items, .. } => Some(items.len()),
            Value::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Append an item to a sequence. Returns `false` when the value is not a
    /// sequence or a set already holds the item.
    pub fn push(&mut self, item: Value) -> bool {
        match self {
            Value::Seq { kind, items } => {
                if *kind == SeqKind::Set && items.contains(&item) {
                    return false;
                }
                items.push(item);
                true
            }
            Value::Array { items, .. } => {
                items.push(item);
                true
            }
            _ => false,
        }
    }

    /// Insert or replace a map entry. Returns `false` when the value is not a map.
    pub fn insert_entry(&mut self, key: Value, value: Value) -> bool {
        match self {
            Value::Map(entries) => {
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = value,
                    None => entries.push((key, value)),
                }
                true
            }
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Widening integer accessor for any signed integer variant.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(v) => Some(*v as i64),
            Value::I16(v) => Some(*v as i64),
            Value::I32(v) => Some(*v as i64),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Shortcut for a field of an object value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(name))
    }

    /// Render as JSON. Objects become JSON objects keyed by field name, enums
    /// become their variant name and map keys are rendered as strings.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Bool(b) => Json::Bool(*b),
            Value::I8(v) => Json::from(*v),
            Value::I16(v) => Json::from(*v),
            Value::I32(v) => Json::from(*v),
            Value::I64(v) => Json::from(*v),
            Value::F32(v) => serde_json::Number::from_f64(*v as f64)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::F64(v) => serde_json::Number::from_f64(*v)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Char(c) => Json::String(c.to_string()),
            Value::Str(s) => Json::String(s.clone()),
            Value::Seq { items, .. } | Value::Array { items, .. } => {
                Json::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.map_key(), v.to_json()))
                    .collect(),
            ),
            Value::Enum { variant, .. } => Json::String(variant.clone()),
            Value::Object(obj) => Json::Object(
                obj.fields
                    .iter()
                    .map(|(name, v)| (name.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    fn map_key(&self) -> String {
        match self.to_json() {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        }
    }
}
