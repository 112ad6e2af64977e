//! Type descriptors.
//!
//! A [`TypeKey`] is the identity of a type inside the synthesizer: a
//! `::`-separated path such as `shop::orders::Order`. Array types are written
//! `[component]`. Keys are cheap to clone and are used as map keys by the
//! registry and the cache.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::well_known;

/// Identifier of a class, interface, enum, array or built-in type.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(String);

impl TypeKey {
    /// Create a key from its full path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Key of an array whose elements are `component`.
    pub fn array_of(component: &TypeKey) -> Self {
        Self(format!("[{}]", component.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key denotes an array type.
    pub fn is_array(&self) -> bool {
        self.0.len() > 2 && self.0.starts_with('[') && self.0.ends_with(']')
    }

    /// Component type of an array key.
    pub fn component(&self) -> Option<TypeKey> {
        if self.is_array() {
            Some(TypeKey(self.0[1..self.0.len() - 1].to_string()))
        } else {
            None
        }
    }

    /// Namespace the type is declared in (`shop::orders` for
    /// `shop::orders::Order`). Empty for built-ins and arrays.
    pub fn namespace(&self) -> &str {
        if self.is_array() {
            return "";
        }
        match self.0.rfind("::") {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// Simple name without the namespace.
    pub fn name(&self) -> &str {
        match self.0.rfind("::") {
            Some(idx) if !self.is_array() => &self.0[idx + 2..],
            _ => &self.0,
        }
    }

    /// Whether `self` is declared in `namespace` or one of its children.
    /// The empty namespace holds top-level keys only.
    pub fn is_within(&self, namespace: &str) -> bool {
        let own = self.namespace();
        if namespace.is_empty() {
            return own.is_empty();
        }
        own == namespace
            || (own.starts_with(namespace) && own[namespace.len()..].starts_with("::"))
    }

    pub fn is_any(&self) -> bool {
        self.0 == well_known::ANY
    }

    /// Whether this key is one of the built-in scalar or container types.
    pub fn is_builtin(&self) -> bool {
        well_known::SCALARS.contains(&self.as_str())
            || well_known::CONTAINERS.contains(&self.as_str())
    }
}

impl From<&str> for TypeKey {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for TypeKey {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.0)
    }
}
