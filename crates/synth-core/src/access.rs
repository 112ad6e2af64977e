//! Policy-filtered view of one type in the model.
//!
//! [`TypeAccess`] answers the questions a construction strategy asks about a
//! type: which constructors, methods and fields it may use, and whether a
//! parameter type would lead straight back to the type being built.

use synth_types::TypeKey;

use crate::model::{
    ConstructorDef, FieldDef, MethodDef, TypeDef, TypeKind, TypeModel, Visibility,
};

/// Which members resolution may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    PublicOnly,
    AllMembers,
}

impl AccessPolicy {
    pub fn admits(&self, visibility: Visibility) -> bool {
        match self {
            AccessPolicy::PublicOnly => visibility.is_public(),
            AccessPolicy::AllMembers => true,
        }
    }
}

/// Constructor with its position in the declaring type.
#[derive(Debug, Clone)]
pub struct ConstructorRef {
    pub declaring: TypeKey,
    pub index: usize,
    pub def: ConstructorDef,
}

impl ConstructorRef {
    pub fn describe(&self) -> String {
        format!("{}::new({})", self.declaring, self.def.signature())
    }
}

/// Method with its declaring type (which may be a supertype).
#[derive(Debug, Clone)]
pub struct MethodRef {
    pub declaring: TypeKey,
    pub index: usize,
    pub def: MethodDef,
}

impl MethodRef {
    pub fn describe(&self) -> String {
        format!("{}::{}", self.declaring, self.def.signature())
    }
}

#[derive(Debug, Clone)]
pub struct FieldRef {
    pub declaring: TypeKey,
    pub def: FieldDef,
}

#[derive(Debug, Clone)]
pub struct TypeAccess<'m> {
    model: &'m TypeModel,
    source: TypeKey,
    policy: AccessPolicy,
}

impl<'m> TypeAccess<'m> {
    pub fn new(model: &'m TypeModel, source: TypeKey, policy: AccessPolicy) -> Self {
        Self {
            model,
            source,
            policy,
        }
    }

    pub fn public(model: &'m TypeModel, source: TypeKey) -> Self {
        Self::new(model, source, AccessPolicy::PublicOnly)
    }

    pub fn all_members(model: &'m TypeModel, source: TypeKey) -> Self {
        Self::new(model, source, AccessPolicy::AllMembers)
    }

    pub fn source(&self) -> &TypeKey {
        &self.source
    }

    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }

    pub fn model(&self) -> &'m TypeModel {
        self.model
    }

    pub fn definition(&self) -> Option<&'m TypeDef> {
        self.model.get(&self.source)
    }

    /// Same policy, different type.
    pub fn wrap(&self, other: &TypeKey) -> TypeAccess<'m> {
        Self::new(self.model, other.clone(), self.policy)
    }

    /// Declared constructors admitted by the policy. Only concrete classes
    /// have usable constructors.
    pub fn constructors(&self) -> Vec<ConstructorRef> {
        let Some(def) = self.definition().filter(|d| d.is_concrete()) else {
            return Vec::new();
        };
        def.constructors
            .iter()
            .enumerate()
            .filter(|(_, c)| self.policy.admits(c.visibility))
            .map(|(index, c)| ConstructorRef {
                declaring: def.key.clone(),
                index,
                def: c.clone(),
            })
            .collect()
    }

    /// Admitted methods of this type and its supertypes, most derived first.
    pub fn methods(&self) -> Vec<MethodRef> {
        let mut found = Vec::new();
        for key in self.model.ancestry(&self.source) {
            let Some(def) = self.model.get(&key) else {
                continue;
            };
            found.extend(
                def.methods
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| self.policy.admits(m.visibility))
                    .map(|(index, m)| MethodRef {
                        declaring: key.clone(),
                        index,
                        def: m.clone(),
                    }),
            );
        }
        found
    }

    /// Admitted static methods declared on this type itself.
    pub fn static_methods(&self) -> Vec<MethodRef> {
        self.methods()
            .into_iter()
            .filter(|m| m.declaring == self.source && m.def.is_static())
            .collect()
    }

    /// Admitted fields of this type and its supertypes, most derived first.
    pub fn fields(&self) -> Vec<FieldRef> {
        let mut found = Vec::new();
        for key in self.model.ancestry(&self.source) {
            let Some(def) = self.model.get(&key) else {
                continue;
            };
            found.extend(
                def.fields
                    .iter()
                    .filter(|f| self.policy.admits(f.visibility))
                    .map(|f| FieldRef {
                        declaring: key.clone(),
                        def: f.clone(),
                    }),
            );
        }
        found
    }

    /// Whether a value of `other` may stand in for the source type.
    pub fn can_be_replaced_with(&self, other: &TypeKey) -> bool {
        self.model.is_assignable(other, &self.source)
    }

    /// Whether the source type may stand in for `other`.
    pub fn can_replace(&self, other: &TypeKey) -> bool {
        self.model.is_assignable(&self.source, other)
    }

    /// A parameter related to the source type in either direction would
    /// have to be built from the source itself.
    pub fn is_self_referential(&self, param: &TypeKey) -> bool {
        self.can_be_replaced_with(param) || self.can_replace(param)
    }

    /// Whether the type has at least one usable constructor or static
    /// factory under the current policy.
    pub fn constructable(&self) -> bool {
        let Some(def) = self.definition() else {
            return false;
        };
        if matches!(def.kind, TypeKind::Enum { .. }) {
            return false;
        }
        !self.constructors().is_empty()
            || self
                .static_methods()
                .iter()
                .any(|m| m.def.returns.is_some())
    }
}
