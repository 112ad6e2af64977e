//! Construction through builder types.
//!
//! A builder candidate is a static method on the target returning some
//! other type `B`, where `B` declares a zero-argument instance method whose
//! result can stand in for the target. The builder instance is populated
//! through `B`'s own setters before that terminal method runs; setters
//! mutate the builder in place, so fluent return values are ignored.

use synth_types::TypeKey;
use tracing::trace;

use super::{argument_generators, has_self_reference, rank, trial, ObjectConstructor, Ranked};
use crate::access::{MethodRef, TypeAccess};
use crate::property;
use crate::registry::GeneratorLookup;
use crate::scope::ResolutionScope;

pub fn resolve(
    access: &TypeAccess<'_>,
    lookup: &dyn GeneratorLookup,
    scope: &mut ResolutionScope,
) -> Option<ObjectConstructor> {
    let candidates = access
        .static_methods()
        .into_iter()
        .filter_map(|m| {
            let builder = m.def.returns.clone()?;
            if access.can_be_replaced_with(&builder) {
                return None;
            }
            let terminal = terminal_method(access, &builder)?;
            if has_self_reference(access, &m.def.params) {
                trace!(method = %m.describe(), "rejected self-referential builder factory");
                return None;
            }
            Some((m, builder, terminal))
        })
        .map(|(m, builder, terminal)| Ranked {
            arity: m.def.params.len(),
            signature: m.def.signature(),
            index: m.index,
            item: (m, builder, terminal),
        })
        .collect();

    for (factory, builder, terminal) in rank(candidates) {
        let args = match argument_generators(&factory.def.params, lookup, scope) {
            Ok(args) => args,
            Err(err) => {
                trace!(method = %factory.describe(), error = %err, "unresolvable argument");
                continue;
            }
        };
        let setters = property::construct_property_setter(&access.wrap(&builder), lookup, scope);
        let candidate = ObjectConstructor::Builder {
            factory,
            args,
            setters,
            terminal,
        };
        if let Some(found) = trial(candidate) {
            return Some(found);
        }
    }
    None
}

/// First declared zero-argument instance method of `builder` whose result
/// can stand in for the target.
fn terminal_method(access: &TypeAccess<'_>, builder: &TypeKey) -> Option<MethodRef> {
    access.wrap(builder).methods().into_iter().find(|m| {
        !m.def.is_static()
            && m.def.params.is_empty()
            && m.def
                .returns
                .as_ref()
                .is_some_and(|r| !r.is_any() && access.can_be_replaced_with(r))
    })
}
