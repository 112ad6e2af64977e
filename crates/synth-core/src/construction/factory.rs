//! Construction through static factory methods.

use tracing::trace;

use super::{argument_generators, has_self_reference, rank, trial, ObjectConstructor, Ranked};
use crate::access::TypeAccess;
use crate::registry::GeneratorLookup;
use crate::scope::ResolutionScope;

/// Static methods on the target whose return type can stand in for it.
pub fn resolve(
    access: &TypeAccess<'_>,
    lookup: &dyn GeneratorLookup,
    scope: &mut ResolutionScope,
) -> Option<ObjectConstructor> {
    let candidates = access
        .static_methods()
        .into_iter()
        .filter(|m| {
            m.def
                .returns
                .as_ref()
                .is_some_and(|r| access.can_be_replaced_with(r))
        })
        .filter(|m| {
            let cyclic = has_self_reference(access, &m.def.params);
            if cyclic {
                trace!(method = %m.describe(), "rejected self-referential factory");
            }
            !cyclic
        })
        .map(|m| Ranked {
            arity: m.def.params.len(),
            signature: m.def.signature(),
            index: m.index,
            item: m,
        })
        .collect();

    for method in rank(candidates) {
        let args = match argument_generators(&method.def.params, lookup, scope) {
            Ok(args) => args,
            Err(err) => {
                trace!(method = %method.describe(), error = %err, "unresolvable argument");
                continue;
            }
        };
        if let Some(found) = trial(ObjectConstructor::Factory { method, args }) {
            return Some(found);
        }
    }
    None
}
