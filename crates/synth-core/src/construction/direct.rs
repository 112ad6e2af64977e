//! Construction through declared constructors.

use tracing::trace;

use super::{
    argument_generators, constrain_parameters, has_self_reference, rank, trial,
    ObjectConstructor, Ranked,
};
use crate::access::TypeAccess;
use crate::registry::GeneratorLookup;
use crate::scope::ResolutionScope;

pub fn resolve(
    access: &TypeAccess<'_>,
    lookup: &dyn GeneratorLookup,
    scope: &mut ResolutionScope,
) -> Option<ObjectConstructor> {
    let candidates = access
        .constructors()
        .into_iter()
        .filter(|c| {
            let cyclic = has_self_reference(access, &c.def.params);
            if cyclic {
                trace!(constructor = %c.describe(), "rejected self-referential constructor");
            }
            !cyclic
        })
        .map(|c| Ranked {
            arity: c.def.params.len(),
            signature: c.def.signature(),
            index: c.index,
            item: c,
        })
        .collect();

    for constructor in rank(candidates) {
        let args = match argument_generators(&constructor.def.params, lookup, scope) {
            Ok(args) => args,
            Err(err) => {
                trace!(
                    constructor = %constructor.describe(),
                    error = %err,
                    "unresolvable argument"
                );
                continue;
            }
        };
        let param_names = constructor.def.param_names.clone();
        let candidate = constrain_parameters(
            ObjectConstructor::Direct { constructor, args },
            &param_names,
            access,
            lookup,
        );
        if let Some(found) = trial(candidate) {
            return Some(found);
        }
    }
    None
}
