//! Well-known built-in type names.
//!
//! These are the keys of the built-in generator map. Everything else is
//! resolved through the type model.

pub const BOOL: &str = "bool";
pub const I8: &str = "i8";
pub const I16: &str = "i16";
pub const I32: &str = "i32";
pub const I64: &str = "i64";
pub const F32: &str = "f32";
pub const F64: &str = "f64";
pub const CHAR: &str = "char";
pub const STRING: &str = "string";

pub const COLLECTION: &str = "collection";
pub const LIST: &str = "list";
pub const SET: &str = "set";
pub const QUEUE: &str = "queue";
pub const DEQUE: &str = "deque";
pub const MAP: &str = "map";

/// Catch-all type every value is assignable to.
pub const ANY: &str = "any";

/// Scalar leaf types with a random generator.
pub const SCALARS: [&str; 9] = [BOOL, I8, I16, I32, I64, F32, F64, CHAR, STRING];

/// Container types whose built-in generator yields an empty instance.
pub const CONTAINERS: [&str; 6] = [COLLECTION, LIST, SET, QUEUE, DEQUE, MAP];

/// Direct built-in supertypes of a container type.
pub fn builtin_supertypes(name: &str) -> &'static [&'static str] {
    match name {
        LIST | SET | QUEUE => &[COLLECTION],
        DEQUE => &[QUEUE],
        _ => &[],
    }
}

/// Whether the name denotes a sequence-like container (not a map).
pub fn is_collection(name: &str) -> bool {
    matches!(name, COLLECTION | LIST | SET | QUEUE | DEQUE)
}
