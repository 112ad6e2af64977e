//! Built-in leaf generators and string helpers.

use std::collections::HashMap;

use rand::Rng;
use synth_types::{well_known, SeqKind, TypeKey, Value};

use crate::error::SynthError;
use crate::generator::ValueGenerator;
use crate::random::RandomSource;

/// Length of strings produced by the built-in `string` generator.
pub const DEFAULT_STRING_LEN: usize = 10;

/// Generators for every scalar and container type in [`well_known`].
///
/// Scalars are uniformly random; containers are produced empty and filled
/// later by property population.
pub fn builtin_generators(
    random: &RandomSource,
    string_len: usize,
) -> HashMap<TypeKey, ValueGenerator> {
    let mut map = HashMap::new();

    macro_rules! scalar {
        ($name:expr, $variant:ident, $ty:ty) => {{
            let r = random.clone();
            map.insert(
                TypeKey::from($name),
                ValueGenerator::builtin($name, move || {
                    Ok(Value::$variant(r.with(|rng| rng.gen::<$ty>())))
                }),
            );
        }};
    }

    scalar!(well_known::BOOL, Bool, bool);
    scalar!(well_known::I8, I8, i8);
    scalar!(well_known::I16, I16, i16);
    scalar!(well_known::I32, I32, i32);
    scalar!(well_known::I64, I64, i64);
    scalar!(well_known::F32, F32, f32);
    scalar!(well_known::F64, F64, f64);

    let r = random.clone();
    map.insert(
        well_known::CHAR.into(),
        ValueGenerator::builtin(well_known::CHAR, move || Ok(Value::Char(r.printable_char()))),
    );
    let r = random.clone();
    map.insert(
        well_known::STRING.into(),
        ValueGenerator::builtin(well_known::STRING, move || {
            Ok(Value::Str(r.ascii_string(string_len)))
        }),
    );

    for name in well_known::CONTAINERS {
        let key = TypeKey::from(name);
        let generator = match SeqKind::from_type_key(&key) {
            Some(kind) => ValueGenerator::builtin(name, move || Ok(Value::empty_seq(kind))),
            None => ValueGenerator::builtin(name, || Ok(Value::empty_map())),
        };
        map.insert(key, generator);
    }

    map
}

fn checked_len(len: usize) -> Result<usize, SynthError> {
    if len == 0 {
        return Err(SynthError::invalid("string length must be positive"));
    }
    Ok(len)
}

/// Strings of `len` arbitrary characters.
pub fn random_string(random: &RandomSource, len: usize) -> Result<ValueGenerator, SynthError> {
    let len = checked_len(len)?;
    let r = random.clone();
    Ok(ValueGenerator::from_fn(well_known::STRING, move || {
        Ok(Value::Str(r.any_string(len)))
    }))
}

/// Strings of `len` ASCII letters.
pub fn random_alphabetic(random: &RandomSource, len: usize) -> Result<ValueGenerator, SynthError> {
    let len = checked_len(len)?;
    let r = random.clone();
    Ok(ValueGenerator::from_fn(well_known::STRING, move || {
        Ok(Value::Str(r.alphabetic_string(len)))
    }))
}

/// Strings of `len` ASCII letters and digits.
pub fn random_alphanumeric(
    random: &RandomSource,
    len: usize,
) -> Result<ValueGenerator, SynthError> {
    let len = checked_len(len)?;
    let r = random.clone();
    Ok(ValueGenerator::from_fn(well_known::STRING, move || {
        Ok(Value::Str(r.alphanumeric_string(len)))
    }))
}

/// Strings of `len` printable ASCII characters.
pub fn random_ascii(random: &RandomSource, len: usize) -> Result<ValueGenerator, SynthError> {
    let len = checked_len(len)?;
    let r = random.clone();
    Ok(ValueGenerator::from_fn(well_known::STRING, move || {
        Ok(Value::Str(r.ascii_string(len)))
    }))
}

/// Uniform choice over `values`, typed by the first value.
pub fn one_of(random: &RandomSource, values: Vec<Value>) -> Result<ValueGenerator, SynthError> {
    let type_key = values
        .first()
        .map(Value::runtime_type)
        .ok_or_else(|| SynthError::invalid("one_of needs at least one value"))?;
    ValueGenerator::one_of(type_key, values, random.clone())
}

/// Uniform choice over the variants of an enumeration type.
pub fn enum_choice(
    random: &RandomSource,
    type_key: &TypeKey,
    variants: &[String],
) -> Result<ValueGenerator, SynthError> {
    let choices = variants
        .iter()
        .map(|variant| Value::Enum {
            type_key: type_key.clone(),
            variant: variant.clone(),
        })
        .collect();
    ValueGenerator::one_of(type_key.clone(), choices, random.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_cover_well_known_types() {
        let builtins = builtin_generators(&RandomSource::seeded(3), DEFAULT_STRING_LEN);
        for name in well_known::SCALARS.iter().chain(well_known::CONTAINERS.iter()) {
            let generator = builtins.get(&TypeKey::from(*name)).unwrap();
            let value = generator.generate().unwrap();
            assert_eq!(value.runtime_type(), TypeKey::from(*name));
        }
    }

    #[test]
    fn test_default_string_and_empty_containers() {
        let builtins = builtin_generators(&RandomSource::seeded(3), DEFAULT_STRING_LEN);
        let s = builtins[&TypeKey::from("string")].generate().unwrap();
        assert_eq!(s.len(), Some(DEFAULT_STRING_LEN));
        let list = builtins[&TypeKey::from("list")].generate().unwrap();
        assert!(list.is_empty());
        let map = builtins[&TypeKey::from("map")].generate().unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_string_helpers_validate_length() {
        let random = RandomSource::seeded(5);
        assert!(matches!(
            random_alphabetic(&random, 0),
            Err(SynthError::InvalidConfiguration { .. })
        ));
        let generator = random_alphanumeric(&random, 7).unwrap();
        let value = generator.generate().unwrap();
        assert_eq!(value.len(), Some(7));
        assert!(value.as_str().unwrap().chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(random_string(&random, 4).unwrap().generate().unwrap().len(), Some(4));
        assert_eq!(random_ascii(&random, 4).unwrap().generate().unwrap().len(), Some(4));
    }

    #[test]
    fn test_one_of_picks_from_choices() {
        let random = RandomSource::seeded(11);
        assert!(one_of(&random, Vec::new()).is_err());
        let choices = vec![Value::I32(1), Value::I32(2), Value::I32(3)];
        let generator = one_of(&random, choices.clone()).unwrap();
        for _ in 0..20 {
            assert!(choices.contains(&generator.generate().unwrap()));
        }
    }

    #[test]
    fn test_enum_choice_yields_declared_variants() {
        let random = RandomSource::seeded(2);
        let key = TypeKey::from("shop::Status");
        let variants = vec!["Open".to_string(), "Closed".to_string()];
        let generator = enum_choice(&random, &key, &variants).unwrap();
        match generator.generate().unwrap() {
            Value::Enum { type_key, variant } => {
                assert_eq!(type_key, key);
                assert!(variants.contains(&variant));
            }
            other => panic!("expected enum, got {:?}", other),
        }
        assert!(enum_choice(&random, &key, &[]).is_err());
    }
}
