//! Facade behavior: overrides, caching, batches and typed output.

mod common;

use std::sync::Arc;
use std::thread;

use common::{assert_in_range, assert_ok, seeded_generator};
use fixture_synth::{
    Object, ObjectGenerator, SynthConfig, SynthError, TypeDef, TypeKey, TypeModel, Value,
    ValueGenerator,
};
use serde::Deserialize;

// =============================================================================
// Overrides
// =============================================================================

mod override_tests {
    use super::*;

    #[test]
    fn test_interface_override_used() {
        let generator = seeded_generator(11);
        generator.register("shop::PaymentMethod", || {
            Ok(Value::Object(
                Object::new("shop::Voucher").with_field("code", Value::Str("FREE".into())),
            ))
        });
        let payment = generator.generate("shop::PaymentMethod").unwrap();
        assert_eq!(payment.field("code"), Some(&Value::Str("FREE".into())));
    }

    #[test]
    fn test_interface_without_override_uses_implementation() {
        let generator = seeded_generator(11);
        let payment = generator.generate("shop::PaymentMethod").unwrap();
        assert_eq!(payment.runtime_type(), TypeKey::from("shop::Card"));
    }

    #[test]
    fn test_registered_implementation_preferred() {
        let generator = seeded_generator(11);
        generator.register("shop::Voucher", || {
            Ok(Value::Object(Object::new("shop::Voucher")))
        });
        let payment = generator.generate("shop::PaymentMethod").unwrap();
        assert_eq!(payment.runtime_type(), TypeKey::from("shop::Voucher"));
    }

    #[test]
    fn test_builtin_types_cannot_be_shadowed() {
        let generator = seeded_generator(11);
        generator.register("string", || Ok(Value::Str("fixed".into())));
        let value = generator.generate("string").unwrap();
        assert_eq!(value.len(), Some(10));
    }

    #[test]
    fn test_failing_override_is_retried_then_exhausted() {
        let generator = seeded_generator(11);
        generator.register("shop::Address", || Err(anyhow::anyhow!("geocoder offline")));
        let err = generator.generate_with_attempts("shop::Address", 2).unwrap_err();
        match err {
            SynthError::GenerationExhausted { attempts, last, .. } => {
                assert_eq!(attempts, 2);
                assert!(matches!(
                    last.as_deref(),
                    Some(SynthError::InvocationFailure { .. })
                ));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}

// =============================================================================
// Caching
// =============================================================================

mod caching_tests {
    use super::*;

    #[test]
    fn test_caching_returns_same_generator() {
        let generator = seeded_generator(12);
        generator.enable_caching();
        let first = generator.get_generator("shop::Customer").unwrap();
        let second = generator.get_generator("shop::Customer").unwrap();
        assert!(first.ptr_eq(&second));
    }

    #[test]
    fn test_uncached_generators_are_rebuilt() {
        let generator = seeded_generator(12);
        assert!(!generator.is_caching());
        let first = generator.get_generator("shop::Customer").unwrap();
        let second = generator.get_generator("shop::Customer").unwrap();
        assert!(!first.ptr_eq(&second));
    }

    #[test]
    fn test_disable_caching_forgets() {
        let config = SynthConfig {
            caching: true,
            ..SynthConfig::seeded(12)
        };
        let generator = ObjectGenerator::with_config(common::shop_model(), config).unwrap();
        let cached = generator.get_generator("shop::Money").unwrap();
        generator.disable_caching();
        generator.enable_caching();
        let fresh = generator.get_generator("shop::Money").unwrap();
        assert!(!cached.ptr_eq(&fresh));
    }

    #[test]
    fn test_concurrent_generation() {
        let generator = Arc::new(seeded_generator(12));
        generator.enable_caching();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = generator.clone();
                thread::spawn(move || generator.generate_many("shop::Order", 5))
            })
            .collect();
        for handle in handles {
            let orders = handle.join().unwrap().unwrap();
            assert_eq!(orders.len(), 5);
        }
    }

    fn library(caching: bool) -> ObjectGenerator {
        let model = TypeModel::new()
            .with(TypeDef::record("a::Author", &[("name", "string"), ("book", "a::Book")]))
            .with(TypeDef::record("a::Book", &[("title", "string"), ("author", "a::Author")]));
        let config = SynthConfig {
            caching,
            ..SynthConfig::seeded(12)
        };
        assert_ok(ObjectGenerator::with_config(model, config), "library generator")
    }

    fn shape(value: &Value) -> Vec<String> {
        let mut paths = Vec::new();
        if let Some(object) = value.as_object() {
            for name in ["name", "title", "book", "author"] {
                if let Some(child) = object.get(name) {
                    paths.push(name.to_string());
                    paths.extend(shape(child).into_iter().map(|p| format!("{}.{}", name, p)));
                }
            }
        }
        paths
    }

    #[test]
    fn test_cached_mutual_references_match_uncached() {
        let cached = library(true);
        let uncached = library(false);
        for generator in [&cached, &uncached] {
            assert_ok(generator.generate("a::Author"), "author first");
        }

        let book = assert_ok(cached.generate("a::Book"), "cached book");
        let expected = assert_ok(uncached.generate("a::Book"), "uncached book");
        assert!(book.field("author").is_some());
        assert_eq!(shape(&book), shape(&expected));
        assert_eq!(shape(&book), vec!["title", "author", "author.name"]);
    }
}

// =============================================================================
// Batches and Sequences
// =============================================================================

mod batch_tests {
    use super::*;

    #[test]
    fn test_generate_many() {
        let generator = seeded_generator(13);
        let customers = assert_ok(generator.generate_many("shop::Customer", 5), "five customers");
        assert_eq!(customers.len(), 5);
        assert!(customers
            .iter()
            .all(|c| c.runtime_type() == TypeKey::from("shop::Customer")));
        assert!(generator.generate_many("shop::Customer", 0).unwrap().is_empty());
    }

    #[test]
    fn test_generate_list_defaults_to_two() {
        let generator = seeded_generator(13);
        assert_eq!(generator.generate_list("shop::Address").unwrap().len(), 2);
    }

    #[test]
    fn test_possible_values_restartable() {
        let generator = seeded_generator(13);
        let values = generator.possible_values("shop::Status");
        let first: Vec<_> = values.clone().take(3).collect::<Result<_, _>>().unwrap();
        let again: Vec<_> = values.take(4).collect::<Result<_, _>>().unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(again.len(), 4);
        assert!(again.iter().all(|v| matches!(v, Value::Enum { .. })));
    }

    #[test]
    fn test_arrays_of_declared_types() {
        let generator = seeded_generator(13);
        let key = TypeKey::array_of(&"shop::Address".into());
        for _ in 0..10 {
            let value = generator.generate(key.clone()).unwrap();
            assert_in_range(value.len().unwrap(), 1, 10, "array length");
        }
    }

    #[test]
    fn test_same_seed_same_values() {
        let a = seeded_generator(99).generate("shop::Order").unwrap();
        let b = seeded_generator(99).generate("shop::Order").unwrap();
        assert_eq!(a, b);
    }
}

// =============================================================================
// Typed Output
// =============================================================================

mod typed_output_tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Customer {
        name: String,
        age: i32,
        email: String,
        tags: Vec<String>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    enum Status {
        Pending,
        Paid,
        Shipped,
    }

    #[test]
    fn test_generate_as_struct() {
        let generator = seeded_generator(14);
        let customer: Customer = generator.generate_as("shop::Customer").unwrap();
        assert_eq!(customer.name.chars().count(), 10);
        assert_eq!(customer.email.chars().count(), 10);
        assert_eq!(customer.tags.len(), 1);
        let _ = customer.age;
    }

    #[test]
    fn test_generate_as_enum() {
        let generator = seeded_generator(14);
        let status: Status = generator.generate_as("shop::Status").unwrap();
        assert!([Status::Pending, Status::Paid, Status::Shipped].contains(&status));
    }

    #[test]
    fn test_generate_as_shape_mismatch() {
        let generator = seeded_generator(14);
        let result: anyhow::Result<Customer> = generator.generate_as("shop::Money");
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_generator_handle() {
        let model = TypeModel::new().with(TypeDef::record("a::Flag", &[("on", "bool")]));
        let generator = ObjectGenerator::with_config(model, SynthConfig::seeded(1)).unwrap();
        generator.register_member_generator(
            "a::Flag",
            "on",
            ValueGenerator::constant(Value::Bool(true)),
        );
        let flag = generator.generate("a::Flag").unwrap();
        assert_eq!(flag.field("on"), Some(&Value::Bool(true)));
    }
}
