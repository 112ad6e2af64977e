//! Sample type model used across integration tests.
//!
//! A small shop domain exercising every construction strategy:
//!
//! - `shop::Customer`: overloaded constructors (1 and 3 parameters)
//! - `shop::Money`: static factories only
//! - `shop::Order`: built through `shop::OrderBuilder`
//! - `shop::Category`: refers to itself
//! - `shop::PaymentMethod`: interface with two implementations
//! - `shop::Status`: enumeration

use anyhow::anyhow;
use fixture_synth::{
    Constraint, Object, ObjectGenerator, SynthConfig, TypeDef, TypeModel, Value, Visibility,
};

fn object(key: &str, fields: &[(&str, &Value)]) -> Value {
    let mut obj = Object::new(key);
    for (name, value) in fields {
        obj.set(*name, (*value).clone());
    }
    Value::Object(obj)
}

pub fn shop_model() -> TypeModel {
    TypeModel::new()
        .with(TypeDef::enumeration(
            "shop::Status",
            &["Pending", "Paid", "Shipped"],
        ))
        .with(TypeDef::record(
            "shop::Address",
            &[("street", "string"), ("city", "string")],
        ))
        .with(
            TypeDef::class("shop::Customer")
                .constructor(&["string"], |args| {
                    Ok(object("shop::Customer", &[("name", &args[0])]))
                })
                .constructor(&["string", "i32", "shop::Address"], |args| {
                    Ok(object(
                        "shop::Customer",
                        &[("name", &args[0]), ("age", &args[1]), ("address", &args[2])],
                    ))
                })
                .final_field("name", "string", Visibility::Private)
                .field("email", "string", Visibility::Private)
                .setter("email", "string")
                .field("tags", "list", Visibility::Private)
                .setter("tags", "list")
                .adder("tag", "tags", "string"),
        )
        .with(
            TypeDef::class("shop::Money")
                .final_field("amount", "i64", Visibility::Private)
                .final_field("currency", "string", Visibility::Private)
                .static_method(
                    "of",
                    Visibility::Public,
                    &["i64", "string"],
                    "shop::Money",
                    |args| {
                        Ok(object(
                            "shop::Money",
                            &[("amount", &args[0]), ("currency", &args[1])],
                        ))
                    },
                )
                .static_method("zero", Visibility::Public, &[], "shop::Money", |_| {
                    Ok(object("shop::Money", &[("amount", &Value::I64(0))]))
                }),
        )
        .with(
            TypeDef::class("shop::Order")
                .final_field("id", "i64", Visibility::Private)
                .final_field("customer", "shop::Customer", Visibility::Private)
                .final_field("total", "shop::Money", Visibility::Private)
                .final_field("status", "shop::Status", Visibility::Private)
                .static_method("builder", Visibility::Public, &[], "shop::OrderBuilder", |_| {
                    Ok(Value::Object(Object::new("shop::OrderBuilder")))
                }),
        )
        .with(
            TypeDef::class("shop::OrderBuilder")
                .field("id", "i64", Visibility::Private)
                .field("customer", "shop::Customer", Visibility::Private)
                .field("total", "shop::Money", Visibility::Private)
                .field("status", "shop::Status", Visibility::Private)
                .setter("id", "i64")
                .setter("customer", "shop::Customer")
                .setter("total", "shop::Money")
                .setter("status", "shop::Status")
                .method(
                    "build",
                    Visibility::Public,
                    &[],
                    Some("shop::Order"),
                    |builder, _| {
                        let fields = builder
                            .as_object()
                            .ok_or_else(|| anyhow!("builder is not an object"))?
                            .fields
                            .clone();
                        let mut order = Object::new("shop::Order");
                        order.fields = fields;
                        Ok(Some(Value::Object(order)))
                    },
                ),
        )
        .with(TypeDef::record(
            "shop::Category",
            &[("name", "string"), ("parent", "shop::Category")],
        ))
        .with(TypeDef::interface("shop::PaymentMethod"))
        .with(
            TypeDef::record("shop::Card", &[("number", "string")])
                .extends("shop::PaymentMethod"),
        )
        .with(
            TypeDef::record("shop::Voucher", &[("code", "string")])
                .extends("shop::PaymentMethod"),
        )
        .with(
            TypeDef::class("shop::Profile")
                .default_constructor()
                .field("nickname", "string", Visibility::Private)
                .setter("nickname", "string")
                .constraint("nickname", Constraint::size(5, 10)),
        )
        .with(TypeDef::class("shop::Vault").constructor_with(
            Visibility::Private,
            &[],
            |_| Ok(Value::Object(Object::new("shop::Vault"))),
        ))
        .with(TypeDef::class("shop::Broken").constructor(&["i32"], |_| {
            Err(anyhow!("constructor always fails"))
        }))
}

/// Generator over [`shop_model`] with a fixed seed.
pub fn seeded_generator(seed: u64) -> ObjectGenerator {
    ObjectGenerator::with_config(shop_model(), SynthConfig::seeded(seed))
        .expect("default config is valid")
}
