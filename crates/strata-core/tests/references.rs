use serde_json::json;
use strata_core::{builtin::ID_FIELD, prelude::*};

fn registry() -> Registry {
    let registry = Registry::with_builtin_types().expect("builtins");

    let account = ModelClass::builder("Account")
        .schema(
            Schema::new("Account")
                .prop(Property::new(ID_FIELD, Type::reference("ID")).optional())
                .prop(Property::new("owner", Type::string()).optional()),
        )
        .build();
    let holder = ModelClass::builder("Holder")
        .schema(
            Schema::new("Holder")
                .prop(Property::new("account", Type::model_ref("Account")).optional())
                .prop(Property::new("accounts", Type::array(Type::model_ref("Account"))).optional())
                .prop(Property::new("byName", Type::map_of(Type::reference("Account"))).optional()),
        )
        .build();

    registry.register_class(&account).expect("account");
    registry.register_class(&holder).expect("holder");

    registry
}

#[test]
fn bare_ids_are_kept_without_reference_coercion() {
    let registry = registry();

    let value = registry
        .materialize("Holder", json!({ "account": "abc123" }), &ModelizeOptions::default())
        .expect("materialize");

    let holder = value.as_instance().expect("instance");
    assert_eq!(holder.field("account"), Some(&Value::from("abc123")));
    assert_eq!(
        registry.to_object(&value, &ProjectOptions::default()),
        json!({ "account": "abc123" })
    );
}

#[test]
fn bare_ids_become_stubs_with_reference_coercion() {
    let registry = registry();

    let value = registry
        .materialize(
            "Holder",
            json!({ "account": "abc123" }),
            &ModelizeOptions::new().allow_reference(),
        )
        .expect("materialize");

    let account = value
        .as_instance()
        .and_then(|holder| holder.field("account"))
        .and_then(Value::as_instance)
        .expect("account instance");
    assert_eq!(account.model_name(), "Account");
    assert_eq!(account.field(ID_FIELD), Some(&Value::from("abc123")));
    assert_eq!(
        registry.to_object(&value, &ProjectOptions::default()),
        json!({ "account": { "_id": "abc123" } })
    );
}

#[test]
fn embedded_references_are_materialized() {
    let registry = registry();

    let value = registry
        .materialize(
            "Holder",
            json!({ "account": { "_id": "a1", "owner": "ada" } }),
            &ModelizeOptions::default(),
        )
        .expect("materialize");

    let account = value
        .as_instance()
        .and_then(|holder| holder.field("account"))
        .and_then(Value::as_instance)
        .expect("account instance");
    assert_eq!(account.field("owner"), Some(&Value::from("ada")));
}

#[test]
fn reference_arrays_mix_ids_and_objects() {
    let registry = registry();

    let value = registry
        .materialize(
            "Holder",
            json!({ "accounts": ["a1", { "_id": "a2" }] }),
            &ModelizeOptions::new().allow_reference().attach_field_metadata(),
        )
        .expect("materialize");

    let accounts = value
        .as_instance()
        .and_then(|holder| holder.field("accounts"))
        .and_then(Value::as_list)
        .expect("accounts");
    assert_eq!(accounts.len(), 2);

    let second = accounts[1].as_instance().expect("instance");
    let attachment = second.attachment().expect("attached");
    assert_eq!(attachment.parent.as_deref(), Some("Holder"));
    assert_eq!(attachment.path.as_deref(), Some("accounts"));
    assert!(attachment.is_array);
    assert_eq!(attachment.index, Some(1));
}

#[test]
fn map_fields_materialize_each_entry() {
    let registry = registry();

    let value = registry
        .materialize(
            "Holder",
            json!({ "byName": { "ada": { "owner": "ada" }, "bob": { "owner": "bob" } } }),
            &ModelizeOptions::default(),
        )
        .expect("materialize");

    let by_name = value
        .as_instance()
        .and_then(|holder| holder.field("byName"))
        .and_then(Value::as_object)
        .expect("map");
    assert_eq!(by_name.len(), 2);
    assert!(by_name.values().all(|entry| entry.as_instance().is_some()));

    assert_eq!(
        registry.to_object(&value, &ProjectOptions::default()),
        json!({ "byName": { "ada": { "owner": "ada" }, "bob": { "owner": "bob" } } })
    );
}

#[test]
fn map_entry_errors_name_the_key() {
    let registry = registry();

    let err = registry
        .materialize(
            "Holder",
            json!({ "byName": { "ada": 5 } }),
            &ModelizeOptions::default(),
        )
        .expect_err("entry is not an object");

    assert_eq!(
        err.as_materialization().map(MaterializationError::path),
        Some("byName[ada]:Account._id".to_string())
    );
}
