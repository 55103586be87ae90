use proptest::prelude::*;
use serde_json::{Value as JsonValue, json};
use std::collections::BTreeSet;
use strata_core::prelude::*;

const LEVELS: [Level; 5] = [
    level::BASIC,
    level::SHORT,
    level::DETAIL,
    level::CONFIDENTIAL,
    level::NEVER,
];

fn registry() -> Registry {
    let registry = Registry::new();

    let profile = ModelClass::builder("Profile")
        .schema(
            Schema::new("Profile")
                .prop(Property::new("handle", Type::string()))
                .prop(Property::new("bio", Type::string()).optional()),
        )
        .field("bio", FieldOptions::new().level(level::DETAIL))
        .build();
    let user = ModelClass::builder("User")
        .schema(
            Schema::new("User")
                .prop(Property::new("id", Type::string()))
                .prop(Property::new("email", Type::string()))
                .prop(Property::new("password", Type::string()))
                .prop(Property::new("secret", Type::string()))
                .prop(Property::new("profile", Type::reference("Profile")).optional())
                .prop(Property::new("display", Type::string()).getter())
                .prop(Property::method("greet")),
        )
        .field("id", FieldOptions::new().level(level::BASIC))
        .field("email", FieldOptions::new().level(level::SHORT))
        .field("password", FieldOptions::new().level(level::CONFIDENTIAL))
        .field("secret", FieldOptions::new().level(level::NEVER))
        .field("display", FieldOptions::new().level(level::SHORT))
        .getter("display", |user| {
            let email = user.get("email").and_then(|v| v.as_text().map(str::to_string));
            Value::from(format!("<{}>", email.unwrap_or_default()))
        })
        .method("greet", |_, _| Value::from("hi"))
        .build();

    registry.register_class(&profile).expect("profile");
    registry.register_class(&user).expect("user");

    registry
}

fn user(registry: &Registry, email: &str, bio: Option<&str>) -> Value {
    let mut raw = json!({
        "id": "u1",
        "email": email,
        "password": "hunter2",
        "secret": "s",
        "profile": { "handle": "ada" },
    });
    if let Some(bio) = bio {
        raw["profile"]["bio"] = json!(bio);
    }

    registry
        .materialize("User", raw, &ModelizeOptions::default())
        .expect("materialize")
}

fn keys(json: &JsonValue) -> BTreeSet<String> {
    json.as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

#[test]
fn each_level_shows_its_fields() {
    let registry = registry();
    let value = user(&registry, "a@b.c", Some("hello"));

    let at = |level: Level| registry.to_object(&value, &ProjectOptions::level(level));

    assert_eq!(at(level::BASIC), json!({ "id": "u1", "profile": { "handle": "ada" } }));
    assert_eq!(
        at(level::SHORT),
        json!({
            "id": "u1",
            "email": "a@b.c",
            "profile": { "handle": "ada" },
            "display": "<a@b.c>",
        })
    );
    assert_eq!(
        at(level::DETAIL),
        json!({
            "id": "u1",
            "email": "a@b.c",
            "profile": { "handle": "ada", "bio": "hello" },
            "display": "<a@b.c>",
        })
    );
    assert_eq!(keys(&at(level::NEVER)).len(), 6);
}

#[test]
fn default_projection_skips_never_and_methods() {
    let registry = registry();
    let value = user(&registry, "a@b.c", None);

    let json = registry.to_object(&value, &ProjectOptions::default());

    assert_eq!(
        keys(&json),
        ["display", "email", "id", "password", "profile"]
            .into_iter()
            .map(String::from)
            .collect()
    );
}

#[test]
fn output_follows_combined_field_order() {
    let registry = registry();
    let value = user(&registry, "a@b.c", None);

    let json = registry.to_object(&value, &ProjectOptions::level(level::SHORT));
    let order: Vec<&str> = json
        .as_object()
        .map(|map| map.keys().map(String::as_str).collect())
        .unwrap_or_default();

    assert_eq!(order, ["id", "email", "profile", "display"]);
}

#[test]
fn setters_route_writes() {
    let registry = Registry::new();
    let class = ModelClass::builder("Temp")
        .schema(
            Schema::new("Temp")
                .prop(Property::new("celsius", Type::number()).optional())
                .prop(Property::new("fahrenheit", Type::number()).optional().getter().setter()),
        )
        .getter("fahrenheit", |t| {
            let c = t.get("celsius").and_then(|v| v.as_i64()).unwrap_or_default();
            Value::from(c * 9 / 5 + 32)
        })
        .setter("fahrenheit", |t, value| {
            let f = value.as_i64().unwrap_or_default();
            t.store("celsius", Value::from((f - 32) * 5 / 9));
        })
        .field("fahrenheit", FieldOptions::new().level(level::BASIC))
        .build();
    registry.register_class(&class).expect("register");

    let value = registry
        .materialize("Temp", json!({ "fahrenheit": 212 }), &ModelizeOptions::default())
        .expect("materialize");

    let temp = value.as_instance().expect("instance");
    assert_eq!(temp.field("celsius"), Some(&Value::from(100)));
    assert_eq!(temp.field("fahrenheit"), None);
    assert_eq!(
        registry.to_object(&value, &ProjectOptions::default()),
        json!({ "celsius": 100, "fahrenheit": 212 })
    );
}

proptest! {
    #[test]
    fn levels_are_monotonic(a in 0usize..LEVELS.len(), b in 0usize..LEVELS.len(), email in "[a-z]{1,8}") {
        let (low, high) = if LEVELS[a] <= LEVELS[b] { (LEVELS[a], LEVELS[b]) } else { (LEVELS[b], LEVELS[a]) };
        let registry = registry();
        let value = user(&registry, &email, Some("bio"));

        let low_keys = keys(&registry.to_object(&value, &ProjectOptions::level(low)));
        let high_keys = keys(&registry.to_object(&value, &ProjectOptions::level(high)));

        prop_assert!(low_keys.is_subset(&high_keys));
    }

    #[test]
    fn projection_is_idempotent(level in prop::sample::select(LEVELS.to_vec()), email in "[a-z@.]{0,12}") {
        let registry = registry();
        let value = user(&registry, &email, None);
        let options = ProjectOptions::level(level);

        prop_assert_eq!(registry.to_object(&value, &options), registry.to_object(&value, &options));
    }

    #[test]
    fn rematerializing_a_projection_is_stable(email in "[a-z]{1,8}", bio in proptest::option::of("[a-z ]{0,16}")) {
        let registry = registry();
        let value = user(&registry, &email, bio.as_deref());
        let first = registry.to_object(&value, &ProjectOptions::default());

        let again = registry
            .materialize("User", first.clone(), &ModelizeOptions::default())
            .expect("materialize");

        prop_assert_eq!(registry.to_object(&again, &ProjectOptions::default()), first);
    }
}
