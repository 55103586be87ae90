use crate::{
    level,
    model::{ClassRef, EnumDef, ModelClass},
    options::FieldOptions,
    registry::{Provided, Registry},
};
use strata_schema::node::{Property, Schema, Type};

/// Register `Gender`, `Name` and `User`; returns `User`.
pub(crate) fn register_user(registry: &Registry) -> ClassRef {
    registry
        .provide(
            Provided::Enum(EnumDef::strings("Gender", &["MALE", "FEMALE"])),
            None,
            None,
        )
        .expect("gender");

    let name = ModelClass::builder("Name")
        .schema(
            Schema::new("Name")
                .prop(Property::new("first", Type::string()))
                .prop(Property::new("last", Type::string()).optional()),
        )
        .field("first", FieldOptions::new().level(level::BASIC))
        .field("last", FieldOptions::new().level(level::DETAIL))
        .build();
    registry.register_class(&name).expect("name");

    let user = ModelClass::builder("User")
        .schema(
            Schema::new("User")
                .prop(Property::new("email", Type::string()))
                .prop(Property::new("name", Type::reference("Name")).optional())
                .prop(Property::new("gender", Type::reference("Gender")).optional())
                .prop(Property::new("age", Type::number()).optional()),
        )
        .field("email", FieldOptions::new().level(level::DETAIL))
        .field("gender", FieldOptions::new().level(level::SHORT))
        .field("age", FieldOptions::new().level(level::DETAIL))
        .build();
    registry.register_class(&user).expect("user");

    user
}

/// Register `EventModel` (discriminated on `kind`) and its `MouseEvent`
/// subclass.
pub(crate) fn register_events(registry: &Registry) -> (ClassRef, ClassRef) {
    let event = ModelClass::builder("EventModel")
        .discriminator_key("kind")
        .schema(
            Schema::new("EventModel")
                .prop(Property::new("kind", Type::string()).optional())
                .prop(Property::new("at", Type::number()).optional()),
        )
        .build();
    let mouse = ModelClass::builder("MouseEvent")
        .extends(&event)
        .schema(Schema::new("MouseEvent").prop(Property::new("x", Type::number()).optional()))
        .build();

    registry.register_class(&event).expect("event");
    registry.register_class(&mouse).expect("mouse");

    (event, mouse)
}
