//! Materialization: turning raw data into instances of registered models.

use crate::{
    Error,
    builtin::ID_FIELD,
    error::{CoercionError, MaterializationError},
    model::{ClassKind, EnumDef, FieldDescriptor, ModelDescriptor, TypeClass},
    registry::{ModelKey, Registry},
    value::{Attachment, Instance, Value},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use strata_schema::node::ID_TYPE;
use tracing::trace;

///
/// ModelizeOptions
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ModelizeOptions {
    /// Record parent/path/index on nested instances.
    pub attach_field_metadata: bool,

    /// Expand string ids in reference fields into `{ _id }` stubs.
    pub allow_reference: bool,
}

impl ModelizeOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attach_field_metadata: false,
            allow_reference: false,
        }
    }

    #[must_use]
    pub const fn attach_field_metadata(mut self) -> Self {
        self.attach_field_metadata = true;
        self
    }

    #[must_use]
    pub const fn allow_reference(mut self) -> Self {
        self.allow_reference = true;
        self
    }
}

///
/// Scope
/// State shared by the fields of one object being materialized.
///

struct Scope<'a> {
    registry: &'a Registry,
    options: &'a ModelizeOptions,
    owner: &'a str,
    raw: &'a Value,
}

impl Registry {
    /// Materialize `raw` as the model named by `key`.
    pub fn materialize<'a>(
        &self,
        key: impl Into<ModelKey<'a>>,
        raw: impl Into<Value>,
        options: &ModelizeOptions,
    ) -> Result<Value, Error> {
        let descriptor = self.get_metadata(key)?;

        Ok(self.modelize(&descriptor, raw.into(), options, None)?)
    }

    pub(crate) fn modelize(
        &self,
        descriptor: &Arc<ModelDescriptor>,
        raw: Value,
        options: &ModelizeOptions,
        attachment: Option<Attachment>,
    ) -> Result<Value, MaterializationError> {
        match descriptor.kind() {
            ClassKind::Enum(def) => return modelize_enum(def, raw),
            ClassKind::Custom(custom) => {
                return custom
                    .modelize(raw, options)
                    .map_err(MaterializationError::leaf);
            }
            ClassKind::Model => {}
        }

        if let Value::Instance(instance) = &raw
            && instance.is_instance_of(descriptor.class())
        {
            return Ok(raw);
        }
        if raw.is_null() {
            return Ok(raw);
        }

        let mut raw = raw;
        if let Some(key) = descriptor.discriminator_key() {
            if let Some(variant) = self.discriminator_variant(descriptor, &raw, key)? {
                trace!(
                    model = descriptor.name(),
                    variant = variant.name(),
                    "dispatching on discriminator"
                );
                return self.modelize(&variant, raw, options, attachment);
            }
            if let Value::Object(map) = &mut raw {
                map.entry(key.to_string())
                    .or_insert_with(|| Value::Text(descriptor.name().to_string()));
            }
        }

        let mut instance = Instance::new(Arc::clone(descriptor));
        let scope = Scope {
            registry: self,
            options,
            owner: descriptor.name(),
            raw: &raw,
        };

        for field in descriptor.fields() {
            if !field.is_assignable() {
                continue;
            }
            let Some(object) = raw.as_object() else {
                return Err(MaterializationError::leaf(CoercionError::NotAnObject {
                    found: raw.kind_name(),
                })
                .nest(descriptor.name(), field.name()));
            };

            let value = field
                .modelize(object.get(field.name()).cloned(), &scope)
                .map_err(|err| err.nest(descriptor.name(), field.name()))?;
            if let Some(value) = value {
                instance.set(field.name(), value);
            }
        }

        if let Some(key) = descriptor.discriminator_key()
            && !descriptor.fields().contains(key)
            && let Some(tag) = raw.get(key)
        {
            instance.store(key, tag);
        }

        if options.attach_field_metadata
            && let Some(attachment) = attachment
        {
            instance.attach(attachment);
        }

        Ok(Value::Instance(Box::new(instance)))
    }

    // registered subclass named by the discriminator, when it is not the
    // descriptor itself
    fn discriminator_variant(
        &self,
        descriptor: &ModelDescriptor,
        raw: &Value,
        key: &str,
    ) -> Result<Option<Arc<ModelDescriptor>>, MaterializationError> {
        let Some(Value::Text(name)) = raw.as_object().and_then(|map| map.get(key)) else {
            return Ok(None);
        };
        if name.eq_ignore_ascii_case(descriptor.name()) {
            return Ok(None);
        }
        if !descriptor
            .discriminator_children()
            .iter()
            .any(|child| child.eq_ignore_ascii_case(name))
        {
            return Ok(None);
        }

        self.get_metadata(name.as_str())
            .map(Some)
            .map_err(|err| MaterializationError::leaf(CoercionError::Metadata(Box::new(err))))
    }
}

fn modelize_enum(def: &EnumDef, raw: Value) -> Result<Value, MaterializationError> {
    if raw.is_null() || def.contains(&raw) {
        return Ok(raw);
    }

    Err(MaterializationError::leaf(CoercionError::UnknownEnumValue {
        name: def.name().to_string(),
        value: raw.describe(),
    }))
}

impl FieldDescriptor {
    /// Convert the raw value of this field. `None` leaves the field unset.
    fn modelize(
        &self,
        raw: Option<Value>,
        scope: &Scope<'_>,
    ) -> Result<Option<Value>, MaterializationError> {
        if raw.is_none()
            && self.is_required(scope.raw)
            && let Some(zero) = self.zero_value()
        {
            return Ok(Some(zero));
        }

        let raw = raw.or_else(|| self.default_value());
        if self.is_id() {
            return Ok(raw);
        }
        let Some(raw) = raw else {
            return Ok((self.is_array() && !self.is_optional()).then(|| Value::List(Vec::new())));
        };

        if let Some(ty) = self.explicit_type() {
            return ty.apply(raw).map(Some).map_err(MaterializationError::leaf);
        }

        if self.prop().is_none() {
            return match self.options().and_then(|o| o.model.as_deref()) {
                Some(model) => self
                    .modelize_named(model, raw, None, scope)
                    .map(Some),
                None => Ok(Some(raw)),
            };
        }

        match self.type_class() {
            TypeClass::Array(element) => {
                let Value::List(items) = raw else {
                    return Err(MaterializationError::leaf(CoercionError::ExpectedArray {
                        found: raw.kind_name(),
                    }));
                };

                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| {
                        self.modelize_element(element, item, Some(index), scope)
                            .map_err(|err| err.at_index(index))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(|items| Some(Value::List(items)))
            }
            class => self.modelize_element(class, raw, None, scope).map(Some),
        }
    }

    fn modelize_element(
        &self,
        class: &TypeClass,
        raw: Value,
        index: Option<usize>,
        scope: &Scope<'_>,
    ) -> Result<Value, MaterializationError> {
        match class {
            TypeClass::Map(inner) => {
                let Value::Object(entries) = raw else {
                    return Err(MaterializationError::leaf(CoercionError::ExpectedObject {
                        found: raw.kind_name(),
                    }));
                };

                entries
                    .into_iter()
                    .map(|(key, value)| {
                        self.modelize_typed(inner, value, None, scope)
                            .map(|value| (key.clone(), value))
                            .map_err(|err| err.at_key(&key))
                    })
                    .collect::<Result<BTreeMap<_, _>, _>>()
                    .map(Value::Object)
            }
            TypeClass::Ref(inner) => match raw {
                Value::Text(id) if !scope.options.allow_reference => Ok(Value::Text(id)),
                Value::Text(id) => {
                    trace!(field = self.name(), id = %id, "expanding reference id");
                    let stub = Value::object([(ID_FIELD, id)]);
                    self.modelize_typed(inner, stub, index, scope)
                }
                other => self.modelize_typed(inner, other, index, scope),
            },
            other => self.modelize_typed(other, raw, index, scope),
        }
    }

    fn modelize_typed(
        &self,
        class: &TypeClass,
        raw: Value,
        index: Option<usize>,
        scope: &Scope<'_>,
    ) -> Result<Value, MaterializationError> {
        match class {
            TypeClass::Named(name) if name != ID_TYPE => {
                self.modelize_named(name, raw, index, scope)
            }
            _ => Ok(raw),
        }
    }

    fn modelize_named(
        &self,
        name: &str,
        raw: Value,
        index: Option<usize>,
        scope: &Scope<'_>,
    ) -> Result<Value, MaterializationError> {
        let descriptor = scope
            .registry
            .get_metadata(name)
            .map_err(|err| MaterializationError::leaf(CoercionError::Metadata(Box::new(err))))?;
        let attachment = Attachment {
            parent: Some(scope.owner.to_string()),
            path: Some(self.name().to_string()),
            is_array: index.is_some(),
            index,
        };

        scope
            .registry
            .modelize(&descriptor, raw, scope.options, Some(attachment))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        level,
        model::ModelClass,
        options::FieldOptions,
        test_fixtures,
    };
    use serde_json::json;
    use strata_schema::node::{Property, Schema, Type};

    fn instance(value: &Value) -> &Instance {
        value.as_instance().expect("instance")
    }

    #[test]
    fn materializes_nested_models_and_enums() {
        let registry = Registry::new();
        test_fixtures::register_user(&registry);

        let value = registry
            .materialize(
                "User",
                json!({
                    "email": "a@b.c",
                    "name": { "first": "Ada", "last": "Lovelace" },
                    "gender": "FEMALE",
                    "age": 36,
                }),
                &ModelizeOptions::default(),
            )
            .expect("materialize");

        let user = instance(&value);
        assert_eq!(user.model_name(), "User");
        assert_eq!(user.field("gender"), Some(&Value::from("FEMALE")));

        let name = user.field("name").and_then(Value::as_instance).expect("name");
        assert_eq!(name.model_name(), "Name");
        assert_eq!(name.field("first"), Some(&Value::from("Ada")));
    }

    #[test]
    fn unknown_enum_values_fail_with_path() {
        let registry = Registry::new();
        test_fixtures::register_user(&registry);

        let err = registry
            .materialize(
                "User",
                json!({ "email": "a", "gender": "OTHER" }),
                &ModelizeOptions::default(),
            )
            .expect_err("bad enum");

        let err = err.as_materialization().expect("materialization");
        assert_eq!(err.path(), "gender");
        assert!(matches!(err.cause(), CoercionError::UnknownEnumValue { .. }));
    }

    #[test]
    fn missing_required_primitives_get_zero_values() {
        let registry = Registry::new();
        test_fixtures::register_user(&registry);

        let value = registry
            .materialize("User", json!({}), &ModelizeOptions::default())
            .expect("materialize");

        let user = instance(&value);
        assert_eq!(user.field("email"), Some(&Value::from("")));
        assert_eq!(user.field("age"), None);
        assert_eq!(user.field("name"), None);
    }

    #[test]
    fn defaults_fill_missing_values() {
        let registry = Registry::new();
        let class = ModelClass::builder("Defaults")
            .schema(
                Schema::new("Defaults")
                    .prop(Property::new("level", Type::number()).optional())
                    .prop(Property::new("tags", Type::array(Type::string())).optional()),
            )
            .field("level", FieldOptions::new().default_value(level::SHORT))
            .field("tags", FieldOptions::new().default_with(|| Value::list(["new"])))
            .build();
        registry.register_class(&class).expect("register");

        let value = registry
            .materialize("Defaults", json!({ "level": 5 }), &ModelizeOptions::default())
            .expect("materialize");
        let defaults = instance(&value);

        assert_eq!(defaults.field("level"), Some(&Value::from(5)));
        assert_eq!(defaults.field("tags"), Some(&Value::list(["new"])));
    }

    #[test]
    fn non_object_input_fails_at_first_field() {
        let registry = Registry::new();
        test_fixtures::register_user(&registry);

        let err = registry
            .materialize("User", 42, &ModelizeOptions::default())
            .expect_err("not an object");

        let err = err.as_materialization().expect("materialization");
        assert_eq!(err.model(), Some("User"));
        assert_eq!(err.path(), "email");
        assert!(matches!(err.cause(), CoercionError::NotAnObject { found: "number" }));
    }

    #[test]
    fn existing_instances_pass_through() {
        let registry = Registry::new();
        test_fixtures::register_user(&registry);

        let first = registry
            .materialize("Name", json!({ "first": "Ada" }), &ModelizeOptions::default())
            .expect("materialize");
        let second = registry
            .materialize("Name", first.clone(), &ModelizeOptions::default())
            .expect("materialize");

        assert_eq!(first, second);
    }

    #[test]
    fn null_stays_null() {
        let registry = Registry::new();
        test_fixtures::register_user(&registry);

        let value = registry
            .materialize("User", Value::Null, &ModelizeOptions::default())
            .expect("materialize");

        assert!(value.is_null());
    }

    #[test]
    fn unknown_nested_type_is_reported() {
        let registry = Registry::new();
        let class = ModelClass::builder("Holder")
            .schema(Schema::new("Holder").prop(Property::new("thing", Type::reference("Ghost"))))
            .build();
        registry.register_class(&class).expect("register");

        let err = registry
            .materialize("Holder", json!({ "thing": {} }), &ModelizeOptions::default())
            .expect_err("ghost");

        let err = err.as_materialization().expect("materialization");
        assert_eq!(err.path(), "thing");
        assert!(matches!(err.cause(), CoercionError::Metadata(_)));
    }

    #[test]
    fn attachment_is_recorded_on_request() {
        let registry = Registry::new();
        test_fixtures::register_user(&registry);
        let raw = json!({ "email": "a", "name": { "first": "Ada" } });

        let plain = registry
            .materialize("User", raw.clone(), &ModelizeOptions::default())
            .expect("materialize");
        let attached = registry
            .materialize("User", raw, &ModelizeOptions::new().attach_field_metadata())
            .expect("materialize");

        let name = |value: &Value| {
            instance(value)
                .field("name")
                .and_then(Value::as_instance)
                .and_then(|n| n.attachment().cloned())
        };
        assert_eq!(name(&plain), None);
        assert_eq!(
            name(&attached),
            Some(Attachment {
                parent: Some("User".to_string()),
                path: Some("name".to_string()),
                is_array: false,
                index: None,
            })
        );
        assert_eq!(instance(&attached).attachment(), None);
    }

    #[test]
    fn explicit_model_option_materializes_untyped_fields() {
        let registry = Registry::new();
        test_fixtures::register_user(&registry);
        let class = ModelClass::builder("Loose")
            .field("who", FieldOptions::new().model("Name"))
            .build();
        registry.register_class(&class).expect("register");

        let value = registry
            .materialize("Loose", json!({ "who": { "first": "Ada" } }), &ModelizeOptions::default())
            .expect("materialize");

        let who = instance(&value).field("who").and_then(Value::as_instance);
        assert_eq!(who.map(Instance::model_name), Some("Name"));
    }

    #[test]
    fn options_read_from_partial_json() {
        let options: ModelizeOptions =
            serde_json::from_value(json!({ "allow_reference": true })).expect("options");

        assert_eq!(options, ModelizeOptions::new().allow_reference());
    }
}
