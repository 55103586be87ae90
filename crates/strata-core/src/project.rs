//! Projection: rendering instances as plain JSON, filtered by data level.

use crate::{
    builtin,
    level::{DEFAULT_PROJECTION_LEVEL, Level},
    model::{ClassKind, FieldDescriptor, ModelDescriptor, TypeClass},
    registry::Registry,
    value::{Instance, Value},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

///
/// ProjectOptions
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ProjectOptions {
    /// Highest field level to keep. Falls back to the model's configured
    /// default, then to [`DEFAULT_PROJECTION_LEVEL`].
    pub level: Option<Level>,
}

impl ProjectOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self { level: None }
    }

    #[must_use]
    pub const fn level(level: Level) -> Self {
        Self { level: Some(level) }
    }
}

impl Registry {
    /// Project any value. Instances use their own descriptor.
    #[must_use]
    pub fn to_object(&self, value: &Value, options: &ProjectOptions) -> JsonValue {
        self.project_value(value, options)
    }

    pub(crate) fn project_value(&self, value: &Value, options: &ProjectOptions) -> JsonValue {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(n) => JsonValue::Number(n.clone()),
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Date(_) => builtin::format_date(value).map_or(JsonValue::Null, JsonValue::String),
            Value::List(items) => JsonValue::Array(
                items
                    .iter()
                    .map(|item| self.project_value(item, options))
                    .collect(),
            ),
            Value::Object(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.project_value(v, options)))
                    .collect(),
            ),
            Value::Instance(instance) => instance
                .descriptor()
                .project_instance(self, instance, options),
        }
    }
}

impl ModelDescriptor {
    /// Project `value` as this model. Plain objects are read key by key;
    /// other non-instances are rendered as-is.
    #[must_use]
    pub fn to_object(&self, registry: &Registry, value: &Value, options: &ProjectOptions) -> JsonValue {
        match value {
            Value::Instance(instance) => self.project_fields(registry, options, |name| instance.get(name)),
            Value::Object(map) => self.project_fields(registry, options, |name| map.get(name).cloned()),
            other => registry.project_value(other, options),
        }
    }

    pub(crate) fn project_instance(
        &self,
        registry: &Registry,
        instance: &Instance,
        options: &ProjectOptions,
    ) -> JsonValue {
        self.project_fields(registry, options, |name| instance.get(name))
    }

    fn project_fields<F>(&self, registry: &Registry, options: &ProjectOptions, read: F) -> JsonValue
    where
        F: Fn(&str) -> Option<Value>,
    {
        let level = options
            .level
            .or(self.config().default_level)
            .unwrap_or(DEFAULT_PROJECTION_LEVEL);

        let mut out = JsonMap::new();
        for field in self.fields() {
            if field.is_method() || field.level().is_some_and(|l| l > level) {
                continue;
            }
            let Some(value) = read(field.name()) else {
                continue;
            };

            out.insert(field.name().to_string(), field.to_object(registry, &value, options));
        }

        JsonValue::Object(out)
    }
}

impl FieldDescriptor {
    /// Project one field value. An explicit level is remapped through the
    /// field's pass-level map before it reaches nested models.
    #[must_use]
    pub fn to_object(&self, registry: &Registry, value: &Value, options: &ProjectOptions) -> JsonValue {
        let nested = ProjectOptions {
            level: options.level.map(|level| self.pass_level(level)),
        };
        let project = |item: &Value| self.project_element(registry, item, options, &nested);

        match (self.type_class(), value) {
            (TypeClass::Map(_), Value::Object(map)) => {
                JsonValue::Object(map.iter().map(|(k, v)| (k.clone(), project(v))).collect())
            }
            (TypeClass::Array(_), Value::List(items)) => {
                JsonValue::Array(items.iter().map(project).collect())
            }
            _ => project(value),
        }
    }

    fn project_element(
        &self,
        registry: &Registry,
        value: &Value,
        options: &ProjectOptions,
        nested: &ProjectOptions,
    ) -> JsonValue {
        let target = self
            .type_class()
            .referenced_name()
            .or_else(|| self.options().and_then(|o| o.model.as_deref()))
            .and_then(|name| registry.get_metadata(name).ok());

        let Some(descriptor) = target else {
            return registry.project_value(value, nested);
        };

        match descriptor.kind() {
            ClassKind::Custom(custom) => custom.to_object(registry, value, options),
            ClassKind::Enum(_) => registry.project_value(value, options),
            ClassKind::Model => match value {
                Value::Instance(instance) => {
                    instance.descriptor().project_instance(registry, instance, nested)
                }
                Value::Object(_) => descriptor.to_object(registry, value, nested),
                other => registry.project_value(other, nested),
            },
        }
    }
}

///
/// TESTS
///
