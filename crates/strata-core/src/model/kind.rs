use crate::{
    error::CoercionError,
    materialize::ModelizeOptions,
    project::ProjectOptions,
    registry::Registry,
    value::Value,
};
use serde_json::{Number, Value as JsonValue};
use std::{fmt, sync::Arc};

///
/// ClassKind
///

#[derive(Clone, Debug)]
pub enum ClassKind {
    Model,
    Enum(EnumDef),
    Custom(CustomType),
}

impl ClassKind {
    #[must_use]
    pub const fn is_model(&self) -> bool {
        matches!(self, Self::Model)
    }

    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self, Self::Enum(_))
    }

    #[must_use]
    pub const fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

///
/// EnumType
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EnumType {
    Number,
    String,
}

///
/// EnumDef
///
/// A plain key/value enumeration. When any member value is a number the
/// enum is numeric and only numeric values count as members.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnumDef {
    name: String,
    members: Vec<(String, JsonValue)>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// String enum whose values equal their keys.
    pub fn strings(name: impl Into<String>, keys: &[&str]) -> Self {
        keys.iter()
            .fold(Self::new(name), |def, key| def.member(*key, *key))
    }

    #[must_use]
    pub fn member(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.members.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn members(&self) -> &[(String, JsonValue)] {
        &self.members
    }

    #[must_use]
    pub fn enum_type(&self) -> EnumType {
        if self.members.iter().any(|(_, v)| v.is_number()) {
            EnumType::Number
        } else {
            EnumType::String
        }
    }

    /// Member values of the enum's own type.
    #[must_use]
    pub fn values(&self) -> Vec<&JsonValue> {
        let ty = self.enum_type();

        self.members
            .iter()
            .map(|(_, v)| v)
            .filter(|v| ty == EnumType::String || v.is_number())
            .collect()
    }

    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.values().into_iter().any(|member| match (member, value) {
            (JsonValue::Number(a), Value::Number(b)) => same_number(a, b),
            (JsonValue::String(a), Value::Text(b)) => a == b,
            _ => false,
        })
    }
}

// integers compare exactly; a float on either side compares by value
fn same_number(a: &Number, b: &Number) -> bool {
    if a.is_f64() || b.is_f64() {
        return a
            .as_f64()
            .zip(b.as_f64())
            .is_some_and(|(x, y)| x.total_cmp(&y).is_eq());
    }

    a == b
}

pub type CustomModelizeFn =
    Arc<dyn Fn(Value, &ModelizeOptions) -> Result<Value, CoercionError> + Send + Sync>;
pub type CustomToObjectFn = Arc<dyn Fn(&Value, &ProjectOptions) -> JsonValue + Send + Sync>;

///
/// CustomType
///
/// A leaf type with its own conversion hooks. Missing hooks pass the value
/// through unchanged.
///

#[derive(Clone)]
pub struct CustomType {
    name: String,
    modelize: Option<CustomModelizeFn>,
    to_object: Option<CustomToObjectFn>,
}

impl CustomType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modelize: None,
            to_object: None,
        }
    }

    #[must_use]
    pub fn modelize_with<F>(mut self, f: F) -> Self
    where
        F: Fn(Value, &ModelizeOptions) -> Result<Value, CoercionError> + Send + Sync + 'static,
    {
        self.modelize = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn to_object_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &ProjectOptions) -> JsonValue + Send + Sync + 'static,
    {
        self.to_object = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn modelize(&self, raw: Value, options: &ModelizeOptions) -> Result<Value, CoercionError> {
        match &self.modelize {
            Some(f) => f(raw, options),
            None => Ok(raw),
        }
    }

    #[must_use]
    pub fn to_object(&self, registry: &Registry, value: &Value, options: &ProjectOptions) -> JsonValue {
        match &self.to_object {
            Some(f) => f(value, options),
            None => registry.project_value(value, options),
        }
    }
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomType")
            .field("name", &self.name)
            .field("modelize", &self.modelize.is_some())
            .field("to_object", &self.to_object.is_some())
            .finish()
    }
}

///
/// TESTS
///
