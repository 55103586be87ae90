use crate::{
    builtin,
    error::CoercionError,
    level::{Level, PassLevelMap},
    options::{MergeOptions, Resolver, concat_extra, concat_vecs},
    value::Value,
};
use serde_json::Value as JsonValue;
use std::{collections::BTreeMap, fmt, sync::Arc};

/// Importance given by [`FieldOptions::important`].
pub const IMPORTANT: i32 = 100;

///
/// Coercion
/// User supplied conversion applied to a raw field value.
///

#[derive(Clone)]
pub struct Coercion(Arc<dyn Fn(Value) -> Result<Value, CoercionError> + Send + Sync>);

impl Coercion {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, CoercionError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn apply(&self, raw: Value) -> Result<Value, CoercionError> {
        (self.0)(raw)
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Coercion(..)")
    }
}

///
/// FieldType
/// Explicit coercion for a field, overriding the schema type.
///

#[derive(Clone, Debug)]
pub enum FieldType {
    String,
    Date,
    Custom(Coercion),
}

impl FieldType {
    pub fn apply(&self, raw: Value) -> Result<Value, CoercionError> {
        match self {
            Self::String => coerce_string(raw),
            Self::Date => builtin::parse_date(raw),
            Self::Custom(coercion) => coercion.apply(raw),
        }
    }
}

fn coerce_string(raw: Value) -> Result<Value, CoercionError> {
    match raw {
        Value::Null | Value::Text(_) => Ok(raw),
        Value::Number(n) => Ok(Value::Text(n.to_string())),
        Value::Bool(b) => Ok(Value::Text(b.to_string())),
        Value::Date(_) => builtin::format_date(&raw).map(Value::Text),
        other => Err(CoercionError::custom(format!(
            "cannot coerce {} to string",
            other.kind_name()
        ))),
    }
}

///
/// DefaultValue
///

#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    #[must_use]
    pub fn produce(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Factory(factory) => factory(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

///
/// Condition
/// A flag that is either fixed or computed from the whole raw input.
///

#[derive(Clone)]
pub enum Condition {
    Always(bool),
    When(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
}

impl Condition {
    #[must_use]
    pub fn eval(&self, raw: &Value) -> bool {
        match self {
            Self::Always(flag) => *flag,
            Self::When(predicate) => predicate(raw),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always(flag) => f.debug_tuple("Always").field(flag).finish(),
            Self::When(_) => f.write_str("When(..)"),
        }
    }
}

///
/// VirtualRef
/// A field populated from another model by matching keys, never stored.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VirtualRef {
    pub ref_model: String,
    pub local_field: String,
    pub foreign_field: String,
    pub just_one: bool,
    pub count: bool,
}

///
/// FieldOptions
///
/// Per-field annotation. Every key is optional so that two annotations can
/// be overlaid key by key; keys this crate does not interpret go in `extra`.
///

#[derive(Clone, Debug, Default)]
pub struct FieldOptions {
    pub ty: Option<FieldType>,
    pub default: Option<DefaultValue>,
    pub level: Option<Level>,
    pub pass_level_map: Option<PassLevelMap>,
    pub populate_level: Option<Level>,
    pub readonly: Option<bool>,
    pub autogen: Option<bool>,
    pub no_persist: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub importance: Option<i32>,
    pub required: Option<Condition>,
    pub present: Option<Condition>,
    pub reference: Option<bool>,
    pub model: Option<String>,
    pub virtual_ref: Option<VirtualRef>,
    pub getter: Option<bool>,
    pub setter: Option<bool>,
    pub resolver: Option<Resolver>,
    pub extra: BTreeMap<String, JsonValue>,
}

impl FieldOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn pass_level_map(mut self, map: PassLevelMap) -> Self {
        self.pass_level_map = Some(map);
        self
    }

    #[must_use]
    pub const fn populate_level(mut self, level: Level) -> Self {
        self.populate_level = Some(level);
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    #[must_use]
    pub fn default_with<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Factory(Arc::new(factory)));
        self
    }

    #[must_use]
    pub fn ty(mut self, ty: FieldType) -> Self {
        self.ty = Some(ty);
        self
    }

    #[must_use]
    pub fn coerce<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, CoercionError> + Send + Sync + 'static,
    {
        self.ty(FieldType::Custom(Coercion::new(f)))
    }

    #[must_use]
    pub const fn importance(mut self, importance: i32) -> Self {
        self.importance = Some(importance);
        self
    }

    /// This annotation wins the field merge regardless of class precedence.
    #[must_use]
    pub const fn important(self) -> Self {
        self.importance(IMPORTANT)
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(Condition::Always(required));
        self
    }

    #[must_use]
    pub fn required_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.required = Some(Condition::When(Arc::new(predicate)));
        self
    }

    #[must_use]
    pub fn present_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.present = Some(Condition::When(Arc::new(predicate)));
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag.into());
        self
    }

    #[must_use]
    pub const fn readonly(mut self) -> Self {
        self.readonly = Some(true);
        self
    }

    #[must_use]
    pub const fn autogen(mut self) -> Self {
        self.autogen = Some(true);
        self
    }

    #[must_use]
    pub const fn no_persist(mut self) -> Self {
        self.no_persist = Some(true);
        self
    }

    #[must_use]
    pub const fn reference(mut self) -> Self {
        self.reference = Some(true);
        self
    }

    /// Materialize this field through the named model even when the class
    /// schema does not declare it.
    #[must_use]
    pub fn model(mut self, name: impl Into<String>) -> Self {
        self.model = Some(name.into());
        self
    }

    #[must_use]
    pub fn virtual_ref(
        mut self,
        ref_model: impl Into<String>,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
    ) -> Self {
        self.virtual_ref = Some(VirtualRef {
            ref_model: ref_model.into(),
            local_field: local_field.into(),
            foreign_field: foreign_field.into(),
            just_one: false,
            count: false,
        });
        self
    }

    #[must_use]
    pub const fn getter(mut self) -> Self {
        self.getter = Some(true);
        self
    }

    #[must_use]
    pub const fn setter(mut self) -> Self {
        self.setter = Some(true);
        self
    }

    /// Resolver used when this annotation lands on a field that already
    /// has one.
    #[must_use]
    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Set an uninterpreted key.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.as_ref().is_some_and(|tags| tags.iter().any(|t| t == tag))
    }

    #[must_use]
    pub fn produce_default(&self) -> Option<Value> {
        self.default.as_ref().map(DefaultValue::produce)
    }
}

impl MergeOptions for FieldOptions {
    fn overlay(self, newer: Self) -> Self {
        let mut extra = self.extra;
        extra.extend(newer.extra);

        Self {
            ty: newer.ty.or(self.ty),
            default: newer.default.or(self.default),
            level: newer.level.or(self.level),
            pass_level_map: newer.pass_level_map.or(self.pass_level_map),
            populate_level: newer.populate_level.or(self.populate_level),
            readonly: newer.readonly.or(self.readonly),
            autogen: newer.autogen.or(self.autogen),
            no_persist: newer.no_persist.or(self.no_persist),
            tags: newer.tags.or(self.tags),
            importance: newer.importance.or(self.importance),
            required: newer.required.or(self.required),
            present: newer.present.or(self.present),
            reference: newer.reference.or(self.reference),
            model: newer.model.or(self.model),
            virtual_ref: newer.virtual_ref.or(self.virtual_ref),
            getter: newer.getter.or(self.getter),
            setter: newer.setter.or(self.setter),
            resolver: newer.resolver.or(self.resolver),
            extra,
        }
    }

    fn concat_list(&mut self, key: &str, front: &Self, back: &Self) {
        match key {
            "tags" => self.tags = concat_vecs(front.tags.as_ref(), back.tags.as_ref()),
            _ => concat_extra(&mut self.extra, key, &front.extra, &back.extra),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level;

    #[test]
    fn overlay_prefers_newer_keys() {
        let base = FieldOptions::new().level(level::DETAIL).tag("a");
        let newer = FieldOptions::new().readonly();

        let merged = base.overlay(newer);

        assert_eq!(merged.level, Some(level::DETAIL));
        assert_eq!(merged.readonly, Some(true));
        assert!(merged.has_tag("a"));
    }

    #[test]
    fn concat_resolver_joins_tags() {
        let base = FieldOptions::new().tag("a");
        let newer = FieldOptions::new().tag("b");

        let merged = Resolver::concat("tags").resolve(base.clone(), newer.clone());
        assert_eq!(merged.tags, Some(vec!["b".to_string(), "a".to_string()]));

        let merged = Resolver::reverse_concat("tags").resolve(base, newer);
        assert_eq!(merged.tags, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn concat_resolver_joins_extra_lists() {
        let base = FieldOptions::new().set("hooks", serde_json::json!(["x"]));
        let newer = FieldOptions::new().set("hooks", serde_json::json!(["y"]));

        let merged = Resolver::concat("hooks").resolve(base, newer);

        assert_eq!(merged.extra.get("hooks"), Some(&serde_json::json!(["y", "x"])));
    }

    #[test]
    fn default_factory_runs_each_time() {
        let options = FieldOptions::new().default_with(|| Value::list([1, 2]));

        assert_eq!(options.produce_default(), Some(Value::list([1, 2])));
        assert_eq!(FieldOptions::new().produce_default(), None);
    }

    #[test]
    fn string_type_stringifies_scalars() {
        assert_eq!(FieldType::String.apply(Value::from(42)).ok(), Some(Value::from("42")));
        assert_eq!(FieldType::String.apply(Value::Bool(true)).ok(), Some(Value::from("true")));
        assert!(FieldType::String.apply(Value::list([1])).is_err());
    }

    #[test]
    fn required_condition_sees_raw_input() {
        let options = FieldOptions::new().required_when(|raw| raw.get("strict").is_some());
        let condition = options.required.expect("condition");

        assert!(condition.eval(&Value::object([("strict", true)])));
        assert!(!condition.eval(&Value::object([("other", true)])));
    }
}
