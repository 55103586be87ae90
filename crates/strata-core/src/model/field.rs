use crate::{
    level::{self, Level},
    model::{Behavior, ClassRef},
    options::{FieldOptions, FieldType},
    value::Value,
};
use std::{fmt, sync::Arc};
use strata_schema::{
    node::{DATE_TYPE, ID_TYPE, MAP_TYPE, Property, REF_TYPE, Type},
    types::Primitive,
};

///
/// TypeClass
///
/// Shape of a declared property type, computed once per field so the
/// traversal engines can branch without re-inspecting the schema.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeClass {
    Untyped,
    Method,
    Primitive(Primitive),
    Named(String),
    Ref(Box<Self>),
    Map(Box<Self>),
    Array(Box<Self>),
    Structural(Type),
}

impl TypeClass {
    #[must_use]
    pub fn classify(ty: Option<&Type>) -> Self {
        let Some(ty) = ty else {
            return Self::Untyped;
        };

        match ty {
            Type::Primitive(Primitive::Method) => Self::Method,
            Type::Primitive(primitive) => Self::Primitive(*primitive),
            Type::Reference { name } => Self::Named(name.clone()),
            Type::Array { element } => Self::Array(Box::new(Self::classify(Some(element)))),
            Type::Parameterized {
                self_type,
                argument,
            } if self_type == REF_TYPE => Self::Ref(Box::new(Self::classify(Some(argument)))),
            Type::Parameterized {
                self_type,
                argument,
            } if self_type == MAP_TYPE => Self::Map(Box::new(Self::classify(Some(argument)))),
            other => Self::Structural(other.clone()),
        }
    }

    /// Element class for arrays, the class itself otherwise.
    #[must_use]
    pub fn element(&self) -> &Self {
        match self {
            Self::Array(inner) => inner.as_ref(),
            other => other,
        }
    }

    /// The class a value of this field is ultimately typed by: array
    /// elements, then the argument of `Ref`/`MMap`.
    #[must_use]
    pub fn target(&self) -> &Self {
        match self.element() {
            Self::Ref(inner) | Self::Map(inner) => inner.as_ref(),
            other => other,
        }
    }

    /// Registry name the field points at, if any.
    #[must_use]
    pub fn referenced_name(&self) -> Option<&str> {
        match self.target() {
            Self::Named(name) => Some(name),
            _ => None,
        }
    }
}

///
/// FieldDescriptor
///
/// Combined metadata for one field of a class: the schema property, the
/// accessor behavior, the annotation, and the class that contributed them.
///

#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    prop: Option<Property>,
    accessor: Option<Behavior>,
    options: Option<FieldOptions>,
    source: Option<ClassRef>,
    class: TypeClass,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        prop: Option<Property>,
        accessor: Option<Behavior>,
        options: Option<FieldOptions>,
        source: Option<ClassRef>,
    ) -> Self {
        let class = TypeClass::classify(prop.as_ref().and_then(|p| p.ty.as_ref()));

        Self {
            name: name.into(),
            prop,
            accessor,
            options,
            source,
            class,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn prop(&self) -> Option<&Property> {
        self.prop.as_ref()
    }

    #[must_use]
    pub const fn accessor(&self) -> Option<&Behavior> {
        self.accessor.as_ref()
    }

    #[must_use]
    pub const fn options(&self) -> Option<&FieldOptions> {
        self.options.as_ref()
    }

    /// Class that declared this field.
    #[must_use]
    pub const fn source(&self) -> Option<&ClassRef> {
        self.source.as_ref()
    }

    #[must_use]
    pub const fn type_class(&self) -> &TypeClass {
        &self.class
    }

    #[must_use]
    pub fn explicit_type(&self) -> Option<&FieldType> {
        self.options.as_ref()?.ty.as_ref()
    }

    #[must_use]
    pub fn importance(&self) -> Option<i32> {
        self.options.as_ref().and_then(|o| o.importance)
    }

    /// True when `other` carries an importance and `self` carries none or
    /// a lower one.
    #[must_use]
    pub fn is_outranked_by(&self, other: &Self) -> bool {
        match (self.importance(), other.importance()) {
            (None, Some(_)) => true,
            (Some(own), Some(theirs)) => theirs > own,
            (_, None) => false,
        }
    }

    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self.class, TypeClass::Array(_))
    }

    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self.class, TypeClass::Map(_))
    }

    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self.class.element(), TypeClass::Ref(_))
    }

    #[must_use]
    pub fn is_id(&self) -> bool {
        matches!(&self.class, TypeClass::Named(name) if name == ID_TYPE)
    }

    #[must_use]
    pub fn is_id_array(&self) -> bool {
        self.is_array() && matches!(self.class.element(), TypeClass::Named(name) if name == ID_TYPE)
    }

    #[must_use]
    pub fn is_date(&self) -> bool {
        matches!(self.explicit_type(), Some(FieldType::Date))
            || matches!(&self.class, TypeClass::Named(name) if name == DATE_TYPE)
    }

    #[must_use]
    pub fn is_date_array(&self) -> bool {
        self.is_array() && matches!(self.class.element(), TypeClass::Named(name) if name == DATE_TYPE)
    }

    #[must_use]
    pub fn is_method(&self) -> bool {
        match &self.prop {
            Some(_) => matches!(self.class, TypeClass::Method),
            None => self.accessor.as_ref().is_some_and(Behavior::is_method),
        }
    }

    #[must_use]
    pub fn is_getter(&self) -> bool {
        self.options
            .as_ref()
            .and_then(|o| o.getter)
            .or_else(|| self.prop.as_ref().and_then(|p| p.getter))
            .unwrap_or_else(|| self.accessor.as_ref().is_some_and(|a| a.getter().is_some()))
    }

    #[must_use]
    pub fn is_setter(&self) -> bool {
        self.options
            .as_ref()
            .and_then(|o| o.setter)
            .or_else(|| self.prop.as_ref().and_then(|p| p.setter))
            .unwrap_or_else(|| self.accessor.as_ref().is_some_and(|a| a.setter().is_some()))
    }

    #[must_use]
    pub fn is_virtual_reference(&self) -> bool {
        self.options.as_ref().is_some_and(|o| o.virtual_ref.is_some())
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        self.prop.as_ref().is_none_or(Property::is_public)
    }

    /// Fields without a schema property are treated as optional.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.prop.as_ref().is_none_or(|p| p.optional)
    }

    /// Materialization writes only data fields the caller may set.
    #[must_use]
    pub fn is_assignable(&self) -> bool {
        !self.is_method() && (!self.is_getter() || self.is_setter()) && self.is_public()
    }

    /// Required flag, possibly computed from the whole raw input.
    #[must_use]
    pub fn is_required(&self, raw: &Value) -> bool {
        match self.options.as_ref().and_then(|o| o.required.as_ref()) {
            Some(condition) => condition.eval(raw),
            None => !self.is_optional(),
        }
    }

    #[must_use]
    pub fn is_present(&self, raw: &Value) -> bool {
        self.options
            .as_ref()
            .and_then(|o| o.present.as_ref())
            .is_none_or(|condition| condition.eval(raw))
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.options.as_ref().is_some_and(|o| o.has_tag(tag))
    }

    #[must_use]
    pub fn has_no_tags(&self) -> bool {
        self.options
            .as_ref()
            .and_then(|o| o.tags.as_ref())
            .is_none_or(Vec::is_empty)
    }

    /// Projection level. Getters without an explicit level are never
    /// projected.
    #[must_use]
    pub fn level(&self) -> Option<Level> {
        let level = self.options.as_ref().and_then(|o| o.level);

        if self.is_getter() {
            Some(level.unwrap_or(level::NEVER))
        } else {
            level
        }
    }

    /// Level handed to a nested projection.
    #[must_use]
    pub fn pass_level(&self, level: Level) -> Level {
        self.options
            .as_ref()
            .and_then(|o| o.pass_level_map.as_ref())
            .and_then(|map| map.get(&level).copied())
            .unwrap_or(level)
    }

    /// Zero value for a missing required primitive.
    #[must_use]
    pub fn zero_value(&self) -> Option<Value> {
        match self.class {
            TypeClass::Primitive(Primitive::String) => Some(Value::Text(String::new())),
            TypeClass::Primitive(Primitive::Number) => Some(Value::Number(0.into())),
            _ => None,
        }
    }

    #[must_use]
    pub fn default_value(&self) -> Option<Value> {
        self.options.as_ref()?.produce_default()
    }

    /// Combine two descriptors of the same field. `self` wins unless it is
    /// outranked by `other`; the loser only fills parts the winner lacks.
    /// Annotations are taken whole, never mixed key by key.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let (winner, loser) = if self.is_outranked_by(other) {
            (other, self)
        } else {
            (self, other)
        };

        Self::new(
            winner.name.clone(),
            winner.prop.clone().or_else(|| loser.prop.clone()),
            winner.accessor.clone().or_else(|| loser.accessor.clone()),
            winner.options.clone().or_else(|| loser.options.clone()),
            winner.source.clone().or_else(|| loser.source.clone()),
        )
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("prop", &self.prop)
            .field("accessor", &self.accessor)
            .field("options", &self.options)
            .field("source", &self.source.as_ref().map(|c| c.name()))
            .field("class", &self.class)
            .finish()
    }
}

///
/// FieldMap
/// Ordered field descriptors of one class.
///

#[derive(Clone, Debug, Default)]
pub struct FieldMap {
    entries: Vec<Arc<FieldDescriptor>>,
}

impl FieldMap {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<FieldDescriptor>> {
        self.entries.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<FieldDescriptor>> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|field| field.name())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, field: FieldDescriptor) {
        self.entries.push(Arc::new(field));
    }

    /// Fold a lower-precedence descriptor in: merged when the name exists,
    /// appended otherwise.
    pub(crate) fn merge_in(&mut self, lower: &Arc<FieldDescriptor>) {
        match self.entries.iter_mut().find(|field| field.name == lower.name) {
            Some(existing) => *existing = Arc::new(existing.merge(lower)),
            None => self.entries.push(Arc::clone(lower)),
        }
    }
}

impl<'a> IntoIterator for &'a FieldMap {
    type Item = &'a Arc<FieldDescriptor>;
    type IntoIter = std::slice::Iter<'a, Arc<FieldDescriptor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

///
/// TESTS
///
