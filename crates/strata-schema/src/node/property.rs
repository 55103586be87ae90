use crate::{
    node::Type,
    types::{Modifier, Primitive},
};
use serde::{Deserialize, Serialize};
use std::ops::Not;

///
/// Property
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Property {
    pub name: String,

    #[serde(default)]
    pub optional: bool,

    #[serde(default)]
    pub modifier: Modifier,

    /// `None` when the provider could not express the declared type.
    #[serde(rename = "type", default)]
    pub ty: Option<Type>,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub readonly: bool,

    #[serde(rename = "abstract", default, skip_serializing_if = "Not::not")]
    pub is_abstract: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub getter: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setter: Option<bool>,
}

impl Property {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            optional: false,
            modifier: Modifier::Public,
            ty: Some(ty),
            readonly: false,
            is_abstract: false,
            getter: None,
            setter: None,
        }
    }

    /// A property whose type could not be expressed.
    #[must_use]
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            ty: None,
            ..Self::new(name, Type::Primitive(Primitive::Any))
        }
    }

    #[must_use]
    pub fn method(name: impl Into<String>) -> Self {
        Self::new(name, Type::Primitive(Primitive::Method))
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub const fn modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = modifier;
        self
    }

    #[must_use]
    pub const fn readonly(mut self) -> Self {
        self.readonly = true;
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

    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self.modifier, Modifier::Public)
    }
}
