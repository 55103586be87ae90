use crate::{node::Property, types::Primitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameterized self type marking a "bare identifier or embedded model"
/// reference field.
pub const REF_TYPE: &str = "Ref";

/// Parameterized self type marking a string-keyed map field.
pub const MAP_TYPE: &str = "MMap";

/// Reference name of the identifier type.
pub const ID_TYPE: &str = "ID";

/// Reference name of the date type.
pub const DATE_TYPE: &str = "Date";

///
/// Type
///
/// Closed union of the structural types a schema provider can emit. The
/// serde shape matches the provider's JSON: primitives are bare strings and
/// every other variant is an object with distinct keys.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Type {
    Primitive(Primitive),

    Array {
        #[serde(rename = "arrayElementType")]
        element: Box<Self>,
    },

    Reference {
        #[serde(rename = "referenceName")]
        name: String,
    },

    Parameterized {
        #[serde(rename = "selfType")]
        self_type: String,
        #[serde(rename = "typeArgumentType")]
        argument: Box<Self>,
    },

    Generic {
        #[serde(rename = "genericParameterName")]
        parameter_name: String,
        #[serde(rename = "genericParameterType")]
        parameter_type: Box<Self>,
    },

    Literal {
        props: Vec<Property>,
    },

    Union {
        union: Vec<Self>,
    },
}

impl Type {
    #[must_use]
    pub const fn string() -> Self {
        Self::Primitive(Primitive::String)
    }

    #[must_use]
    pub const fn number() -> Self {
        Self::Primitive(Primitive::Number)
    }

    #[must_use]
    pub const fn boolean() -> Self {
        Self::Primitive(Primitive::Boolean)
    }

    #[must_use]
    pub fn array(element: Self) -> Self {
        Self::Array {
            element: Box::new(element),
        }
    }

    #[must_use]
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference { name: name.into() }
    }

    #[must_use]
    pub fn parameterized(self_type: impl Into<String>, argument: Self) -> Self {
        Self::Parameterized {
            self_type: self_type.into(),
            argument: Box::new(argument),
        }
    }

    /// `Ref<name>`: may hold a bare identifier or an embedded instance.
    #[must_use]
    pub fn model_ref(name: impl Into<String>) -> Self {
        Self::parameterized(REF_TYPE, Self::reference(name))
    }

    /// `MMap<value>`: string-keyed map.
    #[must_use]
    pub fn map_of(value: Self) -> Self {
        Self::parameterized(MAP_TYPE, value)
    }

    #[must_use]
    pub const fn union(types: Vec<Self>) -> Self {
        Self::Union { union: types }
    }

    #[must_use]
    pub const fn literal(props: Vec<Property>) -> Self {
        Self::Literal { props }
    }

    #[must_use]
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            Self::Reference { name } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Array { element } => write!(f, "{element}[]"),
            Self::Reference { name } => f.write_str(name),
            Self::Parameterized {
                self_type,
                argument,
            } => write!(f, "{self_type}<{argument}>"),
            Self::Generic { parameter_name, .. } => f.write_str(parameter_name),
            Self::Literal { props } => {
                f.write_str("{ ")?;
                for prop in props {
                    let optional = if prop.optional { "?" } else { "" };
                    match &prop.ty {
                        Some(ty) => write!(f, "{}{optional}: {ty}; ", prop.name)?,
                        None => write!(f, "{}{optional}; ", prop.name)?,
                    }
                }
                f.write_str("}")
            }
            Self::Union { union } => {
                for (i, ty) in union.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{ty}")?;
                }
                Ok(())
            }
        }
    }
}
