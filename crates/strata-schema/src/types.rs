use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// Modifier
/// Declared visibility of a property.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[remain::sorted]
pub enum Modifier {
    #[display("PRIVATE")]
    Private,
    #[display("PROTECTED")]
    Protected,
    #[default]
    #[display("PUBLIC")]
    Public,
}

///
/// Primitive
/// Primitive type names a schema provider may emit. `Method` marks a
/// property that is a plain function on the class rather than data.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[remain::sorted]
pub enum Primitive {
    #[display("any")]
    Any,
    #[display("bigint")]
    Bigint,
    #[display("boolean")]
    Boolean,
    #[display("method")]
    Method,
    #[display("null")]
    Null,
    #[display("number")]
    Number,
    #[display("object")]
    Object,
    #[display("string")]
    String,
    #[display("symbol")]
    Symbol,
    #[display("undefined")]
    Undefined,
    #[display("unknown")]
    Unknown,
    #[display("void")]
    Void,
}

impl Primitive {
    /// Parse a provider-emitted primitive name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let primitive = match name {
            "any" => Self::Any,
            "bigint" => Self::Bigint,
            "boolean" => Self::Boolean,
            "method" => Self::Method,
            "null" => Self::Null,
            "number" => Self::Number,
            "object" => Self::Object,
            "string" => Self::String,
            "symbol" => Self::Symbol,
            "undefined" => Self::Undefined,
            "unknown" => Self::Unknown,
            "void" => Self::Void,
            _ => return None,
        };

        Some(primitive)
    }

    /// Primitives that carry a type-appropriate zero value when a required
    /// field is missing from the input.
    #[must_use]
    pub const fn has_zero_value(self) -> bool {
        matches!(self, Self::Number | Self::String)
    }

    #[must_use]
    pub const fn is_method(self) -> bool {
        matches!(self, Self::Method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_names_round_trip_through_display() {
        for name in ["any", "boolean", "method", "number", "string", "void"] {
            let primitive = Primitive::from_name(name).expect("known primitive");
            assert_eq!(primitive.to_string(), name);
        }

        assert!(Primitive::from_name("String").is_none());
    }

    #[test]
    fn modifier_uses_provider_spelling() {
        let modifier: Modifier = serde_json::from_str("\"PROTECTED\"").unwrap();

        assert_eq!(modifier, Modifier::Protected);
        assert_eq!(Modifier::default().to_string(), "PUBLIC");
    }
}
