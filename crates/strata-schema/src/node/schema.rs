use crate::{Error, node::Property, validate::validate_schema};
use serde::{Deserialize, Serialize};

///
/// Schema
/// Structural description of one class, as emitted by the schema provider.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Schema {
    pub name: String,

    #[serde(default)]
    pub props: Vec<Property>,
}

impl Schema {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            props: Vec::new(),
        }
    }

    #[must_use]
    pub fn prop(mut self, prop: Property) -> Self {
        self.props.push(prop);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.props.iter().find(|p| p.name == name)
    }

    /// Parse provider JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let schema: Self = serde_json::from_str(json)?;
        validate_schema(&schema).map_err(Error::Validation)?;

        Ok(schema)
    }
}
