use crate::{
    model::{Behavior, ModelClass, ModelDescriptor},
    project::ProjectOptions,
    registry::Registry,
    value::Value,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::{collections::BTreeMap, fmt, sync::Arc};

///
/// Attachment
/// Where a nested instance sits inside its parent.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Attachment {
    /// Name of the model that owns the field.
    pub parent: Option<String>,
    /// Field name on the parent.
    pub path: Option<String>,
    pub is_array: bool,
    pub index: Option<usize>,
}

///
/// Instance
///
/// A materialized value of a registered model. Field storage is keyed by
/// field name; reads and writes go through the class behaviors when the
/// field has an accessor.
///

#[derive(Clone)]
pub struct Instance {
    descriptor: Arc<ModelDescriptor>,
    fields: BTreeMap<String, Value>,
    attachment: Option<Attachment>,
}

impl Instance {
    #[must_use]
    pub const fn new(descriptor: Arc<ModelDescriptor>) -> Self {
        Self {
            descriptor,
            fields: BTreeMap::new(),
            attachment: None,
        }
    }

    #[must_use]
    pub const fn descriptor(&self) -> &Arc<ModelDescriptor> {
        &self.descriptor
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        self.descriptor.name()
    }

    /// True when this instance's class is `class` or inherits from it.
    #[must_use]
    pub fn is_instance_of(&self, class: &ModelClass) -> bool {
        self.descriptor.class().is_kind_of(class)
    }

    /// Stored value, bypassing getters.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Read a field, preferring a getter behavior over storage.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.descriptor.behaviors().get(name).and_then(Behavior::getter) {
            Some(getter) => Some(getter(self)),
            None => self.fields.get(name).cloned(),
        }
    }

    /// Write a field, going through a setter behavior when one exists.
    pub fn set(&mut self, name: &str, value: Value) {
        let setter = self
            .descriptor
            .behaviors()
            .get(name)
            .and_then(Behavior::setter)
            .cloned();

        match setter {
            Some(setter) => setter(self, value),
            None => self.store(name, value),
        }
    }

    /// Write storage directly. Setters use this for their backing field.
    pub fn store(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Invoke a method behavior.
    #[must_use]
    pub fn call(&self, name: &str, args: &[Value]) -> Option<Value> {
        match self.descriptor.behaviors().get(name)? {
            Behavior::Method(method) => Some(method(self, args)),
            Behavior::Accessor { .. } => None,
        }
    }

    #[must_use]
    pub const fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub(crate) fn attach(&mut self, attachment: Attachment) {
        self.attachment = Some(attachment);
    }

    /// Project this instance through its own descriptor.
    #[must_use]
    pub fn to_object(&self, registry: &Registry, options: &ProjectOptions) -> JsonValue {
        self.descriptor
            .project_instance(registry, self, options)
    }

    /// Default serialization: a projection with no explicit level.
    #[must_use]
    pub fn to_json(&self, registry: &Registry) -> JsonValue {
        self.to_object(registry, &ProjectOptions::default())
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.class().id() == other.descriptor.class().id() && self.fields == other.fields
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("model", &self.descriptor.name())
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
