use crate::{
    Error, builtin,
    model::{ClassId, ClassRef, CustomType, EnumDef, ModelClass, ModelDescriptor},
};
use parking_lot::RwLock;
use std::{collections::HashMap, fmt, sync::Arc};
use strata_schema::{
    error::ErrorTree,
    node::Schema,
    validate::{naming::validate_model_name, validate_schema},
};
use tracing::debug;

///
/// ModelKey
/// Lookup key: a registered name (case-insensitive) or a class.
///

#[derive(Clone, Copy)]
pub enum ModelKey<'a> {
    Name(&'a str),
    Class(&'a ModelClass),
}

impl<'a> From<&'a str> for ModelKey<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for ModelKey<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a ModelClass> for ModelKey<'a> {
    fn from(class: &'a ModelClass) -> Self {
        Self::Class(class)
    }
}

impl<'a> From<&'a ClassRef> for ModelKey<'a> {
    fn from(class: &'a ClassRef) -> Self {
        Self::Class(class)
    }
}

impl fmt::Display for ModelKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Class(class) => f.write_str(class.name()),
        }
    }
}

///
/// Provided
/// What a caller can hand to [`Registry::provide`].
///

pub enum Provided {
    Model(ClassRef),
    Enum(EnumDef),
    Custom(CustomType),
}

///
/// Registry
///
/// Maps registered names to model descriptors. Lookups by name ignore
/// case; lookups by class use the class identity recorded at
/// registration.
///

#[derive(Default)]
pub struct Registry {
    models: RwLock<HashMap<String, Arc<ModelDescriptor>>>,
    names: RwLock<HashMap<ClassId, String>>,
    discriminators: RwLock<HashMap<ClassId, Vec<String>>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with `ID`, `Date`, `Email` and `UUID` already provided.
    pub fn with_builtin_types() -> Result<Self, Error> {
        let registry = Self::new();
        builtin::install(&registry)?;

        Ok(registry)
    }

    /// Register `class` under `name`.
    pub fn register(&self, name: &str, class: &ClassRef) -> Result<(), Error> {
        let mut errors = ErrorTree::new();
        if let Err(msg) = validate_model_name(name) {
            errors.add(msg);
        }
        if let Some(schema) = class.schema()
            && let Err(tree) = validate_schema(schema)
        {
            errors.merge_for("schema", tree);
        }
        errors.result().map_err(|errors| Error::InvalidSchema {
            name: name.to_string(),
            errors,
        })?;

        {
            let mut models = self.models.write();
            let mut names = self.names.write();
            let key = name.to_lowercase();
            if models.contains_key(&key) {
                return Err(Error::DuplicateRegistration {
                    name: name.to_string(),
                });
            }
            // a class maps to exactly one name, or lookup by class is ambiguous
            if let Some(existing) = names.get(&class.id()) {
                return Err(Error::ClassAlreadyRegistered {
                    name: name.to_string(),
                    existing: existing.clone(),
                });
            }
            models.insert(
                key,
                Arc::new(ModelDescriptor::new(name.to_string(), Arc::clone(class))),
            );
            names.insert(class.id(), name.to_string());
        }

        // ancestors carrying a discriminator key learn about this subclass
        let mut discriminators = self.discriminators.write();
        for ancestor in class.ancestors() {
            if ancestor.discriminator_key().is_some() {
                discriminators
                    .entry(ancestor.id())
                    .or_default()
                    .push(name.to_string());
            }
        }

        debug!(model = name, class = class.name(), id = %class.id(), "registered model");

        Ok(())
    }

    /// Register a class under its own name.
    pub fn register_class(&self, class: &ClassRef) -> Result<(), Error> {
        self.register(class.name(), class)
    }

    /// Wrap and register a model, enum or custom type. `extra_schema`
    /// describes enum and custom types; models carry their schema from the
    /// class builder.
    pub fn provide(
        &self,
        provided: Provided,
        extra_schema: Option<Schema>,
        name: Option<&str>,
    ) -> Result<ClassRef, Error> {
        let class = match provided {
            Provided::Model(class) => {
                if extra_schema.is_some() {
                    return Err(Error::InvalidSchema {
                        name: class.name().to_string(),
                        errors: ErrorTree::from("models take their schema from the class builder"),
                    });
                }
                class
            }
            Provided::Enum(def) => ModelClass::enumeration(def, extra_schema),
            Provided::Custom(custom) => ModelClass::custom(custom, extra_schema),
        };

        let name = name.unwrap_or_else(|| class.name()).to_string();
        self.register(&name, &class)?;

        Ok(class)
    }

    #[must_use]
    pub fn has_metadata<'a>(&self, key: impl Into<ModelKey<'a>>) -> bool {
        self.lookup(key.into()).is_some()
    }

    /// Descriptor for `key`, with its combined fields resolved.
    pub fn get_metadata<'a>(&self, key: impl Into<ModelKey<'a>>) -> Result<Arc<ModelDescriptor>, Error> {
        let key = key.into();
        let descriptor = self.lookup(key).ok_or_else(|| Error::MetadataNotFound {
            key: key.to_string(),
        })?;

        if let Some(children) = self.discriminators.read().get(&descriptor.class().id()) {
            descriptor.sync_children(children);
        }
        descriptor.resolve(self)?;

        Ok(descriptor)
    }

    /// Name a class was registered under.
    #[must_use]
    pub fn registered_name(&self, class: &ModelClass) -> Option<String> {
        self.names.read().get(&class.id()).cloned()
    }

    /// Registered names, sorted case-insensitively.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .models
            .read()
            .values()
            .map(|descriptor| descriptor.name().to_string())
            .collect();
        names.sort_by_key(|name| name.to_lowercase());

        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }

    /// Drop every registration.
    pub fn reset(&self) {
        let count = {
            let mut models = self.models.write();
            let count = models.len();
            models.clear();
            count
        };
        self.names.write().clear();
        self.discriminators.write().clear();

        debug!(count, "registry reset");
    }

    fn lookup(&self, key: ModelKey<'_>) -> Option<Arc<ModelDescriptor>> {
        let name = match key {
            ModelKey::Name(name) => name.to_lowercase(),
            ModelKey::Class(class) => self.names.read().get(&class.id())?.to_lowercase(),
        };

        self.models.read().get(&name).cloned()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("models", &self.names())
            .finish_non_exhaustive()
    }
}

///
/// TESTS
///
