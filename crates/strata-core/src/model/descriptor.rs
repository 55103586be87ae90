use crate::{
    Error,
    model::{
        BehaviorTable, ClassKind, ClassRef, CustomType, EnumDef, FieldDescriptor, FieldMap,
    },
    options::{ConfigOptions, FieldOptions},
    registry::Registry,
};
use parking_lot::RwLock;
use std::{
    collections::BTreeSet,
    fmt,
    sync::{Arc, OnceLock},
};
use tracing::debug;

static EMPTY_FIELDS: FieldMap = FieldMap::new();
static EMPTY_BEHAVIORS: BehaviorTable = BehaviorTable::new();

///
/// Resolution
/// Everything derived from the class hierarchy, computed on first lookup.
///

struct Resolution {
    config: ConfigOptions,
    fields: FieldMap,
    behaviors: BehaviorTable,
}

///
/// ModelDescriptor
///
/// Registry entry for one class. The combined field map and behavior table
/// depend on ancestors that may be registered later, so they are computed
/// on the first lookup and memoized.
///

pub struct ModelDescriptor {
    name: String,
    class: ClassRef,
    children: RwLock<Vec<String>>,
    resolution: OnceLock<Resolution>,
}

impl ModelDescriptor {
    pub(crate) fn new(name: String, class: ClassRef) -> Self {
        Self {
            name,
            class,
            children: RwLock::new(Vec::new()),
            resolution: OnceLock::new(),
        }
    }

    /// Registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn class(&self) -> &ClassRef {
        &self.class
    }

    #[must_use]
    pub fn kind(&self) -> &ClassKind {
        self.class.kind()
    }

    #[must_use]
    pub fn superclass(&self) -> Option<&ClassRef> {
        self.class.superclass()
    }

    #[must_use]
    pub fn enum_def(&self) -> Option<&EnumDef> {
        match self.kind() {
            ClassKind::Enum(def) => Some(def),
            _ => None,
        }
    }

    #[must_use]
    pub fn custom_type(&self) -> Option<&CustomType> {
        match self.kind() {
            ClassKind::Custom(custom) => Some(custom),
            _ => None,
        }
    }

    /// Effective config. The discriminator key is inherited once resolved.
    #[must_use]
    pub fn config(&self) -> &ConfigOptions {
        self.resolution
            .get()
            .map_or_else(|| self.class.config(), |r| &r.config)
    }

    #[must_use]
    pub fn discriminator_key(&self) -> Option<&str> {
        self.config().discriminator_key.as_deref()
    }

    /// Names registered as subclasses of this class while it carried a
    /// discriminator key.
    #[must_use]
    pub fn discriminator_children(&self) -> Vec<String> {
        self.children.read().clone()
    }

    pub(crate) fn sync_children(&self, names: &[String]) {
        let mut children = self.children.write();
        if children.len() != names.len() {
            *children = names.to_vec();
        }
    }

    /// Own annotations, before merging.
    #[must_use]
    pub fn annotations(&self) -> &[(String, FieldOptions)] {
        self.class.annotations()
    }

    #[must_use]
    pub fn fields(&self) -> &FieldMap {
        self.resolution.get().map_or(&EMPTY_FIELDS, |r| &r.fields)
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Arc<FieldDescriptor>> {
        self.fields().get(name)
    }

    #[must_use]
    pub fn behaviors(&self) -> &BehaviorTable {
        self.resolution.get().map_or(&EMPTY_BEHAVIORS, |r| &r.behaviors)
    }

    #[must_use]
    pub fn classes(&self) -> Vec<ClassRef> {
        self.class.classes()
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolution.get().is_some()
    }

    pub(crate) fn resolve(&self, registry: &Registry) -> Result<(), Error> {
        if self.is_resolved() {
            return Ok(());
        }

        let resolution = self.build_resolution(registry)?;
        debug!(
            model = %self.name,
            fields = resolution.fields.len(),
            behaviors = resolution.behaviors.len(),
            "resolved model metadata"
        );

        // a concurrent resolver computed the same thing
        let _ = self.resolution.set(resolution);

        Ok(())
    }

    fn build_resolution(&self, registry: &Registry) -> Result<Resolution, Error> {
        let class = &self.class;

        let mut config = class.config().clone();
        if config.discriminator_key.is_none() {
            config.discriminator_key = class.discriminator_key().map(str::to_string);
        }

        // own fields: schema properties first, then annotation-only names
        let mut names: Vec<&str> = Vec::new();
        let mut seen = BTreeSet::new();
        let props = class.schema().map(|s| s.props.as_slice()).unwrap_or_default();

        for name in props
            .iter()
            .map(|p| p.name.as_str())
            .chain(class.annotations().iter().map(|(n, _)| n.as_str()))
        {
            if seen.insert(name) {
                names.push(name);
            }
        }

        let mut fields = FieldMap::new();
        for name in names {
            fields.push(FieldDescriptor::new(
                name,
                props.iter().find(|p| p.name == name).cloned(),
                class.behavior(name).cloned(),
                class.annotation(name).cloned(),
                Some(Arc::clone(class)),
            ));
        }

        let mut sources = Vec::new();
        for source in class.merge_sources() {
            if !source.kind().is_model() {
                continue;
            }
            let descriptor = registry.get_metadata(source)?;
            for field in descriptor.fields() {
                fields.merge_in(field);
            }
            sources.push(descriptor);
        }

        let behaviors = BehaviorTable::compose(
            class.behaviors(),
            sources.iter().map(|descriptor| descriptor.behaviors()),
        );

        Ok(Resolution {
            config,
            fields,
            behaviors,
        })
    }
}

impl fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("name", &self.name)
            .field("class", &self.class.name())
            .field("resolved", &self.is_resolved())
            .field("fields", &self.fields().names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use crate::{
        level,
        model::{ModelClass, TypeClass},
        options::FieldOptions,
        registry::Registry,
        test_fixtures,
        value::Value,
    };
    use strata_schema::{
        node::{Property, Schema, Type},
        types::Primitive,
    };

    #[test]
    fn own_fields_come_first_in_schema_order() {
        let registry = Registry::new();
        let user = test_fixtures::register_user(&registry);

        let descriptor = registry.get_metadata(&user).expect("registered");
        let names: Vec<&str> = descriptor.fields().names().collect();

        assert_eq!(names, ["email", "name", "gender", "age"]);
    }

    #[test]
    fn annotation_only_fields_are_appended() {
        let registry = Registry::new();
        let class = ModelClass::builder("Tagged")
            .schema(Schema::new("Tagged").prop(Property::new("a", Type::string())))
            .field("extra", FieldOptions::new().level(level::SHORT))
            .build();
        registry.register("Tagged", &class).expect("register");

        let descriptor = registry.get_metadata("Tagged").expect("registered");
        let extra = descriptor.field("extra").expect("extra");

        assert_eq!(descriptor.fields().names().collect::<Vec<_>>(), ["a", "extra"]);
        assert!(extra.prop().is_none());
        assert_eq!(extra.type_class(), &TypeClass::Untyped);
    }

    #[test]
    fn mixin_fields_fold_in_after_own_fields() {
        let registry = Registry::new();
        let base = ModelClass::builder("Base")
            .schema(
                Schema::new("Base")
                    .prop(Property::new("shared", Type::number()))
                    .prop(Property::new("base", Type::string())),
            )
            .build();
        let mixin = ModelClass::builder("Mixin")
            .schema(
                Schema::new("Mixin")
                    .prop(Property::new("shared", Type::boolean()))
                    .prop(Property::new("mixed", Type::string())),
            )
            .build();
        let leaf = ModelClass::builder("Leaf")
            .extends(&base)
            .mixin(&mixin)
            .schema(Schema::new("Leaf").prop(Property::new("own", Type::string())))
            .build();
        for (name, class) in [("Base", &base), ("Mixin", &mixin), ("Leaf", &leaf)] {
            registry.register(name, class).expect("register");
        }

        let descriptor = registry.get_metadata("Leaf").expect("registered");

        assert_eq!(
            descriptor.fields().names().collect::<Vec<_>>(),
            ["own", "shared", "mixed", "base"]
        );
        assert_eq!(
            descriptor.field("shared").map(|f| f.type_class().clone()),
            Some(TypeClass::Primitive(Primitive::Boolean))
        );
    }

    #[test]
    fn inherited_behaviors_are_visible() {
        let registry = Registry::new();
        let base = ModelClass::builder("Base")
            .method("hello", |_, _| Value::from("base"))
            .build();
        let leaf = ModelClass::builder("Leaf").extends(&base).build();
        registry.register("Base", &base).expect("register");
        registry.register("Leaf", &leaf).expect("register");

        let descriptor = registry.get_metadata("Leaf").expect("registered");

        assert!(descriptor.behaviors().contains("hello"));
        assert!(descriptor.is_resolved());
    }

    #[test]
    fn unregistered_ancestor_fails_resolution() {
        let registry = Registry::new();
        let base = ModelClass::builder("Base").build();
        let leaf = ModelClass::builder("Leaf").extends(&base).build();
        registry.register("Leaf", &leaf).expect("register");

        let err = registry.get_metadata("Leaf").expect_err("base missing");

        assert!(err.is_not_found());
    }

    #[test]
    fn discriminator_key_is_inherited_in_config() {
        let registry = Registry::new();
        test_fixtures::register_events(&registry);

        let mouse = registry.get_metadata("MouseEvent").expect("registered");

        assert_eq!(mouse.discriminator_key(), Some("kind"));
    }
}
