use crate::{
    level::Level,
    model::{
        Behavior,
        kind::{ClassKind, CustomType, EnumDef},
    },
    options::{ConfigOptions, FieldOptions},
    value::{Instance, Value},
};
use derive_more::Display;
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use strata_schema::node::Schema;

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

///
/// ClassId
/// Process-unique identity of a class, independent of its registered name.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("class#{_0}")]
pub struct ClassId(u64);

impl ClassId {
    fn next() -> Self {
        Self(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }
}

pub type ClassRef = Arc<ModelClass>;

///
/// ModelClass
///
/// Immutable class definition: schema, config, field annotations and
/// behaviors, plus the superclass link. Built once with [`ClassBuilder`]
/// and shared by reference.
///

pub struct ModelClass {
    id: ClassId,
    name: String,
    kind: ClassKind,
    superclass: Option<ClassRef>,
    config: ConfigOptions,
    annotations: Vec<(String, FieldOptions)>,
    behaviors: Vec<(String, Behavior)>,
}

impl ModelClass {
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    pub(crate) fn enumeration(def: EnumDef, schema: Option<Schema>) -> ClassRef {
        let name = def.name().to_string();
        Self::leaf(name, ClassKind::Enum(def), schema)
    }

    pub(crate) fn custom(custom: CustomType, schema: Option<Schema>) -> ClassRef {
        let name = custom.name().to_string();
        Self::leaf(name, ClassKind::Custom(custom), schema)
    }

    fn leaf(name: String, kind: ClassKind, schema: Option<Schema>) -> ClassRef {
        let schema = schema.unwrap_or_else(|| Schema::new(&name));

        Arc::new(Self {
            id: ClassId::next(),
            name,
            kind,
            superclass: None,
            config: ConfigOptions::new().schema(schema),
            annotations: Vec::new(),
            behaviors: Vec::new(),
        })
    }

    #[must_use]
    pub const fn id(&self) -> ClassId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> &ClassKind {
        &self.kind
    }

    #[must_use]
    pub const fn superclass(&self) -> Option<&ClassRef> {
        self.superclass.as_ref()
    }

    #[must_use]
    pub const fn config(&self) -> &ConfigOptions {
        &self.config
    }

    #[must_use]
    pub const fn schema(&self) -> Option<&Schema> {
        self.config.schema.as_ref()
    }

    #[must_use]
    pub fn mixins(&self) -> &[ClassRef] {
        self.config.mixins()
    }

    /// Own field annotations in declaration order.
    #[must_use]
    pub fn annotations(&self) -> &[(String, FieldOptions)] {
        &self.annotations
    }

    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&FieldOptions> {
        self.annotations
            .iter()
            .find_map(|(n, options)| (n == name).then_some(options))
    }

    /// Own behaviors, not including anything inherited.
    #[must_use]
    pub fn behaviors(&self) -> &[(String, Behavior)] {
        &self.behaviors
    }

    #[must_use]
    pub fn behavior(&self, name: &str) -> Option<&Behavior> {
        self.behaviors
            .iter()
            .find_map(|(n, behavior)| (n == name).then_some(behavior))
    }

    /// Superclass chain, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &ClassRef> {
        std::iter::successors(self.superclass.as_ref(), |class| class.superclass.as_ref())
    }

    /// Classes whose fields fold into this one, highest precedence first:
    /// mixins in declaration order, then the superclass.
    pub fn merge_sources(&self) -> impl Iterator<Item = &ClassRef> {
        self.mixins().iter().chain(self.superclass.as_ref())
    }

    /// True for this class and anything that inherits from it.
    #[must_use]
    pub fn is_kind_of(&self, other: &Self) -> bool {
        self.id == other.id || self.ancestors().any(|class| class.id == other.id)
    }

    /// Discriminator key from this class or the nearest ancestor that sets one.
    #[must_use]
    pub fn discriminator_key(&self) -> Option<&str> {
        self.config
            .discriminator_key
            .as_deref()
            .or_else(|| self.ancestors().find_map(|c| c.config.discriminator_key.as_deref()))
    }

    /// Flattened class list: superclass lineage, this class, then each
    /// mixin's lineage, without duplicates.
    #[must_use]
    pub fn classes(self: &Arc<Self>) -> Vec<ClassRef> {
        let mut out = Vec::new();
        self.collect_classes(&mut out);
        out
    }

    fn collect_classes(self: &Arc<Self>, out: &mut Vec<ClassRef>) {
        if let Some(superclass) = &self.superclass {
            superclass.collect_classes(out);
        }
        if !out.iter().any(|class| class.id == self.id) {
            out.push(Arc::clone(self));
        }
        for mixin in self.mixins() {
            mixin.collect_classes(out);
        }
    }
}

impl fmt::Debug for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClass")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("superclass", &self.superclass.as_ref().map(|c| c.name()))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

///
/// ClassBuilder
///
/// Applies config and field annotations in order. Repeated config records
/// and repeated annotations for the same field are combined with the
/// resolver carried by the newer record (shallow overwrite by default).
///

pub struct ClassBuilder {
    name: String,
    superclass: Option<ClassRef>,
    config: Option<ConfigOptions>,
    annotations: Vec<(String, FieldOptions)>,
    behaviors: Vec<(String, Behavior)>,
}

impl ClassBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            config: None,
            annotations: Vec::new(),
            behaviors: Vec::new(),
        }
    }

    #[must_use]
    pub fn extends(mut self, superclass: &ClassRef) -> Self {
        self.superclass = Some(Arc::clone(superclass));
        self
    }

    #[must_use]
    pub fn schema(self, schema: Schema) -> Self {
        self.config(ConfigOptions::new().schema(schema))
    }

    #[must_use]
    pub fn config(mut self, mut options: ConfigOptions) -> Self {
        let resolver = options.resolver.take().unwrap_or_default();

        self.config = Some(match self.config.take() {
            Some(base) => resolver.resolve(base, options),
            None => options,
        });
        self
    }

    #[must_use]
    pub fn mixin(self, class: &ClassRef) -> Self {
        self.config(ConfigOptions::mixin(class))
    }

    #[must_use]
    pub fn discriminator_key(self, key: impl Into<String>) -> Self {
        self.config(ConfigOptions::new().discriminator_key(key))
    }

    #[must_use]
    pub fn default_level(self, level: Level) -> Self {
        self.config(ConfigOptions::new().default_level(level))
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, mut options: FieldOptions) -> Self {
        let name = name.into();
        let resolver = options.resolver.take().unwrap_or_default();

        match self.annotations.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => {
                *existing = resolver.resolve(std::mem::take(existing), options);
            }
            None => self.annotations.push((name, options)),
        }
        self
    }

    #[must_use]
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.put_behavior(name.into(), Behavior::Method(Arc::new(f)));
        self
    }

    #[must_use]
    pub fn getter<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Instance) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        let set = self.existing_accessor(&name).and_then(|b| b.setter().cloned());
        self.put_behavior(
            name,
            Behavior::Accessor {
                get: Some(Arc::new(f)),
                set,
            },
        );
        self
    }

    #[must_use]
    pub fn setter<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Instance, Value) + Send + Sync + 'static,
    {
        let name = name.into();
        let get = self.existing_accessor(&name).and_then(|b| b.getter().cloned());
        self.put_behavior(
            name,
            Behavior::Accessor {
                get,
                set: Some(Arc::new(f)),
            },
        );
        self
    }

    fn existing_accessor(&self, name: &str) -> Option<&Behavior> {
        self.behaviors
            .iter()
            .find_map(|(n, behavior)| (n == name).then_some(behavior))
    }

    fn put_behavior(&mut self, name: String, behavior: Behavior) {
        match self.behaviors.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = behavior,
            None => self.behaviors.push((name, behavior)),
        }
    }

    #[must_use]
    pub fn build(self) -> ClassRef {
        Arc::new(ModelClass {
            id: ClassId::next(),
            name: self.name,
            kind: ClassKind::Model,
            superclass: self.superclass,
            config: self.config.unwrap_or_default(),
            annotations: self.annotations,
            behaviors: self.behaviors,
        })
    }
}

///
/// TESTS
///
