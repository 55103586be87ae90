use crate::{
    level::Level,
    model::ClassRef,
    options::{MergeOptions, Resolver, concat_extra, concat_vecs},
};
use serde_json::Value as JsonValue;
use std::{collections::BTreeMap, fmt};
use strata_schema::node::Schema;

/// Key the mixin list is concatenated under.
pub const MIXIN_CLASSES_KEY: &str = "mixinClasses";

///
/// ConfigOptions
/// Class-level configuration.
///

#[derive(Clone, Default)]
pub struct ConfigOptions {
    pub schema: Option<Schema>,
    pub discriminator_key: Option<String>,
    pub mixin_classes: Option<Vec<ClassRef>>,
    /// Projection level used when the caller does not pass one.
    pub default_level: Option<Level>,
    pub resolver: Option<Resolver>,
    pub extra: BTreeMap<String, JsonValue>,
}

impl ConfigOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    #[must_use]
    pub fn discriminator_key(mut self, key: impl Into<String>) -> Self {
        self.discriminator_key = Some(key.into());
        self
    }

    #[must_use]
    pub const fn default_level(mut self, level: Level) -> Self {
        self.default_level = Some(level);
        self
    }

    #[must_use]
    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// A record that appends `class` to the mixin list when applied.
    #[must_use]
    pub fn mixin(class: &ClassRef) -> Self {
        Self {
            mixin_classes: Some(vec![class.clone()]),
            resolver: Some(Resolver::reverse_concat(MIXIN_CLASSES_KEY)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn mixins(&self) -> &[ClassRef] {
        self.mixin_classes.as_deref().unwrap_or_default()
    }
}

impl MergeOptions for ConfigOptions {
    fn overlay(self, newer: Self) -> Self {
        let mut extra = self.extra;
        extra.extend(newer.extra);

        Self {
            schema: newer.schema.or(self.schema),
            discriminator_key: newer.discriminator_key.or(self.discriminator_key),
            mixin_classes: newer.mixin_classes.or(self.mixin_classes),
            default_level: newer.default_level.or(self.default_level),
            resolver: newer.resolver.or(self.resolver),
            extra,
        }
    }

    fn concat_list(&mut self, key: &str, front: &Self, back: &Self) {
        match key {
            MIXIN_CLASSES_KEY => {
                self.mixin_classes =
                    concat_vecs(front.mixin_classes.as_ref(), back.mixin_classes.as_ref());
            }
            _ => concat_extra(&mut self.extra, key, &front.extra, &back.extra),
        }
    }
}

impl fmt::Debug for ConfigOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mixins: Vec<&str> = self.mixins().iter().map(|class| class.name()).collect();

        f.debug_struct("ConfigOptions")
            .field("schema", &self.schema.as_ref().map(|s| &s.name))
            .field("discriminator_key", &self.discriminator_key)
            .field("mixin_classes", &mixins)
            .field("default_level", &self.default_level)
            .field("resolver", &self.resolver)
            .field("extra", &self.extra)
            .finish()
    }
}

///
/// TESTS
///
