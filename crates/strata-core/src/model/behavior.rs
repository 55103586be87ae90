use crate::value::{Instance, Value};
use std::{collections::BTreeMap, fmt, sync::Arc};

pub type MethodFn = Arc<dyn Fn(&Instance, &[Value]) -> Value + Send + Sync>;
pub type GetterFn = Arc<dyn Fn(&Instance) -> Value + Send + Sync>;
pub type SetterFn = Arc<dyn Fn(&mut Instance, Value) + Send + Sync>;

/// Behavior names that are never copied from ancestors.
pub const RESERVED_BEHAVIORS: &[&str] = &["$attach", "constructor", "modelize", "toJSON", "toObject"];

///
/// Behavior
/// Instance-level member a class contributes besides its data.
///

#[derive(Clone)]
pub enum Behavior {
    Method(MethodFn),
    Accessor {
        get: Option<GetterFn>,
        set: Option<SetterFn>,
    },
}

impl Behavior {
    #[must_use]
    pub const fn is_method(&self) -> bool {
        matches!(self, Self::Method(_))
    }

    #[must_use]
    pub const fn getter(&self) -> Option<&GetterFn> {
        match self {
            Self::Accessor { get, .. } => get.as_ref(),
            Self::Method(_) => None,
        }
    }

    #[must_use]
    pub const fn setter(&self) -> Option<&SetterFn> {
        match self {
            Self::Accessor { set, .. } => set.as_ref(),
            Self::Method(_) => None,
        }
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(_) => f.write_str("Method(..)"),
            Self::Accessor { get, set } => f
                .debug_struct("Accessor")
                .field("get", &get.is_some())
                .field("set", &set.is_some())
                .finish(),
        }
    }
}

///
/// BehaviorTable
///
/// The behaviors visible on instances of one class: its own, then whatever
/// each ancestor provides that nothing earlier already did.
///

#[derive(Clone, Debug, Default)]
pub struct BehaviorTable {
    entries: BTreeMap<String, Behavior>,
}

impl BehaviorTable {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub(crate) fn compose<'a>(
        own: impl IntoIterator<Item = &'a (String, Behavior)>,
        ancestors: impl IntoIterator<Item = &'a Self>,
    ) -> Self {
        let mut entries: BTreeMap<String, Behavior> = own
            .into_iter()
            .map(|(name, behavior)| (name.clone(), behavior.clone()))
            .collect();

        for ancestor in ancestors {
            for (name, behavior) in &ancestor.entries {
                if RESERVED_BEHAVIORS.contains(&name.as_str()) {
                    continue;
                }
                entries
                    .entry(name.clone())
                    .or_insert_with(|| behavior.clone());
            }
        }

        Self { entries }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Behavior> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

///
/// TESTS
///
