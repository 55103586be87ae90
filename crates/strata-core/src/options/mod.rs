//! Option records attached to classes and fields, and the resolvers that
//! combine a new record with an existing one.

mod config;
mod field;

pub use config::ConfigOptions;
pub use field::{Coercion, Condition, DefaultValue, FieldOptions, FieldType, VirtualRef};

use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

///
/// MergeOptions
///
/// Implemented by every option record a resolver can combine.
///

pub trait MergeOptions: Clone {
    /// Keys set on `newer` replace keys set on `self`; unset keys keep
    /// their old value.
    #[must_use]
    fn overlay(self, newer: Self) -> Self;

    /// Replace the list stored under `key` with `front` followed by `back`.
    fn concat_list(&mut self, key: &str, front: &Self, back: &Self);
}

///
/// Resolver
///
/// Strategy for combining two option records for the same target.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Resolver {
    /// Shallow extend: the newer record wins key by key.
    #[default]
    Overwrite,

    /// Discard the base record.
    Latest,

    /// Shallow extend, then the list under the key becomes `newer ++ base`.
    Concat(String),

    /// Shallow extend, then the list under the key becomes `base ++ newer`.
    ReverseConcat(String),
}

impl Resolver {
    pub fn concat(key: impl Into<String>) -> Self {
        Self::Concat(key.into())
    }

    pub fn reverse_concat(key: impl Into<String>) -> Self {
        Self::ReverseConcat(key.into())
    }

    #[must_use]
    pub fn resolve<O: MergeOptions>(&self, base: O, newer: O) -> O {
        match self {
            Self::Overwrite => base.overlay(newer),
            Self::Latest => newer,
            Self::Concat(key) => {
                let mut merged = base.clone().overlay(newer.clone());
                merged.concat_list(key, &newer, &base);
                merged
            }
            Self::ReverseConcat(key) => {
                let mut merged = base.clone().overlay(newer.clone());
                merged.concat_list(key, &base, &newer);
                merged
            }
        }
    }
}

/// Concatenate two optional lists; `None` when both are unset.
pub(crate) fn concat_vecs<T: Clone>(front: Option<&Vec<T>>, back: Option<&Vec<T>>) -> Option<Vec<T>> {
    if front.is_none() && back.is_none() {
        return None;
    }

    Some(
        front
            .into_iter()
            .chain(back)
            .flat_map(|items| items.iter().cloned())
            .collect(),
    )
}

/// Concatenate the JSON arrays stored under `key`; non-array values count
/// as empty.
pub(crate) fn concat_extra(
    extra: &mut BTreeMap<String, JsonValue>,
    key: &str,
    front: &BTreeMap<String, JsonValue>,
    back: &BTreeMap<String, JsonValue>,
) {
    let items = |map: &BTreeMap<String, JsonValue>| match map.get(key) {
        Some(JsonValue::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let mut joined = items(front);
    joined.extend(items(back));
    extra.insert(key.to_string(), JsonValue::Array(joined));
}

///
/// TESTS
///
