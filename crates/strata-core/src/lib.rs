//! Core runtime for Strata: the model registry, per-class descriptors with
//! their field-merge algorithm, and the two traversal engines built on them
//! (materialization and level-filtered projection).
#![warn(unreachable_pub)]

pub mod builtin;
pub mod error;
pub mod level;
pub mod materialize;
pub mod model;
pub mod options;
pub mod project;
pub mod registry;
pub mod value;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::Error;

///
/// Prelude
///
/// Domain vocabulary only: classes, options, values and the registry.
///

pub mod prelude {
    pub use crate::{
        error::{CoercionError, Error, MaterializationError},
        level::{self, Level},
        materialize::ModelizeOptions,
        model::{
            Behavior, ClassBuilder, ClassKind, ClassRef, CustomType, EnumDef, FieldDescriptor,
            ModelClass, ModelDescriptor, TypeClass,
        },
        options::{ConfigOptions, FieldOptions, FieldType, Resolver},
        project::ProjectOptions,
        registry::{ModelKey, Provided, Registry},
        value::{Attachment, Instance, Value},
    };
    pub use strata_schema::{
        node::{Property, Schema, Type},
        types::{Modifier, Primitive},
    };
}
