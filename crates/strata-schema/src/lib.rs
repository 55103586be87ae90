//! Structural schema contract supplied per model class by an external
//! schema provider, plus the validation run when a class is registered.

pub mod error;
pub mod node;
pub mod types;
pub mod validate;

/// Maximum length for model schema identifiers.
pub const MAX_MODEL_NAME_LEN: usize = 64;

/// Maximum length for property identifiers.
pub const MAX_FIELD_NAME_LEN: usize = 64;

use crate::error::ErrorTree;
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        err,
        error::ErrorTree,
        node::*,
        types::{Modifier, Primitive},
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("schema is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("schema validation failed: {0}")]
    Validation(ErrorTree),
}
