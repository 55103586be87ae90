//! ## Crate layout
//! - `core`: registry, class builders, descriptors, materialization and
//!   projection.
//! - `schema`: the structural schema contract and its validation.
//!
//! The `prelude` module brings the everyday surface into scope: build a
//! class, register it on a [`Registry`](core::registry::Registry),
//! materialize raw JSON and project it back.

pub use strata_core as core;
pub use strata_schema as schema;

/// re-exports
///
/// callers that hand raw JSON to the registry get the same serde_json
pub mod __reexports {
    pub use serde;
    pub use serde_json;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use crate::core::Error;

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::prelude::*;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::json;
}

///
/// TESTS
///
