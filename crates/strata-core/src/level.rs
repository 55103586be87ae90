//! Data levels.
//!
//! Every field may carry a level; the higher the number, the more
//! restricted the field. A projection at level `L` keeps fields whose level
//! is unset or `<= L`.

use std::collections::BTreeMap;

pub type Level = i32;

/// Remaps the level handed to a nested projection.
pub type PassLevelMap = BTreeMap<Level, Level>;

/// Used when the model is referenced from other models.
pub const BASIC: Level = 10;

/// Returned by list and search style reads.
pub const SHORT: Level = 20;

/// Returned by single-item reads.
pub const DETAIL: Level = 30;

/// Sensitive data, usually withheld.
pub const CONFIDENTIAL: Level = 40;

/// Never projected.
pub const NEVER: Level = 1000;

/// Level used when neither the caller nor the model config names one.
pub const DEFAULT_PROJECTION_LEVEL: Level = NEVER - 1;

/// Build a pass map that sends every listed level to `target`.
#[must_use]
pub fn pass_to(target: Level, from: &[Level]) -> PassLevelMap {
    from.iter().map(|level| (*level, target)).collect()
}
