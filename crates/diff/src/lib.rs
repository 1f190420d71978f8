//! provlink-diff: detailed change detection between resource states.
//!
//! Given a provider schema, its mapping overlays, the recorded old state,
//! the planned new state, and the inputs as the caller declared them,
//! [`compute_detailed_diff`] reports every changed property as a canonical
//! path string with a change kind. Changes at force-new positions carry
//! replace flavoring; ordered lists diff by position, sets by content hash,
//! and maps key by key.

mod base;
mod differ;
mod error;
mod filters;
mod replacement;
mod set;
mod types;

pub use differ::compute_detailed_diff;
pub use error::DiffError;
pub use types::{DetailedDiff, DiffChanges, DiffKind, DiffOptions};

/// Result type for diff operations
pub type Result<T> = std::result::Result<T, DiffError>;
