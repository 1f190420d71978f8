//! Property values, maps, and paths for the provlink resource model.
//!
//! Resource state travels as dynamically-typed trees of [`PropertyValue`]
//! keyed by property name. [`PropertyPath`] addresses a position inside such
//! a tree and round-trips through the engine's canonical string key format.

pub mod path;
pub mod reserved;
pub mod value;

pub use path::{PathParseError, PathSegment, PropertyPath};
pub use value::{PropertyMap, PropertyValue, map_from_json, strip_secrets, strip_secrets_map};
