//! Resource schemas and overlay metadata for the provlink resource model.
//!
//! A [`SchemaMap`] describes the shape a provider declares for a resource:
//! value kinds, collection element types, and per-property flags such as
//! force-new and computed. A [`SchemaInfoMap`] is the mapping-side overlay
//! that renames properties and overrides individual flags without touching
//! the provider schema itself.
//!
//! [`lookup_schemas`] resolves both along a property path, collapsing
//! flattened single-element collections on the way down.

pub mod hash;
pub mod info;
pub mod lookup;
pub mod types;

pub use hash::default_set_hash;
pub use info::{SchemaInfo, SchemaInfoMap};
pub use lookup::{ResolvedSchema, SchemaError, is_max_items_one, lookup_schemas};
pub use types::{Schema, SchemaElem, SchemaKind, SchemaMap, SetHashFn};
