//! Mapping-side schema overlays.
//!
//! A [`SchemaInfo`] adjusts how one schema position is interpreted without
//! modifying the provider schema: renaming the property on the wire,
//! overriding force-new or flattening, or substituting the projected kind.
//! Overrides are tri-state: `None` defers to the schema, `Some(_)` wins
//! either way.

use std::collections::BTreeMap;

use crate::types::SchemaKind;

/// Overlays for a resource's top-level properties, keyed by schema name.
pub type SchemaInfoMap = BTreeMap<String, SchemaInfo>;

/// Overlay metadata for a single schema position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaInfo {
  /// The name this property carries on the engine side.
  pub rename: Option<String>,

  /// Overrides the schema's force-new flag when set.
  pub force_new: Option<bool>,

  /// Overrides the schema's single-element flattening when set.
  pub max_items_one: Option<bool>,

  /// Projects the position as a different kind than the schema declares.
  pub type_override: Option<SchemaKind>,

  /// Overlay for collection elements.
  pub elem: Option<Box<SchemaInfo>>,

  /// Overlays for object or block fields, keyed by schema name.
  pub fields: BTreeMap<String, SchemaInfo>,
}

impl SchemaInfo {
  /// An overlay that only renames the property.
  pub fn renamed(name: impl Into<String>) -> SchemaInfo {
    SchemaInfo { rename: Some(name.into()), ..SchemaInfo::default() }
  }

  /// An overlay that only overrides the force-new flag.
  pub fn forces_new(force: bool) -> SchemaInfo {
    SchemaInfo { force_new: Some(force), ..SchemaInfo::default() }
  }

  /// An overlay that only wraps an element overlay.
  pub fn with_elem(elem: SchemaInfo) -> SchemaInfo {
    SchemaInfo { elem: Some(Box::new(elem)), ..SchemaInfo::default() }
  }
}
