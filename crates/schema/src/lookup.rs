//! Schema resolution along property paths.
//!
//! [`lookup_schemas`] walks a [`PropertyPath`] through a schema map and its
//! overlay, one segment at a time:
//!
//! 1. Before applying a segment, flattened single-element collections are
//!    collapsed to their element, repeatedly, so paths address the element
//!    directly. The final position is left uncollapsed.
//! 2. Names resolve block fields, object fields, and map elements; indices
//!    resolve list and set elements.
//! 3. Running past the declared schema (unknown field, index into a block)
//!    yields [`ResolvedSchema::Unknown`], not an error: diffing falls back
//!    to plain comparison there.
//! 4. Structural contradictions are errors: a path that indexes into a
//!    scalar, or reads a field of one, cannot come from well-formed state.

use std::collections::BTreeMap;

use provlink_property::{PathSegment, PropertyPath};
use thiserror::Error;

use crate::info::{SchemaInfo, SchemaInfoMap};
use crate::types::{Schema, SchemaElem, SchemaKind, SchemaMap};

/// A path that contradicts the declared shape of the data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
  #[error("cannot index into {kind:?} at {path}")]
  IndexIntoScalar { kind: SchemaKind, path: String },

  #[error("cannot read field \"{field}\" of {kind:?} at {path}")]
  FieldIntoScalar { kind: SchemaKind, field: String, path: String },
}

/// The schema position a path resolves to.
#[derive(Debug, Clone, Copy)]
pub enum ResolvedSchema<'a> {
  /// A concrete schema node, possibly with overlay metadata.
  Node { schema: &'a Schema, info: Option<&'a SchemaInfo> },

  /// A set of named fields with no schema node of its own: the resource
  /// root, or the block element of a collection.
  Block { fields: &'a SchemaMap, infos: Option<&'a BTreeMap<String, SchemaInfo>> },

  /// Schema information is exhausted at this position.
  Unknown,
}

impl<'a> ResolvedSchema<'a> {
  /// The kind of value expected here, if known. Flattened single-element
  /// collections report their element's kind.
  pub fn effective_kind(&self) -> Option<SchemaKind> {
    match *self {
      ResolvedSchema::Unknown => None,
      ResolvedSchema::Block { .. } => Some(SchemaKind::Object),
      ResolvedSchema::Node { schema, info } => {
        if let Some(info) = info
          && let Some(kind) = info.type_override
        {
          return Some(kind);
        }
        if is_max_items_one(schema, info) {
          return element_of(schema, info).effective_kind();
        }
        Some(schema.kind)
      }
    }
  }

  /// Whether a change at this position requires replacing the resource.
  /// An overlay value beats the schema flag in both directions.
  pub fn forces_new(&self) -> bool {
    match *self {
      ResolvedSchema::Node { schema, info } => {
        if let Some(info) = info
          && let Some(force) = info.force_new
        {
          return force;
        }
        schema.force_new
      }
      _ => false,
    }
  }

  /// True when the schema declares this position provider-computed.
  pub fn is_computed_attribute(&self) -> bool {
    match *self {
      ResolvedSchema::Node { schema, .. } => schema.computed,
      _ => false,
    }
  }

  /// The overlay rename for this position, if any.
  pub fn rename(&self) -> Option<&'a str> {
    match *self {
      ResolvedSchema::Node { info: Some(info), .. } => info.rename.as_deref(),
      _ => None,
    }
  }

  /// True when name segments under this position address schema fields, as
  /// opposed to free-form map keys.
  pub fn is_field_container(&self) -> bool {
    match self {
      ResolvedSchema::Block { .. } => true,
      ResolvedSchema::Node { .. } => self.effective_kind() == Some(SchemaKind::Object),
      ResolvedSchema::Unknown => false,
    }
  }
}

/// True when this collection is projected as its single element.
pub fn is_max_items_one(schema: &Schema, info: Option<&SchemaInfo>) -> bool {
  if !matches!(schema.kind, SchemaKind::List | SchemaKind::Set) {
    return false;
  }
  if let Some(info) = info
    && let Some(flatten) = info.max_items_one
  {
    return flatten;
  }
  schema.max_items_one
}

/// Resolves the schema and overlay at `path`.
pub fn lookup_schemas<'a>(
  path: &PropertyPath,
  schema: &'a SchemaMap,
  info: &'a SchemaInfoMap,
) -> Result<ResolvedSchema<'a>, SchemaError> {
  let mut current = ResolvedSchema::Block { fields: schema, infos: Some(info) };
  for (i, segment) in path.segments().iter().enumerate() {
    while let ResolvedSchema::Node { schema, info } = current
      && is_max_items_one(schema, info)
    {
      current = element_of(schema, info);
    }
    current = apply_segment(current, segment, &path.prefix(i))?;
  }
  Ok(current)
}

/// The element position of a collection schema.
fn element_of<'a>(schema: &'a Schema, info: Option<&'a SchemaInfo>) -> ResolvedSchema<'a> {
  let elem_info = info.and_then(|i| i.elem.as_deref());
  match &schema.elem {
    Some(SchemaElem::Value(elem)) => ResolvedSchema::Node { schema: elem, info: elem_info },
    Some(SchemaElem::Fields(fields)) => {
      ResolvedSchema::Block { fields, infos: elem_info.map(|i| &i.fields) }
    }
    None => ResolvedSchema::Unknown,
  }
}

fn apply_segment<'a>(
  current: ResolvedSchema<'a>,
  segment: &PathSegment,
  at: &PropertyPath,
) -> Result<ResolvedSchema<'a>, SchemaError> {
  match current {
    ResolvedSchema::Unknown => Ok(ResolvedSchema::Unknown),

    ResolvedSchema::Block { fields, infos } => match segment {
      PathSegment::Name(name) => match fields.get(name) {
        Some(schema) => Ok(ResolvedSchema::Node { schema, info: infos.and_then(|m| m.get(name)) }),
        None => Ok(ResolvedSchema::Unknown),
      },
      PathSegment::Index(_) => Ok(ResolvedSchema::Unknown),
    },

    ResolvedSchema::Node { schema, info } => match (schema.kind, segment) {
      (SchemaKind::List | SchemaKind::Set, PathSegment::Index(_)) => Ok(element_of(schema, info)),
      (SchemaKind::List | SchemaKind::Set, PathSegment::Name(_)) => Ok(ResolvedSchema::Unknown),

      // Every map value shares the element schema; the key itself is data.
      (SchemaKind::Map, PathSegment::Name(_)) => Ok(element_of(schema, info)),
      (SchemaKind::Map, PathSegment::Index(_)) => Ok(ResolvedSchema::Unknown),

      (SchemaKind::Object, PathSegment::Name(name)) => match &schema.elem {
        Some(SchemaElem::Fields(fields)) => match fields.get(name) {
          Some(field) => {
            Ok(ResolvedSchema::Node { schema: field, info: info.and_then(|i| i.fields.get(name)) })
          }
          None => Ok(ResolvedSchema::Unknown),
        },
        _ => Ok(ResolvedSchema::Unknown),
      },
      (SchemaKind::Object, PathSegment::Index(_)) => Ok(ResolvedSchema::Unknown),

      (kind, PathSegment::Index(_)) => {
        Err(SchemaError::IndexIntoScalar { kind, path: at.to_string() })
      }
      (kind, PathSegment::Name(name)) => {
        Err(SchemaError::FieldIntoScalar { kind, field: name.clone(), path: at.to_string() })
      }
    },
  }
}
