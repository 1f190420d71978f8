//! The property differ: walks old and new property trees under the schema
//! and records changes per path.
//!
//! Comparison at one position proceeds in order:
//!
//! 1. Reserved bookkeeping keys never produce entries.
//! 2. A value that disagrees with its declared shape is compared as an
//!    opaque scalar at this path.
//! 3. A provider-computed attribute vanishing from the plan is the provider
//!    reasserting it, not a deletion.
//! 4. If either side is absent, or the new side is unknown, the position
//!    short-circuits to a single entry without traversing children.
//! 5. Otherwise the effective kind dispatches: lists by position, sets by
//!    content hash, maps and objects key by key, everything else by plain
//!    equality.

use std::collections::BTreeSet;

use provlink_property::{PropertyMap, PropertyPath, PropertyValue, strip_secrets_map};
use provlink_schema::{ResolvedSchema, SchemaInfoMap, SchemaKind, SchemaMap, lookup_schemas};

use crate::Result;
use crate::base::{self, BaseDiff};
use crate::filters;
use crate::types::{DetailedDiff, DiffKind, DiffMap, DiffOptions};

/// Computes the detailed diff between a resource's recorded state and its
/// planned new state.
///
/// `old_state` is the state recorded by the last apply and `planned` is the
/// proposed state after provider planning. `new_inputs` carries the inputs
/// exactly as the caller declared them; set changes are re-keyed to the
/// positions the caller wrote, so reported indices match the source program
/// rather than provider ordering. Secret wrappers are stripped from all
/// three maps before comparison.
pub fn compute_detailed_diff(
  schema: &SchemaMap,
  info: &SchemaInfoMap,
  old_state: &PropertyMap,
  planned: &PropertyMap,
  new_inputs: &PropertyMap,
  options: &DiffOptions,
) -> Result<DetailedDiff> {
  let old_state = strip_secrets_map(old_state.clone());
  let planned = strip_secrets_map(planned.clone());
  let new_inputs = strip_secrets_map(new_inputs.clone());

  let differ = Differ::new(schema, info, &new_inputs);
  let diff = differ.make_property_map_diff(&old_state, &planned)?;

  let diff = filters::apply_renames(&differ, diff);
  let diff = filters::apply_ignores(diff, &options.ignore_changes);
  let diff = filters::apply_replace_override(diff, options.replace_override);

  Ok(DetailedDiff::from_paths(diff))
}

/// One diff computation's shared context.
pub(crate) struct Differ<'a> {
  schema: &'a SchemaMap,
  info: &'a SchemaInfoMap,

  /// The inputs as the caller declared them, for re-keying set changes.
  pub(crate) new_inputs: &'a PropertyMap,
}

impl<'a> Differ<'a> {
  pub(crate) fn new(
    schema: &'a SchemaMap,
    info: &'a SchemaInfoMap,
    new_inputs: &'a PropertyMap,
  ) -> Differ<'a> {
    Differ { schema, info, new_inputs }
  }

  pub(crate) fn lookup(&self, path: &PropertyPath) -> Result<ResolvedSchema<'a>> {
    Ok(lookup_schemas(path, self.schema, self.info)?)
  }

  /// Diffs two resource property maps field by field.
  pub(crate) fn make_property_map_diff(
    &self,
    old: &PropertyMap,
    new: &PropertyMap,
  ) -> Result<DiffMap> {
    let mut diff = DiffMap::new();
    for key in sorted_merged_keys(old, new) {
      let old_value = old.get(key).unwrap_or(&PropertyValue::Null);
      let new_value = new.get(key).unwrap_or(&PropertyValue::Null);
      diff.extend(self.make_prop_diff(&PropertyPath::root(key.as_str()), old_value, new_value)?);
    }
    Ok(diff)
  }

  /// Diffs one position, dispatching on the schema's effective kind.
  pub(crate) fn make_prop_diff(
    &self,
    path: &PropertyPath,
    old: &PropertyValue,
    new: &PropertyValue,
  ) -> Result<DiffMap> {
    if path.is_reserved() {
      return Ok(DiffMap::new());
    }
    let resolved = self.lookup(path)?;
    let kind = resolved.effective_kind();

    if shape_mismatch(kind, old) || shape_mismatch(kind, new) {
      return self.make_plain_prop_diff(path, old, new);
    }

    if new.is_null() && old.is_present() && resolved.is_computed_attribute() {
      return Ok(DiffMap::new());
    }

    if old.is_null() || new.is_null() || new.is_computed() {
      return self.make_short_circuit_diff(path, old, new);
    }

    match kind {
      Some(SchemaKind::List) => self.make_list_diff(path, old, new),
      Some(SchemaKind::Set) => self.make_set_diff(path, old, new),
      Some(SchemaKind::Map | SchemaKind::Object) => self.make_map_diff(path, old, new),
      _ => self.make_plain_prop_diff(path, old, new),
    }
  }

  /// Compares a position as an opaque value. An unknown new value always
  /// reads as a change.
  pub(crate) fn make_plain_prop_diff(
    &self,
    path: &PropertyPath,
    old: &PropertyValue,
    new: &PropertyValue,
  ) -> Result<DiffMap> {
    let kind = match base::classify(old, new) {
      BaseDiff::NoDiff => return Ok(DiffMap::new()),
      BaseDiff::Add => DiffKind::Add,
      BaseDiff::Delete => DiffKind::Delete,
      BaseDiff::Undecided => {
        if new.is_computed() || old != new {
          DiffKind::Update
        } else {
          return Ok(DiffMap::new());
        }
      }
    };
    let kind = if self.path_triggers_replacement(path) { kind.promote() } else { kind };
    Ok(DiffMap::from([(path.clone(), kind)]))
  }

  /// Diffs a position where one side is absent or the new side is unknown.
  /// Children are not traversed, but force-new schemas anywhere inside the
  /// present side still flavor the single entry.
  fn make_short_circuit_diff(
    &self,
    path: &PropertyPath,
    old: &PropertyValue,
    new: &PropertyValue,
  ) -> Result<DiffMap> {
    let kind = match base::classify(old, new) {
      BaseDiff::NoDiff => return Ok(DiffMap::new()),
      BaseDiff::Add => DiffKind::Add,
      BaseDiff::Delete => DiffKind::Delete,
      // Both sides present here means the new side is unknown.
      BaseDiff::Undecided => DiffKind::Update,
    };

    let promote = (new.is_computed() && self.path_triggers_replacement(path))
      || (!new.is_null() && !new.is_computed() && self.value_triggers_replacement(path, new))
      || (!old.is_null() && self.value_triggers_replacement(path, old));

    let kind = if promote { kind.promote() } else { kind };
    Ok(DiffMap::from([(path.clone(), kind)]))
  }

  /// Positional list comparison. A side missing an index reads as null
  /// there, so tail growth is adds and tail shrinkage is deletes.
  fn make_list_diff(
    &self,
    path: &PropertyPath,
    old: &PropertyValue,
    new: &PropertyValue,
  ) -> Result<DiffMap> {
    let (PropertyValue::Array(old_items), PropertyValue::Array(new_items)) = (old, new) else {
      return self.make_plain_prop_diff(path, old, new);
    };
    let mut diff = DiffMap::new();
    for i in 0..old_items.len().max(new_items.len()) {
      let old_item = old_items.get(i).unwrap_or(&PropertyValue::Null);
      let new_item = new_items.get(i).unwrap_or(&PropertyValue::Null);
      diff.extend(self.make_prop_diff(&path.index(i), old_item, new_item)?);
    }
    Ok(diff)
  }

  /// Key-by-key comparison over the union of both sides' keys. Serves maps
  /// and objects alike.
  fn make_map_diff(
    &self,
    path: &PropertyPath,
    old: &PropertyValue,
    new: &PropertyValue,
  ) -> Result<DiffMap> {
    let (PropertyValue::Object(old_fields), PropertyValue::Object(new_fields)) = (old, new) else {
      return self.make_plain_prop_diff(path, old, new);
    };
    let mut diff = DiffMap::new();
    for key in sorted_merged_keys(old_fields, new_fields) {
      let old_value = old_fields.get(key).unwrap_or(&PropertyValue::Null);
      let new_value = new_fields.get(key).unwrap_or(&PropertyValue::Null);
      diff.extend(self.make_prop_diff(&path.key(key.as_str()), old_value, new_value)?);
    }
    Ok(diff)
  }
}

/// True when a present, known value does not have the shape its schema
/// declares for a collection position. Null and unknown values never
/// mismatch; scalar positions accept anything and compare plainly.
fn shape_mismatch(kind: Option<SchemaKind>, value: &PropertyValue) -> bool {
  match kind {
    Some(SchemaKind::List | SchemaKind::Set) => {
      !matches!(value, PropertyValue::Null | PropertyValue::Computed | PropertyValue::Array(_))
    }
    Some(SchemaKind::Map | SchemaKind::Object) => {
      !matches!(value, PropertyValue::Null | PropertyValue::Computed | PropertyValue::Object(_))
    }
    _ => false,
  }
}

fn sorted_merged_keys<'m>(left: &'m PropertyMap, right: &'m PropertyMap) -> BTreeSet<&'m String> {
  left.keys().chain(right.keys()).collect()
}
