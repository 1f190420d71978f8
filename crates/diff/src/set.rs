//! Set diffs: membership comparison by identity hash.
//!
//! Sets travel as arrays, but order carries no meaning. A set diff runs in
//! five steps:
//!
//! 1. Hash both sides' elements into occurrence maps (hash to positions).
//!    An element whose hash function panics is logged and kept without a
//!    content identity, so it matches nothing and still surfaces.
//! 2. Take the multiset symmetric difference: for each hash, occurrences
//!    matched by the other side drop out; survivors are the removals and
//!    additions. Equal content in any order yields no change here.
//! 3. Key removals and additions by array slot; a removal and an addition
//!    sharing a slot merge into a single changed pair.
//! 4. Re-key additions and changed pairs to the positions the caller's
//!    declared inputs hold those elements at, so reported indices follow
//!    the source program rather than provider ordering.
//! 5. Diff each pair recursively, reporting additions and changes at the
//!    new position and pure removals at the old one.

use std::collections::{BTreeMap, BTreeSet};
use std::panic::{self, AssertUnwindSafe};

use provlink_property::{PropertyPath, PropertyValue};
use provlink_schema::{ResolvedSchema, Schema};
use tracing::{debug, warn};

use crate::Result;
use crate::differ::Differ;
use crate::types::DiffMap;

/// A set element's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum SetHash {
  /// The hash the schema's hash function produced.
  Content(i64),

  /// The element at this position on its own side could not be hashed. An
  /// identity-less element matches nothing, not even another identity-less
  /// element, so its presence always reads as a change.
  Unhashable(usize),
}

impl SetHash {
  fn matchable(self) -> bool {
    matches!(self, SetHash::Content(_))
  }
}

/// A position in a set's array representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct ArrayIndex(pub(crate) usize);

/// Element positions on one side, grouped by identity hash. Duplicates are
/// legal; each occurrence is tracked separately.
pub(crate) type HashIndexMap = BTreeMap<SetHash, Vec<ArrayIndex>>;

/// One occurrence of an element in a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SetMember {
  pub(crate) hash: SetHash,
  pub(crate) index: ArrayIndex,
}

/// The old and new occurrences reported at one slot. Both sides present
/// means the element at that slot changed in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct HashPair {
  pub(crate) old: Option<SetMember>,
  pub(crate) new: Option<SetMember>,
}

/// Changed pairs keyed by the slot the change is reported at.
pub(crate) type ChangesIndexMap = BTreeMap<ArrayIndex, HashPair>;

/// The multiset symmetric difference of two occurrence maps. For each hash,
/// as many occurrences as the other side holds are matched and dropped; the
/// rest survive, ordered by position.
pub(crate) fn compute_set_hash_changes(
  old: &HashIndexMap,
  new: &HashIndexMap,
) -> (Vec<SetMember>, Vec<SetMember>) {
  let mut removed = Vec::new();
  let mut added = Vec::new();

  for (&hash, indices) in old {
    let matched = if hash.matchable() { new.get(&hash).map_or(0, Vec::len) } else { 0 };
    removed.extend(indices.iter().skip(matched).map(|&index| SetMember { hash, index }));
  }
  for (&hash, indices) in new {
    let matched = if hash.matchable() { old.get(&hash).map_or(0, Vec::len) } else { 0 };
    added.extend(indices.iter().skip(matched).map(|&index| SetMember { hash, index }));
  }

  removed.sort_by_key(|member| member.index);
  added.sort_by_key(|member| member.index);
  (removed, added)
}

/// Pairs removals and additions by slot. A removal and an addition at the
/// same slot describe one element changing in place.
pub(crate) fn build_changes_index_map(
  removed: &[SetMember],
  added: &[SetMember],
) -> ChangesIndexMap {
  let mut changes = ChangesIndexMap::new();
  for member in removed {
    changes.entry(member.index).or_default().old = Some(*member);
  }
  for member in added {
    changes.entry(member.index).or_default().new = Some(*member);
  }
  changes
}

impl Differ<'_> {
  pub(crate) fn make_set_diff(
    &self,
    path: &PropertyPath,
    old: &PropertyValue,
    new: &PropertyValue,
  ) -> Result<DiffMap> {
    let (PropertyValue::Array(old_items), PropertyValue::Array(new_items)) = (old, new) else {
      return self.make_plain_prop_diff(path, old, new);
    };
    // Hashing needs the set's schema node; without one the elements have no
    // identity and the whole value compares plainly.
    let ResolvedSchema::Node { schema, .. } = self.lookup(path)? else {
      return self.make_plain_prop_diff(path, old, new);
    };

    let old_hashes = self.calculate_set_hash_index_map(path, schema, old_items);
    let new_hashes = self.calculate_set_hash_index_map(path, schema, new_items);

    let (removed, added) = compute_set_hash_changes(&old_hashes, &new_hashes);
    if removed.is_empty() && added.is_empty() {
      return Ok(DiffMap::new());
    }

    let changes = build_changes_index_map(&removed, &added);
    let changes = self.match_new_indices_to_inputs(path, schema, changes, &old_hashes, &new_hashes);

    let null = PropertyValue::Null;
    let mut diff = DiffMap::new();
    for (slot, pair) in changes {
      let old_value = pair.old.map_or(&null, |member| &old_items[member.index.0]);
      let new_value = pair.new.map_or(&null, |member| &new_items[member.index.0]);
      diff.extend(self.make_prop_diff(&path.index(slot.0), old_value, new_value)?);
    }
    Ok(diff)
  }

  /// Hashes each element of a set's array form into an occurrence map. An
  /// element whose hash function panics is logged and recorded without a
  /// content identity, so it matches nothing on the other side but its
  /// addition or removal still surfaces.
  pub(crate) fn calculate_set_hash_index_map(
    &self,
    path: &PropertyPath,
    schema: &Schema,
    items: &[PropertyValue],
  ) -> HashIndexMap {
    let mut hashes = HashIndexMap::new();
    for (i, item) in items.iter().enumerate() {
      let hash = match guarded_element_hash(schema, item) {
        Ok(hash) => SetHash::Content(hash),
        Err(message) => {
          warn!(
            path = %path,
            index = i,
            panic = %message,
            "failed to hash set element, treating as unmatched"
          );
          SetHash::Unhashable(i)
        }
      };
      hashes.entry(hash).or_default().push(ArrayIndex(i));
    }
    hashes
  }

  /// Re-keys additions and changed pairs to the slots the caller's declared
  /// inputs hold those elements at. Each input position is claimed at most
  /// once; a planned element with no input counterpart was introduced by
  /// the provider during planning and keeps its planned slot.
  fn match_new_indices_to_inputs(
    &self,
    path: &PropertyPath,
    schema: &Schema,
    changes: ChangesIndexMap,
    old_hashes: &HashIndexMap,
    new_hashes: &HashIndexMap,
  ) -> ChangesIndexMap {
    let Some(PropertyValue::Array(input_items)) = path.get_from(self.new_inputs) else {
      return changes;
    };
    let input_hashes = self.calculate_set_hash_index_map(path, schema, input_items);

    // Input occurrences holding unchanged content are spoken for, so a
    // surplus addition of duplicate content lands on the occurrence the
    // caller actually added rather than on one that was already there.
    let mut used = BTreeSet::new();
    for (hash, old_indices) in old_hashes {
      if !hash.matchable() {
        continue;
      }
      let unchanged = new_hashes.get(hash).map_or(0, Vec::len).min(old_indices.len());
      if let Some(positions) = input_hashes.get(hash) {
        used.extend(positions.iter().copied().take(unchanged));
      }
    }

    let mut matched = ChangesIndexMap::new();
    for (slot, pair) in changes {
      let target = match pair.new {
        Some(member) => match claim_input_index(&input_hashes, member.hash, &mut used) {
          Some(input_index) => input_index,
          None => {
            debug!(path = %path, index = slot.0, "additional changes detected in set");
            slot
          }
        },
        None => slot,
      };
      place(&mut matched, target, slot, pair, path);
    }
    matched
  }
}

fn guarded_element_hash(schema: &Schema, item: &PropertyValue) -> std::result::Result<i64, String> {
  panic::catch_unwind(AssertUnwindSafe(|| schema.element_hash(item))).map_err(panic_message)
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "non-string panic payload".to_string()
  }
}

/// The first input position holding an element with this hash that no
/// earlier change has claimed.
fn claim_input_index(
  inputs: &HashIndexMap,
  hash: SetHash,
  used: &mut BTreeSet<ArrayIndex>,
) -> Option<ArrayIndex> {
  if !hash.matchable() {
    return None;
  }
  let index = inputs.get(&hash)?.iter().copied().find(|index| !used.contains(index))?;
  used.insert(index);
  Some(index)
}

/// Merges a pair into the slot map without losing either side. If the
/// preferred slot already holds the same side, fall back to the original
/// slot, then walk forward to the first slot that can take the pair. A pair
/// that lands anywhere but its preferred slot is a best-effort guess and is
/// logged as such.
fn place(
  matched: &mut ChangesIndexMap,
  preferred: ArrayIndex,
  original: ArrayIndex,
  pair: HashPair,
  path: &PropertyPath,
) {
  let mut target = if can_place(matched, preferred, &pair) { preferred } else { original };
  while !can_place(matched, target, &pair) {
    target = ArrayIndex(target.0 + 1);
  }
  if target != preferred {
    debug!(path = %path, index = target.0, "additional changes detected in set");
  }
  let slot = matched.entry(target).or_default();
  if pair.old.is_some() {
    slot.old = pair.old;
  }
  if pair.new.is_some() {
    slot.new = pair.new;
  }
}

fn can_place(matched: &ChangesIndexMap, slot: ArrayIndex, pair: &HashPair) -> bool {
  match matched.get(&slot) {
    None => true,
    Some(existing) => {
      !(existing.old.is_some() && pair.old.is_some())
        && !(existing.new.is_some() && pair.new.is_some())
    }
  }
}
