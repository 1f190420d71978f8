//! Public diff output types and caller options.

use std::collections::BTreeMap;

use provlink_property::PropertyPath;
use serde::{Deserialize, Serialize};

/// Paths with changes, keyed structurally while the diff is being built.
/// Stringified only at the output boundary.
pub(crate) type DiffMap = BTreeMap<PropertyPath, DiffKind>;

/// The kind of change detected at one property path.
///
/// The replace-flavored variants mark changes the provider can only honor
/// by destroying and recreating the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffKind {
  Add,
  AddReplace,
  Delete,
  DeleteReplace,
  Update,
  UpdateReplace,
}

impl DiffKind {
  pub fn is_replace(self) -> bool {
    matches!(self, DiffKind::AddReplace | DiffKind::DeleteReplace | DiffKind::UpdateReplace)
  }

  /// The replace-flavored version of this kind.
  pub fn promote(self) -> DiffKind {
    match self {
      DiffKind::Add | DiffKind::AddReplace => DiffKind::AddReplace,
      DiffKind::Delete | DiffKind::DeleteReplace => DiffKind::DeleteReplace,
      DiffKind::Update | DiffKind::UpdateReplace => DiffKind::UpdateReplace,
    }
  }

  /// The in-place version of this kind.
  pub fn demote(self) -> DiffKind {
    match self {
      DiffKind::Add | DiffKind::AddReplace => DiffKind::Add,
      DiffKind::Delete | DiffKind::DeleteReplace => DiffKind::Delete,
      DiffKind::Update | DiffKind::UpdateReplace => DiffKind::Update,
    }
  }
}

/// Whether an update carries any changes at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffChanges {
  None,
  Some,
}

/// A computed diff: changed properties keyed by canonical path string.
///
/// Serializes as a flat JSON object, path to kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetailedDiff {
  entries: BTreeMap<String, DiffKind>,
}

impl DetailedDiff {
  pub(crate) fn from_paths(diff: DiffMap) -> DetailedDiff {
    let entries = diff.into_iter().map(|(path, kind)| (path.to_string(), kind)).collect();
    DetailedDiff { entries }
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// The change recorded at a canonical path string, if any.
  pub fn get(&self, path: &str) -> Option<DiffKind> {
    self.entries.get(path).copied()
  }

  /// All entries in path order.
  pub fn entries(&self) -> impl Iterator<Item = (&str, DiffKind)> {
    self.entries.iter().map(|(path, kind)| (path.as_str(), *kind))
  }

  /// The overall change signal: [`DiffChanges::Some`] exactly when at least
  /// one entry is present.
  pub fn changes(&self) -> DiffChanges {
    if self.entries.is_empty() { DiffChanges::None } else { DiffChanges::Some }
  }

  pub fn has_changes(&self) -> bool {
    !self.entries.is_empty()
  }

  /// True when any entry requires replacing the resource.
  pub fn contains_replace(&self) -> bool {
    self.entries.values().any(|kind| kind.is_replace())
  }
}

/// Caller knobs for one diff computation.
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
  /// Canonical path strings whose changes are dropped from the result,
  /// along with everything beneath them.
  pub ignore_changes: Vec<String>,

  /// Forces the replace question independently of property changes.
  /// `Some(true)` guarantees a replace is signalled, `Some(false)` strips
  /// replace flavoring entirely, `None` leaves the computed result alone.
  pub replace_override: Option<bool>,
}
