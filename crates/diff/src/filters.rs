//! Post-walk filters applied to the assembled diff, in order: renames,
//! ignores, then the replace override.

use provlink_property::{PathSegment, PropertyPath, reserved};
use tracing::debug;

use crate::differ::Differ;
use crate::types::{DiffKind, DiffMap};

/// Rewrites diff paths through overlay renames. Only name segments that
/// address schema fields are rewritten; map keys and indices pass through
/// untouched. An overlay that renames two properties onto the same engine
/// name merges their entries, keeping the later one; the collision is
/// logged since it loses a diff entry.
pub(crate) fn apply_renames(differ: &Differ<'_>, diff: DiffMap) -> DiffMap {
  let mut renamed = DiffMap::new();
  for (path, kind) in diff {
    let path = rename_path(differ, &path);
    if renamed.insert(path.clone(), kind).is_some() {
      debug!(path = %path, "rename collision merged two diff entries");
    }
  }
  renamed
}

fn rename_path(differ: &Differ<'_>, path: &PropertyPath) -> PropertyPath {
  let mut renamed = PropertyPath::default();
  for (i, segment) in path.segments().iter().enumerate() {
    let segment = match segment {
      PathSegment::Name(name) => {
        // A name is a schema field only if its parent resolves to a field
        // container; otherwise it is a map key and stays as data.
        let parent_is_fields = differ
          .lookup(&path.prefix(i))
          .map(|resolved| resolved.is_field_container())
          .unwrap_or(false);
        let rename = if parent_is_fields {
          differ
            .lookup(&path.prefix(i + 1))
            .ok()
            .and_then(|resolved| resolved.rename().map(str::to_string))
        } else {
          None
        };
        PathSegment::Name(rename.unwrap_or_else(|| name.clone()))
      }
      PathSegment::Index(index) => PathSegment::Index(*index),
    };
    renamed = renamed.with_segment(segment);
  }
  renamed
}

/// Drops entries at or under caller-ignored paths. Entries that do not
/// parse as paths are logged and skipped rather than failing the diff.
pub(crate) fn apply_ignores(diff: DiffMap, ignore_changes: &[String]) -> DiffMap {
  if ignore_changes.is_empty() {
    return diff;
  }
  let mut ignored = Vec::new();
  for raw in ignore_changes {
    match PropertyPath::parse(raw) {
      Ok(path) => ignored.push(path),
      Err(error) => debug!(path = %raw, %error, "skipping unparseable ignore entry"),
    }
  }
  diff.into_iter().filter(|(path, _)| !ignored.iter().any(|prefix| prefix.contains(path))).collect()
}

/// Applies the caller's replace override. `Some(true)` guarantees at least
/// one replace entry; `Some(false)` strips replace flavoring everywhere.
pub(crate) fn apply_replace_override(mut diff: DiffMap, replace_override: Option<bool>) -> DiffMap {
  match replace_override {
    Some(true) => {
      if !diff.values().any(|kind| kind.is_replace()) {
        // The replace is triggered by something other than a property
        // change; a marker entry carries the signal.
        diff.insert(PropertyPath::root(reserved::META_KEY), DiffKind::UpdateReplace);
      }
      diff
    }
    Some(false) => diff.into_iter().map(|(path, kind)| (path, kind.demote())).collect(),
    None => diff,
  }
}
