//! Replacement triggers: which changes force the resource to be recreated.

use provlink_property::{PropertyPath, PropertyValue};

use crate::differ::Differ;

impl Differ<'_> {
  /// True when the schema at this path, or at any ancestor, is force-new.
  /// A force-new collection or block makes every change inside it a
  /// replacement. Positions the schema cannot resolve never force.
  pub(crate) fn path_triggers_replacement(&self, path: &PropertyPath) -> bool {
    (1..=path.len()).any(|len| {
      self.lookup(&path.prefix(len)).map(|resolved| resolved.forces_new()).unwrap_or(false)
    })
  }

  /// True when the path forces replacement, or any position inside `value`
  /// does. Used when a whole subtree appears or disappears and the walk
  /// will not visit its children individually.
  pub(crate) fn value_triggers_replacement(
    &self,
    path: &PropertyPath,
    value: &PropertyValue,
  ) -> bool {
    if self.path_triggers_replacement(path) {
      return true;
    }
    match value {
      PropertyValue::Array(items) => items
        .iter()
        .enumerate()
        .any(|(i, item)| self.value_triggers_replacement(&path.index(i), item)),
      PropertyValue::Object(fields) => fields
        .iter()
        .any(|(name, field)| self.value_triggers_replacement(&path.field(name.as_str()), field)),
      _ => false,
    }
  }
}
