//! Presence-based change classification.
//!
//! Every comparison starts by looking only at which sides are present.
//! Values are inspected later, and only for [`BaseDiff::Undecided`].

use provlink_property::PropertyValue;

/// What presence alone says about a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BaseDiff {
  /// Neither side present.
  NoDiff,

  /// Only the new side present.
  Add,

  /// Only the old side present.
  Delete,

  /// Both sides present; the values must be compared.
  Undecided,
}

pub(crate) fn classify(old: &PropertyValue, new: &PropertyValue) -> BaseDiff {
  match (old.is_present(), new.is_present()) {
    (false, false) => BaseDiff::NoDiff,
    (false, true) => BaseDiff::Add,
    (true, false) => BaseDiff::Delete,
    (true, true) => BaseDiff::Undecided,
  }
}
