//! Dynamically-typed property values exchanged with the orchestration engine.
//!
//! A resource's recorded state and proposed inputs arrive as nested trees of
//! [`PropertyValue`]. Two variants fall outside plain data:
//!
//! - [`PropertyValue::Computed`] marks a value that is not yet known and only
//!   resolves when the operation is applied.
//! - [`PropertyValue::Secret`] wraps a value whose display is sensitive.
//!   Secrecy has no bearing on change detection, so diffing strips these
//!   wrappers up front via [`strip_secrets_map`].

use std::collections::BTreeMap;

/// The named properties of a resource or nested object.
///
/// `BTreeMap` keeps key iteration deterministic, which the diff engine
/// relies on for stable output ordering.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A single value in a resource's property tree.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
  /// No value. Also the canonical representation of an absent field.
  Null,

  Bool(bool),

  /// All numbers travel as doubles, matching the engine's wire model.
  Number(f64),

  String(String),

  /// An ordered sequence. Lists and sets both arrive as arrays; the schema
  /// decides which comparison semantics apply.
  Array(Vec<PropertyValue>),

  /// A nested object or map keyed by strings.
  Object(PropertyMap),

  /// A value unknown until the operation is applied.
  Computed,

  /// A sensitive value. Compares by its inner value.
  Secret(Box<PropertyValue>),
}

impl PropertyValue {
  /// True when the value is `Null`.
  pub fn is_null(&self) -> bool {
    matches!(self, PropertyValue::Null)
  }

  /// True when the value is the computed (unknown) marker.
  pub fn is_computed(&self) -> bool {
    matches!(self, PropertyValue::Computed)
  }

  /// True when a value is actually there: anything but `Null`. An empty
  /// array or object is present-but-empty, and a computed value counts as
  /// present.
  pub fn is_present(&self) -> bool {
    !self.is_null()
  }

  /// Builds a value from plain JSON.
  ///
  /// Computed and secret markers have no JSON form and must be constructed
  /// explicitly; everything else maps one-to-one.
  pub fn from_json(value: serde_json::Value) -> PropertyValue {
    match value {
      serde_json::Value::Null => PropertyValue::Null,
      serde_json::Value::Bool(b) => PropertyValue::Bool(b),
      serde_json::Value::Number(n) => PropertyValue::Number(n.as_f64().unwrap_or_default()),
      serde_json::Value::String(s) => PropertyValue::String(s),
      serde_json::Value::Array(items) => {
        PropertyValue::Array(items.into_iter().map(PropertyValue::from_json).collect())
      }
      serde_json::Value::Object(fields) => {
        PropertyValue::Object(fields.into_iter().map(|(k, v)| (k, PropertyValue::from_json(v))).collect())
      }
    }
  }
}

/// Builds a property map from a JSON object.
///
/// Non-object JSON yields an empty map; this is a fixture convenience, not a
/// deserializer.
pub fn map_from_json(value: serde_json::Value) -> PropertyMap {
  match PropertyValue::from_json(value) {
    PropertyValue::Object(fields) => fields,
    _ => PropertyMap::new(),
  }
}

/// Removes secret wrappers from an entire value tree.
pub fn strip_secrets(value: PropertyValue) -> PropertyValue {
  match value {
    PropertyValue::Secret(inner) => strip_secrets(*inner),
    PropertyValue::Array(items) => PropertyValue::Array(items.into_iter().map(strip_secrets).collect()),
    PropertyValue::Object(fields) => {
      PropertyValue::Object(fields.into_iter().map(|(k, v)| (k, strip_secrets(v))).collect())
    }
    other => other,
  }
}

/// Removes secret wrappers from every value in a property map.
pub fn strip_secrets_map(map: PropertyMap) -> PropertyMap {
  map.into_iter().map(|(k, v)| (k, strip_secrets(v))).collect()
}
