//! Default content hash for set elements.
//!
//! Set membership is matched by an integer identity hash. Providers may
//! install their own [`SetHashFn`](crate::types::SetHashFn); when they do
//! not, [`default_set_hash`] hashes a canonical string rendering of the
//! value, so equal values always collide and key order never matters.

use provlink_property::PropertyValue;
use sha2::{Digest, Sha256};

/// Hashes a set element by canonical content.
///
/// The value is rendered to a canonical string (sorted object keys, JSON
/// string escaping) and digested with SHA-256; the first eight digest bytes,
/// big-endian, form the hash.
pub fn default_set_hash(value: &PropertyValue) -> i64 {
  let digest = Sha256::digest(canonical_string(value).as_bytes());
  let mut bytes = [0u8; 8];
  bytes.copy_from_slice(&digest[..8]);
  i64::from_be_bytes(bytes)
}

fn canonical_string(value: &PropertyValue) -> String {
  match value {
    PropertyValue::Null => "null".to_string(),
    PropertyValue::Bool(b) => b.to_string(),
    PropertyValue::Number(n) => n.to_string(),
    // JSON string rendering gives unambiguous quoting and escaping.
    PropertyValue::String(s) => serde_json::Value::String(s.clone()).to_string(),
    PropertyValue::Array(items) => {
      let inner: Vec<String> = items.iter().map(canonical_string).collect();
      format!("[{}]", inner.join(","))
    }
    PropertyValue::Object(fields) => {
      let inner: Vec<String> = fields
        .iter()
        .map(|(k, v)| format!("{}:{}", serde_json::Value::String(k.clone()), canonical_string(v)))
        .collect();
      format!("{{{}}}", inner.join(","))
    }
    // An unknown value has no content; a fixed marker keeps the hash total.
    // Bare angle brackets cannot collide with the quoted string rendering.
    PropertyValue::Computed => "<computed>".to_string(),
    PropertyValue::Secret(inner) => canonical_string(inner),
  }
}
