//! Reserved bookkeeping keys that live inside property maps but are not
//! resource properties.

/// Records which property values were filled in from schema defaults.
pub const DEFAULTS_KEY: &str = "__defaults";

/// Carries per-resource engine metadata, including the marker entry emitted
/// when a replace is forced by something other than a property change.
pub const META_KEY: &str = "__meta";

/// True for keys the diff walk must skip.
pub fn is_reserved_key(name: &str) -> bool {
  name == DEFAULTS_KEY || name == META_KEY
}
