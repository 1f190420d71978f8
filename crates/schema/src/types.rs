//! Provider-declared schemas for resource properties.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use provlink_property::PropertyValue;

use crate::hash::default_set_hash;

/// The labelled property schemas of a resource or of a block element.
pub type SchemaMap = BTreeMap<String, Schema>;

/// A provider-supplied identity hash for set elements. Must agree with the
/// hashes the provider recorded in prior state for matching to work.
pub type SetHashFn = Arc<dyn Fn(&PropertyValue) -> i64 + Send + Sync>;

/// The value kind a schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
  String,
  Bool,
  Int,
  Float,

  /// An ordered sequence compared position by position.
  List,

  /// An unordered collection compared by element identity hash.
  Set,

  /// String-keyed values compared key by key.
  Map,

  /// A fixed set of named fields.
  Object,
}

impl SchemaKind {
  /// True for kinds whose values contain other values.
  pub fn is_collection(self) -> bool {
    matches!(self, SchemaKind::List | SchemaKind::Set | SchemaKind::Map)
  }
}

/// What a collection's elements look like.
#[derive(Debug, Clone)]
pub enum SchemaElem {
  /// Homogeneous elements described by one schema.
  Value(Box<Schema>),

  /// Block elements: each element is an object with these fields.
  Fields(SchemaMap),
}

/// The schema of a single property.
#[derive(Clone)]
pub struct Schema {
  pub kind: SchemaKind,

  /// Element description for collections, field set for objects.
  pub elem: Option<SchemaElem>,

  /// Changing this property requires replacing the resource.
  pub force_new: bool,

  /// The collection holds at most one element and is projected as the
  /// element itself rather than as a single-element collection.
  pub max_items_one: bool,

  /// The provider fills this value in; it is not set from inputs.
  pub computed: bool,

  /// Set-element identity hash. `None` uses [`default_set_hash`].
  pub set_hash: Option<SetHashFn>,
}

impl Schema {
  pub fn new(kind: SchemaKind) -> Schema {
    Schema {
      kind,
      elem: None,
      force_new: false,
      max_items_one: false,
      computed: false,
      set_hash: None,
    }
  }

  pub fn string() -> Schema {
    Schema::new(SchemaKind::String)
  }

  pub fn bool() -> Schema {
    Schema::new(SchemaKind::Bool)
  }

  pub fn int() -> Schema {
    Schema::new(SchemaKind::Int)
  }

  pub fn float() -> Schema {
    Schema::new(SchemaKind::Float)
  }

  pub fn list() -> Schema {
    Schema::new(SchemaKind::List)
  }

  pub fn set() -> Schema {
    Schema::new(SchemaKind::Set)
  }

  pub fn map() -> Schema {
    Schema::new(SchemaKind::Map)
  }

  pub fn object(fields: SchemaMap) -> Schema {
    Schema::new(SchemaKind::Object).with_elem(SchemaElem::Fields(fields))
  }

  pub fn list_of(elem: Schema) -> Schema {
    Schema::list().with_elem(SchemaElem::Value(Box::new(elem)))
  }

  pub fn set_of(elem: Schema) -> Schema {
    Schema::set().with_elem(SchemaElem::Value(Box::new(elem)))
  }

  pub fn with_elem(mut self, elem: SchemaElem) -> Schema {
    self.elem = Some(elem);
    self
  }

  pub fn force_new(mut self) -> Schema {
    self.force_new = true;
    self
  }

  pub fn max_items_one(mut self) -> Schema {
    self.max_items_one = true;
    self
  }

  pub fn computed(mut self) -> Schema {
    self.computed = true;
    self
  }

  pub fn with_set_hash(mut self, hash: SetHashFn) -> Schema {
    self.set_hash = Some(hash);
    self
  }

  /// The identity hash of a set element under this schema.
  pub fn element_hash(&self, value: &PropertyValue) -> i64 {
    match &self.set_hash {
      Some(hash) => hash(value),
      None => default_set_hash(value),
    }
  }
}

impl fmt::Debug for Schema {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Schema")
      .field("kind", &self.kind)
      .field("elem", &self.elem)
      .field("force_new", &self.force_new)
      .field("max_items_one", &self.max_items_one)
      .field("computed", &self.computed)
      .field("set_hash", &self.set_hash.as_ref().map(|_| "custom"))
      .finish()
  }
}
