//! Property paths: typed addresses into a property tree.
//!
//! A [`PropertyPath`] is a sequence of segments, each either a field name or
//! an array index. Paths render to and parse from the engine's canonical
//! string form:
//!
//! - the first name is bare, later names are dot-separated: `disk.size`
//! - indices use brackets: `disks[2].size`
//! - names containing `.`, `[`, `]`, or `"` are quoted in brackets with
//!   backslash escapes for quotes: `tags["my.key"]`
//!
//! # Example
//!
//! ```
//! use provlink_property::PropertyPath;
//!
//! let path = PropertyPath::root("disks").index(1).field("size");
//! assert_eq!(path.to_string(), "disks[1].size");
//! assert_eq!(PropertyPath::parse("disks[1].size").unwrap(), path);
//! ```

use std::fmt;

use thiserror::Error;

use crate::reserved;
use crate::value::{PropertyMap, PropertyValue};

/// One step into a property tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PathSegment {
  /// A field of an object or a key of a map.
  Name(String),

  /// A position in an array.
  Index(usize),
}

/// A typed address into a property tree.
///
/// Paths order lexicographically by segment, which keeps diff output sorted
/// parent-before-child.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct PropertyPath {
  segments: Vec<PathSegment>,
}

impl PropertyPath {
  /// A path consisting of a single top-level property name.
  pub fn root(name: impl Into<String>) -> PropertyPath {
    PropertyPath { segments: vec![PathSegment::Name(name.into())] }
  }

  /// Extends the path with an object field.
  pub fn field(&self, name: impl Into<String>) -> PropertyPath {
    self.with_segment(PathSegment::Name(name.into()))
  }

  /// Extends the path with a map key. Keys and fields share a segment form;
  /// the distinction lives in the schema, not the path.
  pub fn key(&self, name: impl Into<String>) -> PropertyPath {
    self.field(name)
  }

  /// Extends the path with an array index.
  pub fn index(&self, index: usize) -> PropertyPath {
    self.with_segment(PathSegment::Index(index))
  }

  /// Extends the path with an already-built segment.
  pub fn with_segment(&self, segment: PathSegment) -> PropertyPath {
    let mut segments = self.segments.clone();
    segments.push(segment);
    PropertyPath { segments }
  }

  pub fn segments(&self) -> &[PathSegment] {
    &self.segments
  }

  pub fn len(&self) -> usize {
    self.segments.len()
  }

  pub fn is_empty(&self) -> bool {
    self.segments.is_empty()
  }

  pub fn last(&self) -> Option<&PathSegment> {
    self.segments.last()
  }

  /// The path with its final segment removed, or `None` at the root.
  pub fn parent(&self) -> Option<PropertyPath> {
    if self.segments.is_empty() {
      return None;
    }
    Some(PropertyPath { segments: self.segments[..self.segments.len() - 1].to_vec() })
  }

  /// The first `len` segments as a path.
  pub fn prefix(&self, len: usize) -> PropertyPath {
    PropertyPath { segments: self.segments[..len.min(self.segments.len())].to_vec() }
  }

  /// True when `self` is a prefix of `other` (or equal to it).
  pub fn contains(&self, other: &PropertyPath) -> bool {
    self.segments.len() <= other.segments.len()
      && self.segments == other.segments[..self.segments.len()]
  }

  /// True when the path's final segment names an internal bookkeeping key.
  pub fn is_reserved(&self) -> bool {
    match self.segments.last() {
      Some(PathSegment::Name(name)) => reserved::is_reserved_key(name),
      _ => false,
    }
  }

  /// Walks the path through a property map, returning the addressed value if
  /// every step resolves.
  pub fn get_from<'a>(&self, map: &'a PropertyMap) -> Option<&'a PropertyValue> {
    let mut segments = self.segments.iter();
    let first = match segments.next()? {
      PathSegment::Name(name) => map.get(name)?,
      PathSegment::Index(_) => return None,
    };
    segments.try_fold(first, |value, segment| match (value, segment) {
      (PropertyValue::Object(fields), PathSegment::Name(name)) => fields.get(name),
      (PropertyValue::Array(items), PathSegment::Index(i)) => items.get(*i),
      _ => None,
    })
  }

  /// Parses the canonical string form back into a path.
  pub fn parse(input: &str) -> Result<PropertyPath, PathParseError> {
    if input.is_empty() {
      return Err(PathParseError::Empty);
    }

    let mut segments = Vec::new();
    let mut chars = input.char_indices().peekable();

    // A leading name, then any mix of `.name`, `[index]`, and `["key"]`.
    loop {
      match chars.peek().copied() {
        None => break,
        Some((pos, '.')) => {
          chars.next();
          let name = take_plain_name(&mut chars)?;
          if name.is_empty() {
            return Err(PathParseError::EmptySegment(pos));
          }
          segments.push(PathSegment::Name(name));
        }
        Some((pos, '[')) => {
          chars.next();
          match chars.peek().copied() {
            Some((_, '"')) => {
              chars.next();
              let key = take_quoted_key(&mut chars, pos)?;
              segments.push(PathSegment::Name(key));
            }
            _ => {
              let mut digits = String::new();
              while let Some((_, c)) = chars.peek().copied()
                && c.is_ascii_digit()
              {
                digits.push(c);
                chars.next();
              }
              match chars.next() {
                Some((_, ']')) if !digits.is_empty() => {
                  let index = digits.parse().map_err(|_| PathParseError::InvalidIndex(pos))?;
                  segments.push(PathSegment::Index(index));
                }
                Some(_) | None => return Err(PathParseError::InvalidIndex(pos)),
              }
            }
          }
        }
        Some((pos, c)) => {
          if !segments.is_empty() {
            return Err(PathParseError::Unexpected(pos, c));
          }
          let name = take_plain_name(&mut chars)?;
          if name.is_empty() {
            return Err(PathParseError::EmptySegment(pos));
          }
          segments.push(PathSegment::Name(name));
        }
      }
    }

    if segments.is_empty() {
      return Err(PathParseError::Empty);
    }
    Ok(PropertyPath { segments })
  }
}

impl fmt::Display for PropertyPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, segment) in self.segments.iter().enumerate() {
      match segment {
        PathSegment::Name(name) if needs_quoting(name) => {
          write!(f, "[\"{}\"]", name.replace('"', "\\\""))?;
        }
        PathSegment::Name(name) => {
          if i > 0 {
            write!(f, ".")?;
          }
          write!(f, "{name}")?;
        }
        PathSegment::Index(index) => write!(f, "[{index}]")?,
      }
    }
    Ok(())
  }
}

/// A malformed canonical path string. Positions are byte offsets into the
/// input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathParseError {
  #[error("empty path")]
  Empty,

  #[error("empty path segment at position {0}")]
  EmptySegment(usize),

  #[error("unclosed bracket at position {0}")]
  UnclosedBracket(usize),

  #[error("invalid index at position {0}")]
  InvalidIndex(usize),

  #[error("unexpected character '{1}' at position {0}")]
  Unexpected(usize, char),
}

fn needs_quoting(name: &str) -> bool {
  name.contains(['.', '[', ']', '"'])
}

fn take_plain_name(
  chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<String, PathParseError> {
  let mut name = String::new();
  while let Some((pos, c)) = chars.peek().copied() {
    match c {
      '.' | '[' => break,
      ']' => return Err(PathParseError::Unexpected(pos, c)),
      _ => {
        name.push(c);
        chars.next();
      }
    }
  }
  Ok(name)
}

fn take_quoted_key(
  chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
  open: usize,
) -> Result<String, PathParseError> {
  let mut key = String::new();
  while let Some((_, c)) = chars.next() {
    match c {
      '\\' => match chars.next() {
        Some((_, escaped)) => key.push(escaped),
        None => return Err(PathParseError::UnclosedBracket(open)),
      },
      '"' => match chars.next() {
        Some((_, ']')) => return Ok(key),
        Some((pos, other)) => return Err(PathParseError::Unexpected(pos, other)),
        None => return Err(PathParseError::UnclosedBracket(open)),
      },
      _ => key.push(c),
    }
  }
  Err(PathParseError::UnclosedBracket(open))
}
