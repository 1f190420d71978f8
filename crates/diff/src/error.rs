use provlink_schema::SchemaError;
use thiserror::Error;

/// An error produced while computing a diff.
///
/// Only structural contradictions between the walked data and the declared
/// schema are errors; exhausted schema information degrades to plain value
/// comparison instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiffError {
  #[error(transparent)]
  Schema(#[from] SchemaError),
}
