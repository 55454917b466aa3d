//! Error types for `kgprompt-core`.

use thiserror::Error;

use crate::validate::ValidationErrors;

#[derive(Debug, Error)]
pub enum Error {
  #[error("entity not found: {0}")]
  EntityNotFound(String),

  #[error("property {property} not found on entity {entity}")]
  PropertyNotFound { entity: String, property: String },

  #[error("relationship not found: {0}")]
  RelationshipNotFound(String),

  /// An edit named a field without the record ids that field lives on.
  #[error("field {0:?} needs a different target")]
  MissingTarget(String),

  #[error("invalid import: {0}")]
  InvalidImport(String),

  #[error("validation failed: {0}")]
  ValidationFailed(Box<ValidationErrors>),

  #[error("unknown action: {0:?}")]
  UnknownAction(String),

  #[error("unknown field: {0:?}")]
  UnknownField(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// A [`crate::store::StateStore`] backend failed.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
