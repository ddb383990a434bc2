//! Error type for `akita-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown {kind} value in database: {value:?}")]
  UnknownEnum { kind: &'static str, value: String },

  /// Registered names are unique across the registry.
  #[error("an animal registered as {0:?} already exists")]
  DuplicateRegisteredName(String),

  #[error("animal id {0:?} is already taken")]
  DuplicateId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
