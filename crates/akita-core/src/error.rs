//! Error types for `akita-core`.

use thiserror::Error;

use crate::animal::{Animal, AnimalId, Gender, Slot};

/// Boxed backend error, so generic code can carry any store's error type.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("animal not found: {0}")]
  NotFound(AnimalId),

  #[error("invalid {field}: {reason}")]
  InvalidField {
    field:  &'static str,
    reason: String,
  },

  /// An animal appears among its own ancestors. `path` runs from the root to
  /// the repeated id, inclusive at both ends of the cycle.
  #[error("ancestry cycle detected: {}", display_path(.path))]
  AncestryCycle { path: Vec<AnimalId> },

  /// Enrollment could not create the ancestor record; the subject is
  /// unchanged.
  #[error("failed to create ancestor: {reason}")]
  CreateFailed {
    reason: String,
    #[source]
    source: Option<StoreError>,
  },

  /// Enrollment created the ancestor but could not link it into the
  /// subject's slot. The orphaned record is carried for manual recovery.
  #[error("created ancestor {} but failed to link it as {slot}: {reason}", .orphan.id)]
  LinkFailed {
    orphan: Box<Animal>,
    slot:   Slot,
    reason: String,
  },

  #[error("{slot} must be {expected}, but {parent} is {actual}")]
  ParentGenderMismatch {
    parent:   AnimalId,
    slot:     Slot,
    expected: Gender,
    actual:   Gender,
  },

  #[error("animal {0} cannot be its own parent")]
  SelfParent(AnimalId),

  #[error("store error: {0}")]
  Store(#[source] StoreError),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

fn display_path(path: &[AnimalId]) -> String {
  path
    .iter()
    .map(AnimalId::as_str)
    .collect::<Vec<_>>()
    .join(" -> ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
