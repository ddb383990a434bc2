//! The `AnimalStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `akita-store-sqlite`).
//! Higher layers (`akita-api`, the assembler, enrollment) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::animal::{Animal, AnimalId, AnimalPatch, Gender, NewAnimal, Slot};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`AnimalStore::list_animals`].
#[derive(Debug, Clone, Default)]
pub struct AnimalQuery {
  /// Restrict to animals owned by this user.
  pub owner_id: Option<String>,
  pub gender:   Option<Gender>,
  /// Case-insensitive substring match over registered and call names.
  pub text:     Option<String>,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an animal registry backend.
///
/// Animals are never deleted. Parent links are plain nullable references;
/// the store does not check that they point at existing animals, nor that
/// the resulting graph is acyclic.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AnimalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Whether `error` is a conflict with existing data (a taken name or id)
  /// rather than a backend failure. Backends without such constraints keep
  /// the default.
  fn is_conflict(_error: &Self::Error) -> bool { false }

  /// Persist a new animal. The store assigns its id and timestamps.
  fn create_animal(
    &self,
    input: NewAnimal,
  ) -> impl Future<Output = Result<Animal, Self::Error>> + Send + '_;

  /// Retrieve an animal by id. Returns `None` if not found.
  fn get_animal<'a>(
    &'a self,
    id: &'a AnimalId,
  ) -> impl Future<Output = Result<Option<Animal>, Self::Error>> + Send + 'a;

  /// Retrieve several animals at once. Ids that do not resolve are absent
  /// from the result; order is unspecified.
  fn get_animals<'a>(
    &'a self,
    ids: &'a [AnimalId],
  ) -> impl Future<Output = Result<Vec<Animal>, Self::Error>> + Send + 'a;

  /// List animals matching `query`.
  fn list_animals<'a>(
    &'a self,
    query: &'a AnimalQuery,
  ) -> impl Future<Output = Result<Vec<Animal>, Self::Error>> + Send + 'a;

  /// Apply `patch` to an animal. Returns `None` if the animal does not exist.
  fn update_animal<'a>(
    &'a self,
    id: &'a AnimalId,
    patch: AnimalPatch,
  ) -> impl Future<Output = Result<Option<Animal>, Self::Error>> + Send + 'a;

  /// Overwrite (or clear, with `None`) the parent reference in `slot`.
  ///
  /// Last write wins. Returns the updated animal, or `None` if `id` does not
  /// exist.
  fn set_parent<'a>(
    &'a self,
    id: &'a AnimalId,
    slot: Slot,
    parent: Option<AnimalId>,
  ) -> impl Future<Output = Result<Option<Animal>, Self::Error>> + Send + 'a;

  /// Enrolled animals that no animal references as sire or dam — the
  /// leftovers of enrollments whose link step failed.
  fn list_orphans<'a>(
    &'a self,
    owner_id: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<Animal>, Self::Error>> + Send + 'a;
}
