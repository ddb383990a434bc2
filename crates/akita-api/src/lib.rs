//! JSON REST API for Akita Connect pedigrees.
//!
//! Exposes an axum [`Router`] backed by any [`akita_core::store::AnimalStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", akita_api::api_router(store.clone(), PedigreeSettings::default()))
//! ```

pub mod ancestors;
pub mod animals;
pub mod error;
pub mod orphans;
pub mod pedigree;

use std::sync::Arc;

use akita_core::{
  pedigree::{DEFAULT_PEDIGREE_DEPTH, MAX_PEDIGREE_DEPTH},
  store::AnimalStore,
};
use axum::{
  Router,
  routing::{get, post, put},
};
use serde::Deserialize;

pub use error::ApiError;

// ─── Settings ────────────────────────────────────────────────────────────────

/// Pedigree behaviour that the hosting process may tune.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PedigreeSettings {
  /// Generations returned when the request gives no `depth`.
  pub default_depth:         u8,
  /// Upper bound on a requested `depth`.
  pub max_depth:             u8,
  /// Reject a sire that is not male or a dam that is not female when linking.
  pub enforce_parent_gender: bool,
}

impl Default for PedigreeSettings {
  fn default() -> Self {
    Self {
      default_depth:         DEFAULT_PEDIGREE_DEPTH,
      max_depth:             MAX_PEDIGREE_DEPTH,
      enforce_parent_gender: false,
    }
  }
}

impl PedigreeSettings {
  /// The depth to assemble for a request asking for `requested`.
  pub fn depth(&self, requested: Option<u8>) -> u8 {
    requested
      .unwrap_or(self.default_depth)
      .min(self.max_depth)
      .min(MAX_PEDIGREE_DEPTH)
  }
}

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub settings: Arc<PedigreeSettings>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      settings: Arc::clone(&self.settings),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, settings: PedigreeSettings) -> Router<()>
where
  S: AnimalStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let state = ApiState {
    store,
    settings: Arc::new(settings),
  };

  Router::new()
    // Animals
    .route("/animals", get(animals::list::<S>).post(animals::create::<S>))
    .route(
      "/animals/{id}",
      get(animals::get_one::<S>).patch(animals::update::<S>),
    )
    // Pedigree
    .route("/animals/{id}/pedigree", get(pedigree::handler::<S>))
    .route("/animals/{id}/ancestors/{slot}", post(ancestors::enroll::<S>))
    .route(
      "/animals/{id}/parents/{slot}",
      put(ancestors::link::<S>).delete(ancestors::unlink::<S>),
    )
    // Recovery
    .route("/orphans", get(orphans::list::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
