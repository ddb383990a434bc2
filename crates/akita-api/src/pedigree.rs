//! Handler for `GET /animals/{id}/pedigree`.
//!
//! Returns the assembled [`PedigreeNode`] tree. `?depth=` counts ancestor
//! generations; when absent the configured default is used, and any value
//! is clamped to the configured maximum.

use akita_core::{
  animal::AnimalId,
  pedigree::{PedigreeNode, assemble_pedigree},
  store::AnimalStore,
};
use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct PedigreeParams {
  pub depth: Option<u8>,
}

/// `GET /animals/{id}/pedigree[?depth=N]`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<AnimalId>,
  Query(params): Query<PedigreeParams>,
) -> Result<Json<PedigreeNode>, ApiError>
where
  S: AnimalStore,
{
  let depth = state.settings.depth(params.depth);
  let tree = assemble_pedigree(state.store.as_ref(), &id, depth)
    .await
    .map_err(|e| match e {
      akita_core::Error::NotFound(_) => {
        ApiError::NotFound("no pedigree data available".into())
      }
      other => other.into(),
    })?;

  tracing::debug!(%id, depth, generations = tree.generations(), "served pedigree");
  Ok(Json(tree))
}
