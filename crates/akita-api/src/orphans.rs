//! `GET /orphans[?owner_id=...]`: enrolled ancestors that nothing links to.

use akita_core::{animal::Animal, store::AnimalStore};
use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct OrphanParams {
  pub owner_id: Option<String>,
}

pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<OrphanParams>,
) -> Result<Json<Vec<Animal>>, ApiError>
where
  S: AnimalStore,
{
  let orphans = state
    .store
    .list_orphans(params.owner_id.as_deref())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(orphans))
}
