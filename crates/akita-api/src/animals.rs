//! Handlers for `/animals` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/animals` | Optional `?owner_id`, `gender`, `q`, `limit`, `offset` |
//! | `POST`  | `/animals` | Body: [`NewAnimal`]; returns 201 + stored animal; parent ids must exist |
//! | `GET`   | `/animals/{id}` | 404 if not found |
//! | `PATCH` | `/animals/{id}` | Body: [`AnimalPatch`]; 404 if not found |

use akita_core::{
  animal::{Animal, AnimalId, AnimalPatch, Gender, NewAnimal},
  enroll::{ParentagePolicy, check_new_parents},
  store::{AnimalQuery, AnimalStore},
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub owner_id: Option<String>,
  pub gender:   Option<Gender>,
  /// Substring of the registered or call name.
  pub q:        Option<String>,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

/// `GET /animals[?owner_id=...][&gender=male|female][&q=...]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Animal>>, ApiError>
where
  S: AnimalStore,
{
  let query = AnimalQuery {
    owner_id: params.owner_id,
    gender:   params.gender,
    text:     params.q.filter(|q| !q.trim().is_empty()),
    limit:    params.limit,
    offset:   params.offset,
  };
  let animals = state
    .store
    .list_animals(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(animals))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /animals`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewAnimal>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AnimalStore,
{
  body.validate()?;
  let policy = ParentagePolicy {
    enforce_gender: state.settings.enforce_parent_gender,
  };
  check_new_parents(state.store.as_ref(), &body, policy).await?;
  let animal = state
    .store
    .create_animal(body)
    .await
    .map_err(write_error::<S>)?;
  tracing::info!(id = %animal.id, "created animal");
  Ok((StatusCode::CREATED, Json(animal)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /animals/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<AnimalId>,
) -> Result<Json<Animal>, ApiError>
where
  S: AnimalStore,
{
  let animal = state
    .store
    .get_animal(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("animal {id} not found")))?;
  Ok(Json(animal))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /animals/{id}`
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<AnimalId>,
  Json(patch): Json<AnimalPatch>,
) -> Result<Json<Animal>, ApiError>
where
  S: AnimalStore,
{
  patch.validate()?;
  let animal = state
    .store
    .update_animal(&id, patch)
    .await
    .map_err(write_error::<S>)?
    .ok_or_else(|| ApiError::NotFound(format!("animal {id} not found")))?;
  Ok(Json(animal))
}

/// A write the store refused because of existing data is the caller's
/// problem; anything else is ours.
pub(crate) fn write_error<S: AnimalStore>(e: S::Error) -> ApiError {
  if S::is_conflict(&e) {
    ApiError::Unprocessable(e.to_string())
  } else {
    ApiError::store(e)
  }
}
