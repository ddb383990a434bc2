//! Handlers for filling and clearing parent slots.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/animals/{id}/ancestors/{slot}` | Body: [`EnrollmentFields`]; creates and links a new ancestor, 201 |
//! | `PUT`    | `/animals/{id}/parents/{slot}` | Body: `{"parent_id":"..."}`; links an existing animal |
//! | `DELETE` | `/animals/{id}/parents/{slot}` | Clears the slot |
//!
//! `{slot}` is `sire` or `dam`.

use akita_core::{
  animal::{Animal, AnimalId, Slot},
  enroll::{
    EnrollmentFields,
    ParentagePolicy,
    enroll_ancestor,
    link_parent,
    unlink_parent,
  },
  store::AnimalStore,
};
use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

// ─── Enroll ───────────────────────────────────────────────────────────────────

/// `POST /animals/{id}/ancestors/{slot}`
pub async fn enroll<S>(
  State(state): State<ApiState<S>>,
  Path((id, slot)): Path<(AnimalId, Slot)>,
  Json(fields): Json<EnrollmentFields>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AnimalStore,
{
  let ancestor = enroll_ancestor(state.store.as_ref(), &id, slot, fields).await?;
  Ok((StatusCode::CREATED, Json(ancestor)))
}

// ─── Link ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LinkBody {
  pub parent_id: AnimalId,
}

/// `PUT /animals/{id}/parents/{slot}`
pub async fn link<S>(
  State(state): State<ApiState<S>>,
  Path((id, slot)): Path<(AnimalId, Slot)>,
  Json(body): Json<LinkBody>,
) -> Result<Json<Animal>, ApiError>
where
  S: AnimalStore,
{
  let policy = ParentagePolicy {
    enforce_gender: state.settings.enforce_parent_gender,
  };
  let animal =
    link_parent(state.store.as_ref(), &id, slot, &body.parent_id, policy).await?;
  tracing::info!(%id, %slot, parent = %body.parent_id, "linked parent");
  Ok(Json(animal))
}

// ─── Unlink ───────────────────────────────────────────────────────────────────

/// `DELETE /animals/{id}/parents/{slot}`
pub async fn unlink<S>(
  State(state): State<ApiState<S>>,
  Path((id, slot)): Path<(AnimalId, Slot)>,
) -> Result<Json<Animal>, ApiError>
where
  S: AnimalStore,
{
  let animal = unlink_parent(state.store.as_ref(), &id, slot).await?;
  tracing::info!(%id, %slot, "cleared parent");
  Ok(Json(animal))
}
