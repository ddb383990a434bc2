//! API error type and [`axum::response::IntoResponse`] implementation.

use akita_core::animal::{Animal, AnimalId};
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The request was well formed but the registry refused it.
  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("{message}")]
  Cycle {
    message: String,
    path:    Vec<AnimalId>,
  },

  /// Half-finished enrollment. The body carries the orphan so the caller
  /// can link it by hand.
  #[error("{message}")]
  LinkFailed {
    message: String,
    orphan:  Box<Animal>,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

impl From<akita_core::Error> for ApiError {
  fn from(e: akita_core::Error) -> Self {
    use akita_core::Error as E;

    let message = e.to_string();
    match e {
      E::NotFound(_) => Self::NotFound(message),
      E::InvalidField { .. } => Self::BadRequest(message),
      E::CreateFailed { .. }
      | E::ParentGenderMismatch { .. }
      | E::SelfParent(_) => Self::Unprocessable(message),
      E::AncestryCycle { path } => Self::Cycle { message, path },
      E::LinkFailed { orphan, .. } => Self::LinkFailed { message, orphan },
      E::Store(source) => Self::Store(source),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let message = self.to_string();
    let (status, body) = match self {
      ApiError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "error": message })),
      ApiError::BadRequest(_) => {
        (StatusCode::BAD_REQUEST, json!({ "error": message }))
      }
      ApiError::Unprocessable(_) => {
        (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": message }))
      }
      ApiError::Cycle { path, .. } => {
        (StatusCode::CONFLICT, json!({ "error": message, "cycle": path }))
      }
      ApiError::LinkFailed { orphan, .. } => {
        tracing::error!(orphan = %orphan.id, "{message}");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          json!({ "error": message, "orphan": orphan }),
        )
      }
      ApiError::Store(_) => {
        tracing::error!("{message}");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
      }
    };
    (status, Json(body)).into_response()
  }
}
