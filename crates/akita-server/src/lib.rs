//! HTTP host for the Akita Connect pedigree API.
//!
//! Wires an [`AnimalStore`] into the JSON API under `/api`, adds a health
//! check, request tracing and pedigree ETags.

pub mod etag;

use std::{path::PathBuf, sync::Arc};

use akita_api::PedigreeSettings;
use akita_core::{
  pedigree::{DEFAULT_PEDIGREE_DEPTH, MAX_PEDIGREE_DEPTH},
  store::AnimalStore,
};
use axum::{Router, middleware, routing::get};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `AKITA_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  pub store_path:            PathBuf,
  pub default_depth:         u8,
  pub max_depth:             u8,
  pub enforce_parent_gender: bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                  "127.0.0.1".to_string(),
      port:                  8080,
      store_path:            PathBuf::from("~/.local/share/akita/akita.db"),
      default_depth:         DEFAULT_PEDIGREE_DEPTH,
      max_depth:             MAX_PEDIGREE_DEPTH,
      enforce_parent_gender: false,
    }
  }
}

impl ServerConfig {
  pub fn pedigree_settings(&self) -> PedigreeSettings {
    PedigreeSettings {
      default_depth:         self.default_depth.min(self.max_depth),
      max_depth:             self.max_depth.min(MAX_PEDIGREE_DEPTH),
      enforce_parent_gender: self.enforce_parent_gender,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `store`.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: AnimalStore + 'static,
{
  Router::new()
    .route("/healthz", get(|| async { "ok" }))
    .nest("/api", akita_api::api_router(store, config.pedigree_settings()))
    .layer(middleware::from_fn(etag::pedigree_etag))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  use akita_core::animal::{Gender, NewAnimal};
  use akita_store_sqlite::SqliteStore;
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use tower::ServiceExt as _;

  async fn make_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().await.unwrap())
  }

  async fn get(
    store: Arc<SqliteStore>,
    uri: &str,
    if_none_match: Option<&str>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(tag) = if_none_match {
      builder = builder.header(header::IF_NONE_MATCH, tag);
    }
    let req = builder.body(Body::empty()).unwrap();
    router(store, &ServerConfig::default())
      .oneshot(req)
      .await
      .unwrap()
  }

  #[test]
  fn defaults_fill_an_empty_config() {
    let cfg: ServerConfig = config::Config::builder()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.default_depth, DEFAULT_PEDIGREE_DEPTH);
    assert!(!cfg.enforce_parent_gender);
  }

  #[test]
  fn settings_keep_default_within_maximum() {
    let cfg = ServerConfig {
      default_depth: 8,
      max_depth: 3,
      ..Default::default()
    };
    let settings = cfg.pedigree_settings();
    assert_eq!(settings.max_depth, 3);
    assert_eq!(settings.default_depth, 3);
  }

  #[tokio::test]
  async fn healthz_is_ok() {
    let resp = get(make_store().await, "/healthz", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::ETAG).is_none());
  }

  #[tokio::test]
  async fn pedigree_is_tagged_and_revalidated() {
    let store = make_store().await;
    let hana = store
      .create_animal(NewAnimal::new("Hana", "Hana", Gender::Female, "owner-1"))
      .await
      .unwrap();
    let uri = format!("/api/animals/{}/pedigree", hana.id);

    let first = get(store.clone(), &uri, None).await;
    assert_eq!(first.status(), StatusCode::OK);
    let tag = first
      .headers()
      .get(header::ETAG)
      .unwrap()
      .to_str()
      .unwrap()
      .to_owned();
    let body = axum::body::to_bytes(first.into_body(), usize::MAX)
      .await
      .unwrap();
    let tree: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(tree["id"], hana.id.as_str());

    let again = get(store.clone(), &uri, Some(&tag)).await;
    assert_eq!(again.status(), StatusCode::NOT_MODIFIED);

    let stale = get(store, &uri, Some("\"stale\"")).await;
    assert_eq!(stale.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn missing_pedigree_is_not_tagged() {
    let resp = get(make_store().await, "/api/animals/ghost/pedigree", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.headers().get(header::ETAG).is_none());
  }
}
