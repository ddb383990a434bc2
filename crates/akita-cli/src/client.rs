//! Async HTTP client wrapping the Akita JSON API.

use std::time::Duration;

use akita_core::{
  animal::{Animal, AnimalId, Slot},
  enroll::EnrollmentFields,
  pedigree::PedigreeNode,
};
use anyhow::{Context, Result, anyhow};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Connection settings for the Akita API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Result of an enrollment request that reached the server.
#[derive(Debug)]
pub enum Enrollment {
  /// Created and linked.
  Linked(Animal),
  /// Created but not linked; `orphan` needs linking by hand.
  Orphaned { orphan: Animal, message: String },
}

/// JSON error body returned by the API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
  error:  String,
  #[serde(default)]
  orphan: Option<Animal>,
}

/// Async HTTP client for the Akita JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  // ── Animals ───────────────────────────────────────────────────────────────

  /// `GET /api/animals`
  pub async fn list_animals(&self) -> Result<Vec<Animal>> {
    let resp = self
      .client
      .get(self.url("/animals"))
      .query(&[("limit", "1000")])
      .send()
      .await
      .context("GET /animals failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /animals → {}", resp.status()));
    }
    resp.json().await.context("deserialising animals")
  }

  // ── Pedigree ──────────────────────────────────────────────────────────────

  /// `GET /api/animals/{id}/pedigree?depth=N`
  pub async fn get_pedigree(&self, id: &AnimalId, depth: u8) -> Result<PedigreeNode> {
    let path = format!("/animals/{id}/pedigree");
    let resp = self
      .client
      .get(self.url(&path))
      .query(&[("depth", depth)])
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(anyhow!("{}", error_message(status, &body)));
    }
    resp.json().await.context("deserialising pedigree")
  }

  /// `POST /api/animals/{id}/ancestors/{slot}`
  pub async fn enroll_ancestor(
    &self,
    subject: &AnimalId,
    slot: Slot,
    fields: &EnrollmentFields,
  ) -> Result<Enrollment> {
    let path = format!("/animals/{subject}/ancestors/{slot}");
    let resp = self
      .client
      .post(self.url(&path))
      .json(fields)
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;

    let status = resp.status();
    let body = resp.text().await.context("reading enrollment response")?;
    parse_enrollment(status, &body)
  }
}

/// Interpret an enrollment response. A failed link still created an animal,
/// so it is reported as [`Enrollment::Orphaned`] rather than as an error.
pub fn parse_enrollment(status: StatusCode, body: &str) -> Result<Enrollment> {
  if status.is_success() {
    let animal = serde_json::from_str(body).context("deserialising ancestor")?;
    return Ok(Enrollment::Linked(animal));
  }
  match serde_json::from_str::<ErrorBody>(body) {
    Ok(ErrorBody {
      error,
      orphan: Some(orphan),
    }) => Ok(Enrollment::Orphaned {
      orphan,
      message: error,
    }),
    _ => Err(anyhow!("{}", error_message(status, body))),
  }
}

fn error_message(status: StatusCode, body: &str) -> String {
  match serde_json::from_str::<ErrorBody>(body) {
    Ok(e) => e.error,
    Err(_) => format!("server returned {status}"),
  }
}
