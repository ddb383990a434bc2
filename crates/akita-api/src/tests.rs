//! Router tests against an in-memory `SqliteStore`.

use std::sync::Arc;

use akita_core::{
  animal::{Animal, AnimalId, Gender, NewAnimal, Origin, Slot},
  store::AnimalStore,
};
use akita_store_sqlite::SqliteStore;
use axum::{
  body::Body,
  http::{Request, StatusCode},
  response::IntoResponse,
};
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{ApiError, PedigreeSettings, api_router};

async fn store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.unwrap())
}

async fn add(
  store: &SqliteStore,
  name: &str,
  gender: Gender,
  sire: Option<&AnimalId>,
  dam: Option<&AnimalId>,
) -> Animal {
  let mut input = NewAnimal::new(name, name.to_uppercase(), gender, "owner-1");
  input.sire_id = sire.cloned();
  input.dam_id = dam.cloned();
  store.create_animal(input).await.unwrap()
}

async fn send(
  store: Arc<SqliteStore>,
  settings: PedigreeSettings,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(v) => builder
      .header("content-type", "application/json")
      .body(Body::from(v.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  let resp = api_router(store, settings).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

async fn call(
  store: Arc<SqliteStore>,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  send(store, PedigreeSettings::default(), method, uri, body).await
}

// ─── Animals ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get_animal() {
  let s = store().await;
  let (status, created) = call(
    s.clone(),
    "POST",
    "/animals",
    Some(json!({
      "registered_name": "Hana of Kuma Kennels",
      "call_name": "Hana",
      "gender": "female",
      "owner_id": "owner-1",
      "titles": ["CH"],
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(created["origin"], "direct");
  assert_eq!(created["sire_id"], Value::Null);

  let id = created["id"].as_str().unwrap();
  let (status, fetched) = call(s, "GET", &format!("/animals/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched["call_name"], "Hana");
}

#[tokio::test]
async fn create_with_blank_name_is_bad_request() {
  let s = store().await;
  let (status, body) = call(
    s,
    "POST",
    "/animals",
    Some(json!({
      "registered_name": "  ",
      "call_name": "Hana",
      "gender": "female",
      "owner_id": "owner-1",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("registered_name"));
}

#[tokio::test]
async fn unknown_animal_is_not_found() {
  let s = store().await;
  let (status, body) = call(s, "GET", "/animals/ghost", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn list_filters_by_gender_and_text() {
  let s = store().await;
  add(&s, "Kenji", Gender::Male, None, None).await;
  add(&s, "Hana", Gender::Female, None, None).await;
  add(&s, "Kenta", Gender::Male, None, None).await;

  let (status, body) = call(s.clone(), "GET", "/animals?gender=male", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 2);

  let (_, body) = call(s, "GET", "/animals?q=ken&gender=male", None).await;
  assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn patch_updates_titles() {
  let s = store().await;
  let hana = add(&s, "Hana", Gender::Female, None, None).await;

  let (status, body) = call(
    s,
    "PATCH",
    &format!("/animals/{}", hana.id),
    Some(json!({ "titles": ["CH", "GCH"] })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["titles"], json!(["CH", "GCH"]));
}

fn pup_with(sire: Option<&AnimalId>, dam: Option<&AnimalId>) -> Value {
  json!({
    "registered_name": "Pup",
    "call_name": "Pup",
    "gender": "male",
    "owner_id": "owner-1",
    "sire_id": sire,
    "dam_id": dam,
  })
}

#[tokio::test]
async fn create_with_mismatched_parent_obeys_gender_policy() {
  let s = store().await;
  let rex = add(&s, "Rex", Gender::Male, None, None).await;

  let strict = PedigreeSettings {
    enforce_parent_gender: true,
    ..Default::default()
  };
  let (status, body) = send(
    s.clone(),
    strict,
    "POST",
    "/animals",
    Some(pup_with(None, Some(&rex.id))),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].is_string());
  let (_, listed) = call(s.clone(), "GET", "/animals?q=pup", None).await;
  assert!(listed.as_array().unwrap().is_empty());

  let (status, created) =
    call(s, "POST", "/animals", Some(pup_with(None, Some(&rex.id)))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(created["dam_id"], rex.id.as_str());
}

#[tokio::test]
async fn create_with_unknown_parent_is_not_found() {
  let s = store().await;
  let ghost = AnimalId::new("ghost");
  let (status, body) =
    call(s.clone(), "POST", "/animals", Some(pup_with(Some(&ghost), None)))
      .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("ghost"));

  let (_, listed) = call(s, "GET", "/animals", None).await;
  assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_registered_name_is_unprocessable() {
  let s = store().await;
  add(&s, "Hana", Gender::Female, None, None).await;
  let (status, body) = call(
    s,
    "POST",
    "/animals",
    Some(json!({
      "registered_name": "Hana",
      "call_name": "Other",
      "gender": "female",
      "owner_id": "owner-1",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].as_str().unwrap().contains("Hana"));
}

#[test]
fn only_store_conflicts_are_caller_errors() {
  use akita_store_sqlite::Error as StoreError;

  let taken = crate::animals::write_error::<SqliteStore>(
    StoreError::DuplicateRegisteredName("Hana".into()),
  );
  assert_eq!(taken.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

  let broken = crate::animals::write_error::<SqliteStore>(StoreError::DateParse(
    "garbage".into(),
  ));
  assert_eq!(
    broken.into_response().status(),
    StatusCode::INTERNAL_SERVER_ERROR
  );
}

// ─── Pedigree ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pedigree_of_unknown_animal_is_not_found() {
  let s = store().await;
  let (status, body) = call(s, "GET", "/animals/ghost/pedigree", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "not found: no pedigree data available");
}

#[tokio::test]
async fn pedigree_depth_is_clamped_by_settings() {
  let s = store().await;
  let great = add(&s, "Great", Gender::Male, None, None).await;
  let grand = add(&s, "Grand", Gender::Male, Some(&great.id), None).await;
  let sire = add(&s, "Sire", Gender::Male, Some(&grand.id), None).await;
  let pup = add(&s, "Pup", Gender::Female, Some(&sire.id), None).await;

  let settings = PedigreeSettings {
    default_depth: 1,
    max_depth: 2,
    ..Default::default()
  };
  let uri = format!("/animals/{}/pedigree", pup.id);

  let (status, body) = send(s.clone(), settings, "GET", &uri, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["sire"]["id"], sire.id.as_str());
  assert_eq!(body["sire"]["sire"], Value::Null);

  let (_, body) = send(s, settings, "GET", &format!("{uri}?depth=9"), None).await;
  assert_eq!(body["sire"]["sire"]["id"], grand.id.as_str());
  assert_eq!(body["sire"]["sire"]["sire"], Value::Null);
}

#[tokio::test]
async fn cyclic_data_is_conflict() {
  let s = store().await;
  let a = add(&s, "A", Gender::Male, None, None).await;
  let b = add(&s, "B", Gender::Male, Some(&a.id), None).await;
  s.set_parent(&a.id, Slot::Sire, Some(b.id.clone()))
    .await
    .unwrap();

  let (status, body) =
    call(s, "GET", &format!("/animals/{}/pedigree", a.id), None).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["cycle"], json!([a.id, b.id, a.id]));
}

// ─── Enrollment and linking ──────────────────────────────────────────────────

#[tokio::test]
async fn enrolled_sire_appears_in_pedigree() {
  let s = store().await;
  let d1 = add(&s, "Hana", Gender::Female, None, None).await;

  let (status, kenji) = call(
    s.clone(),
    "POST",
    &format!("/animals/{}/ancestors/sire", d1.id),
    Some(json!({
      "registered_name": "CH Sakura's Rising Sun",
      "call_name": "Kenji",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(kenji["gender"], "male");
  assert_eq!(kenji["origin"], "enrolled");

  let (status, tree) = call(
    s,
    "GET",
    &format!("/animals/{}/pedigree?depth=3", d1.id),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(tree["sire"]["id"], kenji["id"]);
  assert_eq!(tree["sire"]["registered_name"], "CH Sakura's Rising Sun");
  assert_eq!(tree["sire"]["sire"], Value::Null);
  assert_eq!(tree["dam"], Value::Null);
}

#[tokio::test]
async fn enrollment_with_taken_name_is_unprocessable() {
  let s = store().await;
  add(&s, "Kenji", Gender::Male, None, None).await;
  let d1 = add(&s, "Hana", Gender::Female, None, None).await;

  let (status, _) = call(
    s.clone(),
    "POST",
    &format!("/animals/{}/ancestors/sire", d1.id),
    Some(json!({ "registered_name": "Kenji", "call_name": "Kenji" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let d1 = s.get_animal(&d1.id).await.unwrap().unwrap();
  assert!(d1.sire_id.is_none());
}

#[tokio::test]
async fn link_and_unlink_existing_parent() {
  let s = store().await;
  let pup = add(&s, "Pup", Gender::Male, None, None).await;
  let dam = add(&s, "Dam", Gender::Female, None, None).await;
  let uri = format!("/animals/{}/parents/dam", pup.id);

  let (status, body) = call(
    s.clone(),
    "PUT",
    &uri,
    Some(json!({ "parent_id": dam.id })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["dam_id"], dam.id.as_str());

  let (status, body) = call(s, "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["dam_id"], Value::Null);
}

#[tokio::test]
async fn gender_is_checked_only_when_enforced() {
  let s = store().await;
  let pup = add(&s, "Pup", Gender::Male, None, None).await;
  let female = add(&s, "Female", Gender::Female, None, None).await;
  let uri = format!("/animals/{}/parents/sire", pup.id);
  let body = json!({ "parent_id": female.id });

  let strict = PedigreeSettings {
    enforce_parent_gender: true,
    ..Default::default()
  };
  let (status, _) =
    send(s.clone(), strict, "PUT", &uri, Some(body.clone())).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let (status, _) = call(s, "PUT", &uri, Some(body)).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn animal_cannot_parent_itself() {
  let s = store().await;
  let pup = add(&s, "Pup", Gender::Male, None, None).await;
  let (status, _) = call(
    s,
    "PUT",
    &format!("/animals/{}/parents/sire", pup.id),
    Some(json!({ "parent_id": pup.id })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn orphans_lists_unlinked_enrollments() {
  let s = store().await;
  let mut input = NewAnimal::new("Lost", "Lost", Gender::Male, "owner-1");
  input.origin = Origin::Enrolled;
  let lost = s.create_animal(input).await.unwrap();

  let (status, body) = call(s, "GET", "/orphans?owner_id=owner-1", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body[0]["id"], lost.id.as_str());
}

// ─── Error mapping ────────────────────────────────────────────────────────────

#[tokio::test]
async fn link_failure_response_carries_orphan() {
  let now = chrono::Utc::now();
  let orphan = Animal {
    id:                  AnimalId::new("new-1"),
    registered_name:     "CH Sakura's Rising Sun".into(),
    call_name:           "Kenji".into(),
    gender:              Gender::Male,
    sire_id:             None,
    dam_id:              None,
    titles:              vec![],
    owner_id:            "owner-1".into(),
    registration_number: None,
    color:               None,
    date_of_birth:       None,
    origin:              Origin::Enrolled,
    created_at:          now,
    updated_at:          now,
  };
  let err: ApiError = akita_core::Error::LinkFailed {
    orphan: Box::new(orphan),
    slot:   Slot::Sire,
    reason: "database is locked".into(),
  }
  .into();

  let resp = err.into_response();
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  assert_eq!(body["orphan"]["id"], "new-1");
  assert!(body["error"].as_str().unwrap().contains("database is locked"));
}
