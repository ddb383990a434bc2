//! Ancestor enrollment and parent linking.
//!
//! Enrollment records a previously unknown sire or dam as a new minimal
//! animal and links it into the subject's slot. It is a two-step mutation
//! with no transaction around it: the ancestor is created first, then the
//! subject is updated. If the second step fails the new record stays behind
//! as an orphan and is handed back in [`Error::LinkFailed`]; nothing is
//! rolled back or retried here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  animal::{Animal, AnimalId, NewAnimal, Origin, Slot},
  store::AnimalStore,
};

/// The minimal field set for a newly enrolled ancestor.
/// Gender is implied by the slot being filled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrollmentFields {
  pub registered_name:     String,
  pub call_name:           String,
  #[serde(default)]
  pub registration_number: Option<String>,
  #[serde(default)]
  pub color:               Option<String>,
  #[serde(default)]
  pub date_of_birth:       Option<NaiveDate>,
  #[serde(default)]
  pub titles:              Vec<String>,
}

impl EnrollmentFields {
  pub fn named(
    registered_name: impl Into<String>,
    call_name: impl Into<String>,
  ) -> Self {
    Self {
      registered_name: registered_name.into(),
      call_name: call_name.into(),
      ..Default::default()
    }
  }

  fn into_new_animal(self, slot: Slot, owner_id: String) -> NewAnimal {
    NewAnimal {
      registered_name: self.registered_name.trim().to_owned(),
      call_name: self.call_name.trim().to_owned(),
      gender: slot.gender(),
      sire_id: None,
      dam_id: None,
      titles: self.titles,
      owner_id,
      registration_number: self.registration_number,
      color: self.color,
      date_of_birth: self.date_of_birth,
      origin: Origin::Enrolled,
    }
  }
}

/// Rules applied when linking an existing animal as a parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParentagePolicy {
  /// Reject a sire that is not male or a dam that is not female.
  pub enforce_gender: bool,
}

/// Create a new ancestor from `fields` and link it into `subject_id`'s
/// `slot`. Returns the newly created animal.
pub async fn enroll_ancestor<S>(
  store: &S,
  subject_id: &AnimalId,
  slot: Slot,
  fields: EnrollmentFields,
) -> Result<Animal>
where
  S: AnimalStore + ?Sized,
{
  let subject = store
    .get_animal(subject_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(subject_id.clone()))?;

  let input = fields.into_new_animal(slot, subject.owner_id);
  if let Err(e) = input.validate() {
    return Err(Error::CreateFailed {
      reason: e.to_string(),
      source: None,
    });
  }

  let ancestor = store.create_animal(input).await.map_err(|e| {
    Error::CreateFailed {
      reason: e.to_string(),
      source: Some(Box::new(e)),
    }
  })?;
  tracing::info!(
    subject = %subject_id,
    %slot,
    ancestor = %ancestor.id,
    "created enrolled ancestor"
  );

  let linked = store
    .set_parent(subject_id, slot, Some(ancestor.id.clone()))
    .await;
  let reason = match linked {
    Ok(Some(_)) => {
      tracing::info!(subject = %subject_id, %slot, ancestor = %ancestor.id, "linked ancestor");
      return Ok(ancestor);
    }
    Ok(None) => format!("subject {subject_id} disappeared before linking"),
    Err(e) => e.to_string(),
  };

  tracing::warn!(
    subject = %subject_id,
    %slot,
    orphan = %ancestor.id,
    %reason,
    "ancestor created but not linked"
  );
  Err(Error::LinkFailed {
    orphan: Box::new(ancestor),
    slot,
    reason,
  })
}

/// Link an existing animal as `subject_id`'s `slot` parent. Also the manual
/// recovery path for an orphan left by a failed enrollment.
pub async fn link_parent<S>(
  store: &S,
  subject_id: &AnimalId,
  slot: Slot,
  parent_id: &AnimalId,
  policy: ParentagePolicy,
) -> Result<Animal>
where
  S: AnimalStore + ?Sized,
{
  if subject_id == parent_id {
    return Err(Error::SelfParent(subject_id.clone()));
  }

  store
    .get_animal(subject_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(subject_id.clone()))?;

  let parent = check_parent(store, slot, parent_id, policy).await?;

  store
    .set_parent(subject_id, slot, Some(parent.id))
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(subject_id.clone()))
}

/// Check the parent links a new animal arrives with, under the same rules
/// as [`link_parent`].
pub async fn check_new_parents<S>(
  store: &S,
  input: &NewAnimal,
  policy: ParentagePolicy,
) -> Result<()>
where
  S: AnimalStore + ?Sized,
{
  for slot in Slot::ALL {
    let parent_id = match slot {
      Slot::Sire => input.sire_id.as_ref(),
      Slot::Dam => input.dam_id.as_ref(),
    };
    if let Some(parent_id) = parent_id {
      check_parent(store, slot, parent_id, policy).await?;
    }
  }
  Ok(())
}

/// The parent must exist and, under `policy`, match the slot's gender.
async fn check_parent<S>(
  store: &S,
  slot: Slot,
  parent_id: &AnimalId,
  policy: ParentagePolicy,
) -> Result<Animal>
where
  S: AnimalStore + ?Sized,
{
  let parent = store
    .get_animal(parent_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(parent_id.clone()))?;

  if policy.enforce_gender && parent.gender != slot.gender() {
    return Err(Error::ParentGenderMismatch {
      parent: parent.id,
      slot,
      expected: slot.gender(),
      actual: parent.gender,
    });
  }
  Ok(parent)
}

/// Clear `subject_id`'s `slot`. The former parent record is left untouched.
pub async fn unlink_parent<S>(
  store: &S,
  subject_id: &AnimalId,
  slot: Slot,
) -> Result<Animal>
where
  S: AnimalStore + ?Sized,
{
  store
    .set_parent(subject_id, slot, None)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(subject_id.clone()))
}
