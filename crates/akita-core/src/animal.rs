//! Animal records — the sole entity the pedigree service knows about.
//!
//! Ancestry is stored as two optional parent pointers per animal. Everything
//! else on the record is display data.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Opaque animal identifier.
///
/// Generated ids are hyphenated UUIDs, but any non-empty string that the
/// backing store accepts is a valid id.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AnimalId(String);

impl AnimalId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  /// A fresh random identifier.
  pub fn generate() -> Self { Self(Uuid::new_v4().hyphenated().to_string()) }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_inner(self) -> String { self.0 }
}

impl fmt::Display for AnimalId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for AnimalId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for AnimalId {
  fn from(s: String) -> Self { Self(s) }
}

// ─── Enumerations ────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
}

/// A parental position in another animal's ancestry.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Slot {
  Sire,
  Dam,
}

impl Slot {
  pub const ALL: [Slot; 2] = [Slot::Sire, Slot::Dam];

  /// The gender an occupant of this slot is expected to have.
  pub fn gender(self) -> Gender {
    match self {
      Self::Sire => Gender::Male,
      Self::Dam => Gender::Female,
    }
  }
}

/// How an animal record came into existence.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Origin {
  /// Created by its owner through the full form.
  #[default]
  Direct,
  /// Created as a placeholder by ancestor enrollment.
  Enrolled,
}

// ─── Animal ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
  pub id:                  AnimalId,
  pub registered_name:     String,
  pub call_name:           String,
  pub gender:              Gender,
  pub sire_id:             Option<AnimalId>,
  pub dam_id:              Option<AnimalId>,
  /// Show titles and other honorifics, in display order.
  #[serde(default)]
  pub titles:              Vec<String>,
  pub owner_id:            String,
  pub registration_number: Option<String>,
  pub color:               Option<String>,
  pub date_of_birth:       Option<NaiveDate>,
  #[serde(default)]
  pub origin:              Origin,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
}

impl Animal {
  /// The parent recorded in `slot`, if any.
  pub fn parent(&self, slot: Slot) -> Option<&AnimalId> {
    match slot {
      Slot::Sire => self.sire_id.as_ref(),
      Slot::Dam => self.dam_id.as_ref(),
    }
  }

  pub fn has_parents(&self) -> bool {
    self.sire_id.is_some() || self.dam_id.is_some()
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::AnimalStore::create_animal`].
/// `id`, `created_at` and `updated_at` are always set by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnimal {
  pub registered_name:     String,
  pub call_name:           String,
  pub gender:              Gender,
  #[serde(default)]
  pub sire_id:             Option<AnimalId>,
  #[serde(default)]
  pub dam_id:              Option<AnimalId>,
  #[serde(default)]
  pub titles:              Vec<String>,
  pub owner_id:            String,
  #[serde(default)]
  pub registration_number: Option<String>,
  #[serde(default)]
  pub color:               Option<String>,
  #[serde(default)]
  pub date_of_birth:       Option<NaiveDate>,
  #[serde(default)]
  pub origin:              Origin,
}

impl NewAnimal {
  /// Convenience constructor with all optional fields left empty.
  pub fn new(
    registered_name: impl Into<String>,
    call_name: impl Into<String>,
    gender: Gender,
    owner_id: impl Into<String>,
  ) -> Self {
    Self {
      registered_name: registered_name.into(),
      call_name: call_name.into(),
      gender,
      sire_id: None,
      dam_id: None,
      titles: Vec::new(),
      owner_id: owner_id.into(),
      registration_number: None,
      color: None,
      date_of_birth: None,
      origin: Origin::Direct,
    }
  }

  /// Check the fields every animal needs before it is handed to a store.
  pub fn validate(&self) -> Result<()> {
    require("registered_name", &self.registered_name)?;
    require("call_name", &self.call_name)?;
    require("owner_id", &self.owner_id)?;
    Ok(())
  }
}

/// Partial update of an animal's display fields. `None` leaves a field as is.
///
/// Parent links are deliberately absent; they change only through
/// [`crate::store::AnimalStore::set_parent`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimalPatch {
  pub registered_name:     Option<String>,
  pub call_name:           Option<String>,
  pub titles:              Option<Vec<String>>,
  pub registration_number: Option<String>,
  pub color:               Option<String>,
  pub date_of_birth:       Option<NaiveDate>,
}

impl AnimalPatch {
  pub fn validate(&self) -> Result<()> {
    if let Some(name) = &self.registered_name {
      require("registered_name", name)?;
    }
    if let Some(name) = &self.call_name {
      require("call_name", name)?;
    }
    Ok(())
  }

  /// Apply the patch to `animal` in place. Timestamps are the store's job.
  pub fn apply(self, animal: &mut Animal) {
    if let Some(v) = self.registered_name {
      animal.registered_name = v;
    }
    if let Some(v) = self.call_name {
      animal.call_name = v;
    }
    if let Some(v) = self.titles {
      animal.titles = v;
    }
    if let Some(v) = self.registration_number {
      animal.registration_number = Some(v);
    }
    if let Some(v) = self.color {
      animal.color = Some(v);
    }
    if let Some(v) = self.date_of_birth {
      animal.date_of_birth = Some(v);
    }
  }
}

fn require(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::InvalidField {
      field,
      reason: "must not be empty".into(),
    });
  }
  Ok(())
}
