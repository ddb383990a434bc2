//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, dates are `YYYY-MM-DD`, enums use their
//! lowercase names and titles are a compact JSON array.

use std::str::FromStr;

use akita_core::animal::{Animal, AnimalId, Gender, Origin};
use chrono::{DateTime, NaiveDate, Utc};

use crate::{Error, Result};

/// Column list shared by every `SELECT` that produces a [`RawAnimal`].
pub const ANIMAL_COLUMNS: &str = "id, registered_name, call_name, gender, \
  sire_id, dam_id, titles, owner_id, registration_number, color, \
  date_of_birth, origin, created_at, updated_at";

// ─── DateTime<Utc> / NaiveDate ───────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

fn decode_enum<T: FromStr>(kind: &'static str, s: &str) -> Result<T> {
  T::from_str(s).map_err(|_| Error::UnknownEnum {
    kind,
    value: s.to_owned(),
  })
}

// ─── Titles ──────────────────────────────────────────────────────────────────

pub fn encode_titles(titles: &[String]) -> Result<String> {
  Ok(serde_json::to_string(titles)?)
}

pub fn decode_titles(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `animals` row.
pub struct RawAnimal {
  pub id:                  String,
  pub registered_name:     String,
  pub call_name:           String,
  pub gender:              String,
  pub sire_id:             Option<String>,
  pub dam_id:              Option<String>,
  pub titles:              String,
  pub owner_id:            String,
  pub registration_number: Option<String>,
  pub color:               Option<String>,
  pub date_of_birth:       Option<String>,
  pub origin:              String,
  pub created_at:          String,
  pub updated_at:          String,
}

impl RawAnimal {
  /// Read a row selected with [`ANIMAL_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                  row.get(0)?,
      registered_name:     row.get(1)?,
      call_name:           row.get(2)?,
      gender:              row.get(3)?,
      sire_id:             row.get(4)?,
      dam_id:              row.get(5)?,
      titles:              row.get(6)?,
      owner_id:            row.get(7)?,
      registration_number: row.get(8)?,
      color:               row.get(9)?,
      date_of_birth:       row.get(10)?,
      origin:              row.get(11)?,
      created_at:          row.get(12)?,
      updated_at:          row.get(13)?,
    })
  }

  /// The inverse of [`RawAnimal::into_animal`], for inserts and updates.
  pub fn from_animal(animal: &Animal) -> Result<Self> {
    Ok(Self {
      id:                  animal.id.as_str().to_owned(),
      registered_name:     animal.registered_name.clone(),
      call_name:           animal.call_name.clone(),
      gender:              animal.gender.as_ref().to_owned(),
      sire_id:             animal.sire_id.as_ref().map(|id| id.as_str().to_owned()),
      dam_id:              animal.dam_id.as_ref().map(|id| id.as_str().to_owned()),
      titles:              encode_titles(&animal.titles)?,
      owner_id:            animal.owner_id.clone(),
      registration_number: animal.registration_number.clone(),
      color:               animal.color.clone(),
      date_of_birth:       animal.date_of_birth.map(encode_date),
      origin:              animal.origin.as_ref().to_owned(),
      created_at:          encode_dt(animal.created_at),
      updated_at:          encode_dt(animal.updated_at),
    })
  }

  pub fn into_animal(self) -> Result<Animal> {
    Ok(Animal {
      id:                  AnimalId::new(self.id),
      registered_name:     self.registered_name,
      call_name:           self.call_name,
      gender:              decode_enum::<Gender>("gender", &self.gender)?,
      sire_id:             self.sire_id.map(AnimalId::new),
      dam_id:              self.dam_id.map(AnimalId::new),
      titles:              decode_titles(&self.titles)?,
      owner_id:            self.owner_id,
      registration_number: self.registration_number,
      color:               self.color,
      date_of_birth:       self.date_of_birth.as_deref().map(decode_date).transpose()?,
      origin:              decode_enum::<Origin>("origin", &self.origin)?,
      created_at:          decode_dt(&self.created_at)?,
      updated_at:          decode_dt(&self.updated_at)?,
    })
  }
}
