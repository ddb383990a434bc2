//! [`SqliteStore`] — the SQLite implementation of [`AnimalStore`].

use std::path::Path;

use akita_core::{
  animal::{Animal, AnimalId, AnimalPatch, NewAnimal, Slot},
  store::{AnimalQuery, AnimalStore},
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{ANIMAL_COLUMNS, RawAnimal, encode_dt},
  schema::SCHEMA,
};

/// Outcome of a write that may trip the `UNIQUE` constraints.
enum WriteOutcome {
  Done(usize),
  Conflict,
}

fn classify(res: rusqlite::Result<usize>) -> tokio_rusqlite::Result<WriteOutcome> {
  match res {
    Ok(n) => Ok(WriteOutcome::Done(n)),
    Err(rusqlite::Error::SqliteFailure(e, _))
      if e.code == rusqlite::ErrorCode::ConstraintViolation =>
    {
      Ok(WriteOutcome::Conflict)
    }
    Err(e) => Err(e.into()),
  }
}

fn slot_column(slot: Slot) -> &'static str {
  match slot {
    Slot::Sire => "sire_id",
    Slot::Dam => "dam_id",
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An animal registry backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a fully-built [`Animal`], keeping its id and timestamps.
  ///
  /// Used for imports from another registry where ids must be preserved;
  /// regular creation goes through [`AnimalStore::create_animal`].
  pub async fn insert_animal(&self, animal: &Animal) -> Result<()> {
    let raw = RawAnimal::from_animal(animal)?;
    let id = raw.id.clone();
    let name = raw.registered_name.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        // Distinguish the two UNIQUE columns for a useful error.
        let id_taken = conn
          .query_row("SELECT 1 FROM animals WHERE id = ?1", [&raw.id], |_| Ok(()))
          .optional()?
          .is_some();
        if id_taken {
          return Ok(None);
        }
        let res = conn.execute(
          "INSERT INTO animals (
             id, registered_name, call_name, gender, sire_id, dam_id, titles,
             owner_id, registration_number, color, date_of_birth, origin,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
          rusqlite::params![
            raw.id,
            raw.registered_name,
            raw.call_name,
            raw.gender,
            raw.sire_id,
            raw.dam_id,
            raw.titles,
            raw.owner_id,
            raw.registration_number,
            raw.color,
            raw.date_of_birth,
            raw.origin,
            raw.created_at,
            raw.updated_at,
          ],
        );
        classify(res).map(Some)
      })
      .await?;

    match outcome {
      None => Err(Error::DuplicateId(id)),
      Some(WriteOutcome::Conflict) => Err(Error::DuplicateRegisteredName(name)),
      Some(WriteOutcome::Done(_)) => Ok(()),
    }
  }

  /// Run raw SQL against the database, for tests that need rows the typed
  /// API refuses to write.
  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<usize> {
    Ok(self.conn.call(move |conn| Ok(conn.execute(sql, [])?)).await?)
  }

  async fn select_animals(
    &self,
    sql: String,
    params: Vec<Option<String>>,
  ) -> Result<Vec<Animal>> {
    let raws: Vec<RawAnimal> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawAnimal::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnimal::into_animal).collect()
  }
}

// ─── AnimalStore impl ────────────────────────────────────────────────────────

impl AnimalStore for SqliteStore {
  type Error = Error;

  fn is_conflict(error: &Error) -> bool {
    matches!(
      error,
      Error::DuplicateRegisteredName(_) | Error::DuplicateId(_)
    )
  }

  async fn create_animal(&self, input: NewAnimal) -> Result<Animal> {
    let now = Utc::now();
    let animal = Animal {
      id:                  AnimalId::generate(),
      registered_name:     input.registered_name,
      call_name:           input.call_name,
      gender:              input.gender,
      sire_id:             input.sire_id,
      dam_id:              input.dam_id,
      titles:              input.titles,
      owner_id:            input.owner_id,
      registration_number: input.registration_number,
      color:               input.color,
      date_of_birth:       input.date_of_birth,
      origin:              input.origin,
      created_at:          now,
      updated_at:          now,
    };

    self.insert_animal(&animal).await?;
    tracing::debug!(id = %animal.id, origin = %animal.origin, "inserted animal");
    Ok(animal)
  }

  async fn get_animal(&self, id: &AnimalId) -> Result<Option<Animal>> {
    let id_str = id.as_str().to_owned();

    let raw: Option<RawAnimal> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ANIMAL_COLUMNS} FROM animals WHERE id = ?1"),
              [id_str],
              RawAnimal::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAnimal::into_animal).transpose()
  }

  async fn get_animals(&self, ids: &[AnimalId]) -> Result<Vec<Animal>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql =
      format!("SELECT {ANIMAL_COLUMNS} FROM animals WHERE id IN ({placeholders})");
    let params = ids.iter().map(|id| Some(id.as_str().to_owned())).collect();
    self.select_animals(sql, params).await
  }

  async fn list_animals(&self, query: &AnimalQuery) -> Result<Vec<Animal>> {
    let owner = query.owner_id.clone();
    let gender = query.gender.map(|g| g.as_ref().to_owned());
    let text = query.text.as_deref().map(|t| format!("%{t}%"));
    let limit = query.limit.unwrap_or(100) as i64;
    let offset = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawAnimal> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ANIMAL_COLUMNS} FROM animals
           WHERE (?1 IS NULL OR owner_id = ?1)
             AND (?2 IS NULL OR gender = ?2)
             AND (?3 IS NULL OR registered_name LIKE ?3 OR call_name LIKE ?3)
           ORDER BY registered_name
           LIMIT ?4 OFFSET ?5"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![owner, gender, text, limit, offset],
            RawAnimal::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnimal::into_animal).collect()
  }

  async fn update_animal(
    &self,
    id: &AnimalId,
    patch: AnimalPatch,
  ) -> Result<Option<Animal>> {
    let Some(mut animal) = self.get_animal(id).await? else {
      return Ok(None);
    };
    patch.apply(&mut animal);
    animal.updated_at = Utc::now();

    let raw = RawAnimal::from_animal(&animal)?;
    let name = raw.registered_name.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        classify(conn.execute(
          "UPDATE animals
           SET registered_name = ?2, call_name = ?3, titles = ?4,
               registration_number = ?5, color = ?6, date_of_birth = ?7,
               updated_at = ?8
           WHERE id = ?1",
          rusqlite::params![
            raw.id,
            raw.registered_name,
            raw.call_name,
            raw.titles,
            raw.registration_number,
            raw.color,
            raw.date_of_birth,
            raw.updated_at,
          ],
        ))
      })
      .await?;

    match outcome {
      WriteOutcome::Conflict => Err(Error::DuplicateRegisteredName(name)),
      WriteOutcome::Done(0) => Ok(None),
      WriteOutcome::Done(_) => Ok(Some(animal)),
    }
  }

  async fn set_parent(
    &self,
    id: &AnimalId,
    slot: Slot,
    parent: Option<AnimalId>,
  ) -> Result<Option<Animal>> {
    let id_str = id.as_str().to_owned();
    let parent_str = parent.map(AnimalId::into_inner);
    let at_str = encode_dt(Utc::now());
    let column = slot_column(slot);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!("UPDATE animals SET {column} = ?2, updated_at = ?3 WHERE id = ?1"),
          rusqlite::params![id_str, parent_str, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_animal(id).await
  }

  async fn list_orphans(&self, owner_id: Option<&str>) -> Result<Vec<Animal>> {
    let sql = format!(
      "SELECT {ANIMAL_COLUMNS} FROM animals a
       WHERE a.origin = 'enrolled'
         AND (?1 IS NULL OR a.owner_id = ?1)
         AND NOT EXISTS (
           SELECT 1 FROM animals c WHERE c.sire_id = a.id OR c.dam_id = a.id
         )
       ORDER BY a.created_at"
    );
    self.select_animals(sql, vec![owner_id.map(str::to_owned)]).await
  }
}
