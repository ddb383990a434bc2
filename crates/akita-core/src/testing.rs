//! In-memory [`AnimalStore`] with injectable failures, for core tests.

use std::{
  collections::{HashMap, HashSet},
  sync::Mutex,
};

use chrono::Utc;
use thiserror::Error;

use crate::{
  animal::{Animal, AnimalId, AnimalPatch, Gender, NewAnimal, Origin, Slot},
  store::{AnimalQuery, AnimalStore},
};

#[derive(Debug, Error)]
#[error("memory store: {0}")]
pub struct MemoryError(pub String);

#[derive(Default)]
pub struct MemoryStore {
  pub animals:       Mutex<HashMap<AnimalId, Animal>>,
  pub next_id:       Mutex<u32>,
  pub fail_create:   bool,
  pub fail_link:     bool,
  /// Lookups of these ids fail; batch lookups touching any of them fail
  /// outright.
  pub fail_fetching: HashSet<AnimalId>,
}

impl MemoryStore {
  /// Insert an animal with a caller-chosen id and explicit parent links.
  pub fn seed(
    &self,
    id: &str,
    gender: Gender,
    sire: Option<&str>,
    dam: Option<&str>,
  ) -> Animal {
    let now = Utc::now();
    let animal = Animal {
      id: AnimalId::new(id),
      registered_name: format!("Registered {id}"),
      call_name: id.to_uppercase(),
      gender,
      sire_id: sire.map(AnimalId::from),
      dam_id: dam.map(AnimalId::from),
      titles: Vec::new(),
      owner_id: "owner-1".into(),
      registration_number: None,
      color: None,
      date_of_birth: None,
      origin: Origin::Direct,
      created_at: now,
      updated_at: now,
    };
    self
      .animals
      .lock()
      .unwrap()
      .insert(animal.id.clone(), animal.clone());
    animal
  }

  pub fn snapshot(&self, id: &str) -> Option<Animal> {
    self.animals.lock().unwrap().get(&AnimalId::new(id)).cloned()
  }

  pub fn len(&self) -> usize { self.animals.lock().unwrap().len() }
}

impl AnimalStore for MemoryStore {
  type Error = MemoryError;

  async fn create_animal(&self, input: NewAnimal) -> Result<Animal, MemoryError> {
    if self.fail_create {
      return Err(MemoryError("duplicate registered name".into()));
    }
    let id = {
      let mut next = self.next_id.lock().unwrap();
      *next += 1;
      AnimalId::new(format!("new-{next}"))
    };
    let now = Utc::now();
    let animal = Animal {
      id,
      registered_name: input.registered_name,
      call_name: input.call_name,
      gender: input.gender,
      sire_id: input.sire_id,
      dam_id: input.dam_id,
      titles: input.titles,
      owner_id: input.owner_id,
      registration_number: input.registration_number,
      color: input.color,
      date_of_birth: input.date_of_birth,
      origin: input.origin,
      created_at: now,
      updated_at: now,
    };
    self
      .animals
      .lock()
      .unwrap()
      .insert(animal.id.clone(), animal.clone());
    Ok(animal)
  }

  async fn get_animal(&self, id: &AnimalId) -> Result<Option<Animal>, MemoryError> {
    if self.fail_fetching.contains(id) {
      return Err(MemoryError(format!("connection reset fetching {id}")));
    }
    Ok(self.animals.lock().unwrap().get(id).cloned())
  }

  async fn get_animals(&self, ids: &[AnimalId]) -> Result<Vec<Animal>, MemoryError> {
    if let Some(bad) = ids.iter().find(|id| self.fail_fetching.contains(*id)) {
      return Err(MemoryError(format!("connection reset fetching {bad}")));
    }
    let animals = self.animals.lock().unwrap();
    Ok(ids.iter().filter_map(|id| animals.get(id).cloned()).collect())
  }

  async fn list_animals(&self, query: &AnimalQuery) -> Result<Vec<Animal>, MemoryError> {
    let animals = self.animals.lock().unwrap();
    Ok(
      animals
        .values()
        .filter(|a| query.owner_id.as_ref().is_none_or(|o| &a.owner_id == o))
        .filter(|a| query.gender.is_none_or(|g| a.gender == g))
        .cloned()
        .collect(),
    )
  }

  async fn update_animal(
    &self,
    id: &AnimalId,
    patch: AnimalPatch,
  ) -> Result<Option<Animal>, MemoryError> {
    let mut animals = self.animals.lock().unwrap();
    Ok(animals.get_mut(id).map(|animal| {
      patch.apply(animal);
      animal.clone()
    }))
  }

  async fn set_parent(
    &self,
    id: &AnimalId,
    slot: Slot,
    parent: Option<AnimalId>,
  ) -> Result<Option<Animal>, MemoryError> {
    if self.fail_link {
      return Err(MemoryError("write timed out".into()));
    }
    let mut animals = self.animals.lock().unwrap();
    Ok(animals.get_mut(id).map(|animal| {
      match slot {
        Slot::Sire => animal.sire_id = parent,
        Slot::Dam => animal.dam_id = parent,
      }
      animal.clone()
    }))
  }

  async fn list_orphans(&self, owner_id: Option<&str>) -> Result<Vec<Animal>, MemoryError> {
    let animals = self.animals.lock().unwrap();
    let referenced: HashSet<&AnimalId> = animals
      .values()
      .flat_map(|a| a.sire_id.iter().chain(a.dam_id.iter()))
      .collect();
    Ok(
      animals
        .values()
        .filter(|a| a.origin == Origin::Enrolled && !referenced.contains(&a.id))
        .filter(|a| owner_id.is_none_or(|o| a.owner_id == o))
        .cloned()
        .collect(),
    )
  }
}
