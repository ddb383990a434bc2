//! Pedigree assembly: materialise a bounded-depth ancestry tree from the flat
//! parent pointers held by an [`AnimalStore`].
//!
//! Assembly runs in two phases. First, ancestors are fetched one generation
//! at a time into an arena keyed by id, with a single batched lookup per
//! generation (so the sire and dam of every node in a generation are
//! resolved together). Then the tree is built synchronously from the arena.
//!
//! Unresolvable ancestors, whether missing or failing to load, become `null`
//! branches; a failed batch is retried id by id so the failure stays on its
//! own branch. Only the root must resolve. An animal that reappears on its own
//! root-to-node path is reported as [`Error::AncestryCycle`]; the same animal
//! appearing in two different branches is ordinary line breeding and is
//! rendered in both places.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  animal::{Animal, AnimalId, Gender, Slot},
  store::AnimalStore,
};

/// Generations fetched when the caller does not say otherwise.
pub const DEFAULT_PEDIGREE_DEPTH: u8 = 4;

/// Hard ceiling on requested depth; larger requests are clamped.
pub const MAX_PEDIGREE_DEPTH: u8 = 10;

// ─── Tree ────────────────────────────────────────────────────────────────────

/// One animal in an assembled pedigree, with its parents nested inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedigreeNode {
  pub id:              AnimalId,
  pub registered_name: String,
  pub call_name:       String,
  pub gender:          Gender,
  #[serde(default)]
  pub titles:          Vec<String>,
  pub sire:            Option<Box<PedigreeNode>>,
  pub dam:             Option<Box<PedigreeNode>>,
}

impl PedigreeNode {
  /// A node with no parents attached.
  pub fn leaf(animal: &Animal) -> Self {
    Self {
      id:              animal.id.clone(),
      registered_name: animal.registered_name.clone(),
      call_name:       animal.call_name.clone(),
      gender:          animal.gender,
      titles:          animal.titles.clone(),
      sire:            None,
      dam:             None,
    }
  }

  pub fn parent(&self, slot: Slot) -> Option<&PedigreeNode> {
    match slot {
      Slot::Sire => self.sire.as_deref(),
      Slot::Dam => self.dam.as_deref(),
    }
  }

  pub fn has_parents(&self) -> bool { self.sire.is_some() || self.dam.is_some() }

  /// Number of ancestor generations below this node (0 for a leaf).
  pub fn generations(&self) -> usize {
    let sire = self.sire.as_ref().map_or(0, |n| 1 + n.generations());
    let dam = self.dam.as_ref().map_or(0, |n| 1 + n.generations());
    sire.max(dam)
  }

  /// Depth-first search for the first node with `id`.
  pub fn find(&self, id: &AnimalId) -> Option<&PedigreeNode> {
    if &self.id == id {
      return Some(self);
    }
    Slot::ALL
      .into_iter()
      .filter_map(|slot| self.parent(slot))
      .find_map(|parent| parent.find(id))
  }
}

// ─── Assembly ────────────────────────────────────────────────────────────────

/// Assemble the pedigree of `root_id` down to `max_depth` ancestor
/// generations (clamped to [`MAX_PEDIGREE_DEPTH`]).
///
/// Fails with [`Error::NotFound`] if the root does not resolve, and with
/// [`Error::AncestryCycle`] if the data loops back on itself.
pub async fn assemble_pedigree<S>(
  store: &S,
  root_id: &AnimalId,
  max_depth: u8,
) -> Result<PedigreeNode>
where
  S: AnimalStore + ?Sized,
{
  let max_depth = max_depth.min(MAX_PEDIGREE_DEPTH);

  let root = store
    .get_animal(root_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(root_id.clone()))?;

  let arena = fetch_generations(store, root, max_depth).await;

  let mut path = Vec::new();
  build(&arena, root_id, max_depth, &mut path)?
    .ok_or_else(|| Error::NotFound(root_id.clone()))
}

/// Breadth-first fetch of every ancestor within `max_depth` generations.
async fn fetch_generations<S>(
  store: &S,
  root: Animal,
  max_depth: u8,
) -> HashMap<AnimalId, Animal>
where
  S: AnimalStore + ?Sized,
{
  let mut current = vec![root.id.clone()];
  let mut arena = HashMap::from([(root.id.clone(), root)]);

  for generation in 1..=max_depth {
    let mut wanted: Vec<AnimalId> = Vec::new();
    let mut next: Vec<AnimalId> = Vec::new();
    let mut seen = HashSet::new();

    for id in &current {
      let Some(animal) = arena.get(id) else { continue };
      for parent in [&animal.sire_id, &animal.dam_id].into_iter().flatten() {
        if !seen.insert(parent.clone()) {
          continue;
        }
        if !arena.contains_key(parent) {
          wanted.push(parent.clone());
        }
        next.push(parent.clone());
      }
    }

    if next.is_empty() {
      break;
    }

    if !wanted.is_empty() {
      match store.get_animals(&wanted).await {
        Ok(found) => {
          tracing::debug!(
            generation,
            requested = wanted.len(),
            found = found.len(),
            "fetched pedigree generation"
          );
          for animal in found {
            arena.insert(animal.id.clone(), animal);
          }
        }
        Err(e) => {
          tracing::warn!(
            generation,
            error = %e,
            "batched ancestor fetch failed; resolving one by one"
          );
          for animal in fetch_each(store, &wanted, generation).await {
            arena.insert(animal.id.clone(), animal);
          }
        }
      }
    }

    current = next;
  }

  arena
}

/// Per-id fallback after a failed batch, so one bad record only loses its
/// own branch.
async fn fetch_each<S>(store: &S, ids: &[AnimalId], generation: u8) -> Vec<Animal>
where
  S: AnimalStore + ?Sized,
{
  let mut found = Vec::with_capacity(ids.len());
  for id in ids {
    match store.get_animal(id).await {
      Ok(Some(animal)) => found.push(animal),
      Ok(None) => {}
      Err(e) => {
        tracing::warn!(
          generation,
          %id,
          error = %e,
          "failed to fetch ancestor; treating it as unknown"
        );
      }
    }
  }
  found
}

fn build(
  arena: &HashMap<AnimalId, Animal>,
  id: &AnimalId,
  remaining: u8,
  path: &mut Vec<AnimalId>,
) -> Result<Option<PedigreeNode>> {
  if path.contains(id) {
    let mut cycle = path.clone();
    cycle.push(id.clone());
    return Err(Error::AncestryCycle { path: cycle });
  }

  let Some(animal) = arena.get(id) else {
    tracing::debug!(%id, "ancestor could not be resolved");
    return Ok(None);
  };

  let mut node = PedigreeNode::leaf(animal);
  if remaining == 0 {
    return Ok(Some(node));
  }

  path.push(id.clone());
  if let Some(sire_id) = &animal.sire_id {
    node.sire = build(arena, sire_id, remaining - 1, path)?.map(Box::new);
  }
  if let Some(dam_id) = &animal.dam_id {
    node.dam = build(arena, dam_id, remaining - 1, path)?.map(Box::new);
  }
  path.pop();

  Ok(Some(node))
}
