//! Client-side pedigree renderer state.
//!
//! A [`PedigreeView`] owns one assembled tree for as long as the pedigree is
//! on screen, plus the set of expanded node ids. Expanding and collapsing is
//! a purely local state change and never triggers a refetch; the host
//! decides when a fresh tree is needed (e.g. after an enrollment).
//!
//! The view does not draw anything itself. [`PedigreeView::rows`] flattens
//! the visible part of the tree into display rows for a front end to style,
//! and the `Display` impl renders those rows as an indented text tree.

use std::{collections::HashSet, fmt};

use crate::{
  animal::{AnimalId, Gender, Slot},
  pedigree::PedigreeNode,
};

/// Titles shown per node before collapsing the rest into an overflow count.
pub const MAX_VISIBLE_TITLES: usize = 3;

// ─── Rows and events ─────────────────────────────────────────────────────────

/// Whether a row offers an expand/collapse control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expander {
  /// The animal has no known parents; nothing to expand.
  None,
  Expanded,
  Collapsed,
}

/// One visible node of the tree, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PedigreeRow {
  /// 0 for the subject animal, 1 for its parents, and so on.
  pub generation:      usize,
  /// The slot this node occupies in its child's ancestry; `None` at the root.
  pub slot:            Option<Slot>,
  pub id:              AnimalId,
  pub registered_name: String,
  pub call_name:       String,
  pub gender:          Gender,
  pub titles:          Vec<String>,
  /// Titles left out of `titles`.
  pub hidden_titles:   usize,
  pub expander:        Expander,
  /// Parent slots with no recorded animal, where an ancestor can be added.
  pub open_slots:      Vec<Slot>,
}

/// Intents the view hands to its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PedigreeEvent {
  /// The user picked an animal; show that animal's own page.
  Navigate(AnimalId),
  /// The user wants to record an unknown parent of `subject`.
  AddAncestor { subject: AnimalId, slot: Slot },
}

// ─── View ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PedigreeView {
  tree:     PedigreeNode,
  expanded: HashSet<AnimalId>,
}

impl PedigreeView {
  /// Wrap a freshly assembled tree with only the root expanded.
  pub fn new(tree: PedigreeNode) -> Self {
    let expanded = HashSet::from([tree.id.clone()]);
    Self { tree, expanded }
  }

  pub fn tree(&self) -> &PedigreeNode { &self.tree }

  pub fn root_id(&self) -> &AnimalId { &self.tree.id }

  pub fn is_expanded(&self, id: &AnimalId) -> bool { self.expanded.contains(id) }

  /// Flip the expanded state of `id` and return the new state.
  ///
  /// Nodes without parents (or not in the tree) have nothing to expand and
  /// always report `false`.
  pub fn toggle(&mut self, id: &AnimalId) -> bool {
    if !self.is_expandable(id) {
      return false;
    }
    if self.expanded.remove(id) {
      false
    } else {
      self.expanded.insert(id.clone());
      true
    }
  }

  pub fn expand(&mut self, id: &AnimalId) {
    if self.is_expandable(id) {
      self.expanded.insert(id.clone());
    }
  }

  pub fn collapse(&mut self, id: &AnimalId) { self.expanded.remove(id); }

  /// Expand every node that has parents.
  pub fn expand_all(&mut self) {
    let mut ids = Vec::new();
    collect_expandable(&self.tree, &mut ids);
    self.expanded.extend(ids);
  }

  /// Collapse everything except the root.
  pub fn collapse_all(&mut self) {
    self.expanded.clear();
    self.expanded.insert(self.tree.id.clone());
  }

  /// The visible tree, flattened: each node followed by its sire subtree and
  /// then its dam subtree, descending only into expanded nodes.
  pub fn rows(&self) -> Vec<PedigreeRow> {
    let mut rows = Vec::new();
    self.push_rows(&self.tree, 0, None, &mut rows);
    rows
  }

  /// Selecting an animal asks the host to navigate to it.
  pub fn select(&self, id: &AnimalId) -> Option<PedigreeEvent> {
    self
      .tree
      .find(id)
      .map(|node| PedigreeEvent::Navigate(node.id.clone()))
  }

  /// Ask the host to enroll an ancestor into `id`'s `slot`. Only offered
  /// when that slot is still empty.
  pub fn request_ancestor(&self, id: &AnimalId, slot: Slot) -> Option<PedigreeEvent> {
    let node = self.tree.find(id)?;
    node.parent(slot).is_none().then(|| PedigreeEvent::AddAncestor {
      subject: node.id.clone(),
      slot,
    })
  }

  fn is_expandable(&self, id: &AnimalId) -> bool {
    self.tree.find(id).is_some_and(PedigreeNode::has_parents)
  }

  fn push_rows(
    &self,
    node: &PedigreeNode,
    generation: usize,
    slot: Option<Slot>,
    rows: &mut Vec<PedigreeRow>,
  ) {
    let expander = if !node.has_parents() {
      Expander::None
    } else if self.is_expanded(&node.id) {
      Expander::Expanded
    } else {
      Expander::Collapsed
    };

    let titles: Vec<String> =
      node.titles.iter().take(MAX_VISIBLE_TITLES).cloned().collect();

    rows.push(PedigreeRow {
      generation,
      slot,
      id: node.id.clone(),
      registered_name: node.registered_name.clone(),
      call_name: node.call_name.clone(),
      gender: node.gender,
      hidden_titles: node.titles.len() - titles.len(),
      titles,
      expander,
      open_slots: Slot::ALL
        .into_iter()
        .filter(|s| node.parent(*s).is_none())
        .collect(),
    });

    if expander == Expander::Expanded {
      for parent_slot in Slot::ALL {
        if let Some(parent) = node.parent(parent_slot) {
          self.push_rows(parent, generation + 1, Some(parent_slot), rows);
        }
      }
    }
  }
}

fn collect_expandable(node: &PedigreeNode, out: &mut Vec<AnimalId>) {
  if node.has_parents() {
    out.push(node.id.clone());
  }
  for slot in Slot::ALL {
    if let Some(parent) = node.parent(slot) {
      collect_expandable(parent, out);
    }
  }
}

impl fmt::Display for PedigreeView {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for row in self.rows() {
      let marker = match row.expander {
        Expander::None => ' ',
        Expander::Expanded => '▾',
        Expander::Collapsed => '▸',
      };
      let glyph = match row.gender {
        Gender::Male => '♂',
        Gender::Female => '♀',
      };
      let slot = row.slot.map(|s| format!("{s}: ")).unwrap_or_default();

      write!(
        f,
        "{indent}{marker} {slot}{glyph} {call} ({registered})",
        indent = "  ".repeat(row.generation),
        call = row.call_name,
        registered = row.registered_name,
      )?;
      if !row.titles.is_empty() {
        write!(f, " [{}", row.titles.join(", "))?;
        if row.hidden_titles > 0 {
          write!(f, " +{}", row.hidden_titles)?;
        }
        write!(f, "]")?;
      }
      writeln!(f)?;
    }
    Ok(())
  }
}
