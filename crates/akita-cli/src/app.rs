//! Application state machine and event dispatcher.

use std::{collections::HashMap, sync::Arc};

use akita_core::{
  animal::{Animal, AnimalId, Slot},
  enroll::EnrollmentFields,
  view::{PedigreeEvent, PedigreeRow, PedigreeView},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};

use crate::client::{ApiClient, Enrollment};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the animal list.
  AnimalList,
  /// Focus on the pedigree pane.
  Pedigree,
}

// ─── Enrollment prompt ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptField {
  RegisteredName,
  CallName,
}

/// Two-field form for recording an unknown sire or dam.
#[derive(Debug, Clone)]
pub struct EnrollPrompt {
  pub subject:         AnimalId,
  pub subject_name:    String,
  pub slot:            Slot,
  pub registered_name: String,
  pub call_name:       String,
  pub field:           PromptField,
}

impl EnrollPrompt {
  fn new(subject: AnimalId, subject_name: String, slot: Slot) -> Self {
    Self {
      subject,
      subject_name,
      slot,
      registered_name: String::new(),
      call_name: String::new(),
      field: PromptField::RegisteredName,
    }
  }

  fn active_mut(&mut self) -> &mut String {
    match self.field {
      PromptField::RegisteredName => &mut self.registered_name,
      PromptField::CallName => &mut self.call_name,
    }
  }

  fn next_field(&mut self) {
    self.field = match self.field {
      PromptField::RegisteredName => PromptField::CallName,
      PromptField::CallName => PromptField::RegisteredName,
    };
  }

  fn is_complete(&self) -> bool {
    !self.registered_name.trim().is_empty() && !self.call_name.trim().is_empty()
  }

  fn fields(&self) -> EnrollmentFields {
    EnrollmentFields::named(self.registered_name.trim(), self.call_name.trim())
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// All animals returned by the API on startup.
  pub animals: Vec<Animal>,

  /// Current fuzzy-filter string (only active when `filter_active`).
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *filtered* animal list.
  pub list_cursor: usize,

  /// Pedigree views fetched this session, keyed by root animal. Expansion
  /// state lives in the view, so returning to an animal keeps it.
  pub pedigrees: HashMap<AnimalId, PedigreeView>,

  /// Root of the pedigree on screen.
  pub current: Option<AnimalId>,

  /// Animals navigated away from, most recent last.
  pub history: Vec<AnimalId>,

  /// Cursor position within the visible pedigree rows.
  pub tree_cursor: usize,

  /// Open enrollment form, if any.
  pub prompt: Option<EnrollPrompt>,

  /// Ancestor generations requested per pedigree.
  pub depth: u8,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  /// Create an [`App`] with an empty animal list.
  pub fn new(client: ApiClient, depth: u8) -> Self {
    Self {
      screen: Screen::AnimalList,
      animals: Vec::new(),
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      pedigrees: HashMap::new(),
      current: None,
      history: Vec::new(),
      tree_cursor: 0,
      prompt: None,
      depth,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch all animals from the API and populate `self.animals`.
  pub async fn load_animals(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading animals…".into();
    match self.client.list_animals().await {
      Ok(animals) => {
        self.animals = animals;
        self.list_cursor = 0;
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        Err(e)
      }
    }
  }

  /// Make `id` the pedigree on screen, fetching it only if it is not cached.
  async fn show_pedigree(&mut self, id: AnimalId) -> bool {
    if !self.pedigrees.contains_key(&id) {
      self.status_msg = "Loading pedigree…".into();
      match self.client.get_pedigree(&id, self.depth).await {
        Ok(tree) => {
          self.pedigrees.insert(id.clone(), PedigreeView::new(tree));
          self.status_msg = String::new();
        }
        Err(e) => {
          tracing::warn!(%id, "pedigree fetch failed: {e:#}");
          self.status_msg = format!("Error: {e}");
          return false;
        }
      }
    }
    self.current = Some(id);
    self.tree_cursor = 0;
    self.screen = Screen::Pedigree;
    true
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Returns animals that match the current filter query.
  pub fn filtered_animals(&self) -> Vec<&Animal> {
    if self.filter.is_empty() {
      return self.animals.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .animals
      .iter()
      .filter(|a| {
        matcher.fuzzy_match(&a.call_name, &self.filter).is_some()
          || matcher
            .fuzzy_match(&a.registered_name, &self.filter)
            .is_some()
      })
      .collect()
  }

  /// The animal under the list cursor in the filtered view, if any.
  pub fn cursor_animal(&self) -> Option<&Animal> {
    let list = self.filtered_animals();
    list.get(self.list_cursor).copied()
  }

  // ── Pedigree pane ─────────────────────────────────────────────────────────

  pub fn current_view(&self) -> Option<&PedigreeView> {
    self.current.as_ref().and_then(|id| self.pedigrees.get(id))
  }

  fn current_view_mut(&mut self) -> Option<&mut PedigreeView> {
    let id = self.current.as_ref()?;
    self.pedigrees.get_mut(id)
  }

  pub fn visible_rows(&self) -> Vec<PedigreeRow> {
    self.current_view().map(PedigreeView::rows).unwrap_or_default()
  }

  /// The pedigree row under the tree cursor.
  pub fn cursor_row(&self) -> Option<PedigreeRow> {
    self.visible_rows().into_iter().nth(self.tree_cursor)
  }

  fn clamp_tree_cursor(&mut self) {
    let len = self.visible_rows().len();
    self.tree_cursor = self.tree_cursor.min(len.saturating_sub(1));
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if self.prompt.is_some() {
      self.handle_prompt_key(key).await;
      return Ok(true);
    }

    // Filter input mode: all printable keys go into the filter string.
    if self.filter_active {
      return self.handle_filter_key(key).await;
    }

    match self.screen {
      Screen::AnimalList => self.handle_list_key(key).await,
      Screen::Pedigree => self.handle_pedigree_key(key).await,
    }
  }

  async fn handle_filter_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.list_cursor = 0;
        // Open the pedigree straight away if there's exactly one match.
        let only = match self.filtered_animals().as_slice() {
          [one] => Some(one.id.clone()),
          _ => None,
        };
        if let Some(id) = only {
          self.open_from_list(id).await;
        }
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
    Ok(true)
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.filtered_animals().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_animal().map(|a| a.id.clone()) {
          self.open_from_list(id).await;
        }
      }

      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }

      _ => {}
    }
    Ok(true)
  }

  async fn handle_pedigree_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::AnimalList;
      }

      KeyCode::Down | KeyCode::Char('j') => {
        if self.tree_cursor + 1 < self.visible_rows().len() {
          self.tree_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.tree_cursor = self.tree_cursor.saturating_sub(1);
      }

      KeyCode::Char(' ') => {
        if let Some(row) = self.cursor_row()
          && let Some(view) = self.current_view_mut()
        {
          view.toggle(&row.id);
        }
        self.clamp_tree_cursor();
      }
      KeyCode::Char('e') => {
        if let Some(view) = self.current_view_mut() {
          view.expand_all();
        }
      }
      KeyCode::Char('c') => {
        if let Some(view) = self.current_view_mut() {
          view.collapse_all();
        }
        self.clamp_tree_cursor();
      }

      KeyCode::Enter => {
        let event = self
          .cursor_row()
          .and_then(|row| self.current_view()?.select(&row.id));
        if let Some(PedigreeEvent::Navigate(id)) = event {
          self.navigate_to(id).await;
        }
      }
      KeyCode::Backspace => self.go_back().await,

      KeyCode::Char('s') => self.request_ancestor(Slot::Sire),
      KeyCode::Char('d') => self.request_ancestor(Slot::Dam),

      KeyCode::Char('r') => {
        if let Some(id) = self.current.clone() {
          self.pedigrees.remove(&id);
          self.show_pedigree(id).await;
        }
      }

      _ => {}
    }
    Ok(true)
  }

  async fn open_from_list(&mut self, id: AnimalId) {
    self.history.clear();
    self.show_pedigree(id).await;
  }

  /// Follow a node to its own pedigree, remembering where we came from.
  async fn navigate_to(&mut self, id: AnimalId) {
    if self.current.as_ref() == Some(&id) {
      return;
    }
    let previous = self.current.clone();
    if self.show_pedigree(id).await
      && let Some(prev) = previous
    {
      self.history.push(prev);
    }
  }

  async fn go_back(&mut self) {
    if let Some(prev) = self.history.pop()
      && !self.show_pedigree(prev.clone()).await
    {
      self.history.push(prev);
    }
  }

  fn request_ancestor(&mut self, slot: Slot) {
    let Some(row) = self.cursor_row() else {
      return;
    };
    let event = self
      .current_view()
      .and_then(|view| view.request_ancestor(&row.id, slot));
    match event {
      Some(PedigreeEvent::AddAncestor { subject, slot }) => {
        self.prompt = Some(EnrollPrompt::new(subject, row.call_name, slot));
        self.status_msg = String::new();
      }
      _ => {
        self.status_msg = format!("{} already has a {slot} on record", row.call_name);
      }
    }
  }

  // ── Enrollment prompt ─────────────────────────────────────────────────────

  async fn handle_prompt_key(&mut self, key: KeyEvent) {
    let Some(prompt) = self.prompt.as_mut() else {
      return;
    };
    match key.code {
      KeyCode::Esc => {
        self.prompt = None;
        self.status_msg = "Enrollment cancelled".into();
      }
      KeyCode::Tab | KeyCode::BackTab => prompt.next_field(),
      KeyCode::Backspace => {
        prompt.active_mut().pop();
      }
      KeyCode::Char(c) => prompt.active_mut().push(c),
      KeyCode::Enter => {
        if prompt.field == PromptField::RegisteredName {
          prompt.next_field();
        } else if prompt.is_complete() {
          if let Some(prompt) = self.prompt.take() {
            self.submit_enrollment(prompt).await;
          }
        } else {
          self.status_msg = "Registered name and call name are required".into();
        }
      }
      _ => {}
    }
  }

  async fn submit_enrollment(&mut self, prompt: EnrollPrompt) {
    self.status_msg = "Enrolling…".into();
    let result = self
      .client
      .enroll_ancestor(&prompt.subject, prompt.slot, &prompt.fields())
      .await;

    match result {
      Ok(Enrollment::Linked(animal)) => {
        self.status_msg = format!(
          "Enrolled {} as {} of {}",
          animal.call_name, prompt.slot, prompt.subject_name
        );
        self.animals.push(animal);
      }
      Ok(Enrollment::Orphaned { orphan, message }) => {
        self.status_msg =
          format!("Link failed, unlinked record {} left behind: {message}", orphan.id);
        self.animals.push(orphan);
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        return;
      }
    }

    // Any cached tree may contain the subject; drop them all and refetch the
    // one on screen.
    self.pedigrees.clear();
    if let Some(id) = self.current.clone() {
      let cursor = self.tree_cursor;
      let status = std::mem::take(&mut self.status_msg);
      self.show_pedigree(id).await;
      if self.status_msg.is_empty() {
        self.status_msg = status;
      }
      self.tree_cursor = cursor;
      self.clamp_tree_cursor();
    }
  }
}

#[cfg(test)]
mod tests {
  use akita_core::{animal::Gender, pedigree::PedigreeNode};

  use super::*;
  use crate::client::ApiConfig;

  fn node(id: &str, gender: Gender) -> PedigreeNode {
    PedigreeNode {
      id:              AnimalId::new(id),
      registered_name: format!("Registered {id}"),
      call_name:       id.to_uppercase(),
      gender,
      titles:          vec![],
      sire:            None,
      dam:             None,
    }
  }

  /// An app whose pedigree cache already holds `pup` and `sire`, so no key
  /// press in these tests reaches the network.
  fn app() -> App {
    let client = ApiClient::new(ApiConfig {
      base_url: "http://127.0.0.1:9".into(),
    })
    .unwrap();
    let mut app = App::new(client, 4);

    let mut sire = node("sire", Gender::Male);
    sire.sire = Some(Box::new(node("gs", Gender::Male)));
    let mut pup = node("pup", Gender::Female);
    pup.sire = Some(Box::new(sire.clone()));

    app.pedigrees.insert(AnimalId::new("pup"), PedigreeView::new(pup));
    app.pedigrees.insert(AnimalId::new("sire"), PedigreeView::new(sire));
    app.current = Some(AnimalId::new("pup"));
    app.screen = Screen::Pedigree;
    app
  }

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  async fn press(app: &mut App, code: KeyCode) {
    assert!(app.handle_key(key(code)).await.unwrap());
  }

  #[tokio::test]
  async fn space_toggles_without_refetch() {
    let mut app = app();
    assert_eq!(app.visible_rows().len(), 2);

    press(&mut app, KeyCode::Down).await;
    press(&mut app, KeyCode::Char(' ')).await;
    assert_eq!(app.visible_rows().len(), 3);

    press(&mut app, KeyCode::Char(' ')).await;
    assert_eq!(app.visible_rows().len(), 2);
    assert_eq!(app.pedigrees.len(), 2);
  }

  #[tokio::test]
  async fn enter_navigates_and_backspace_returns() {
    let mut app = app();
    press(&mut app, KeyCode::Down).await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.current, Some(AnimalId::new("sire")));
    assert_eq!(app.history, [AnimalId::new("pup")]);
    assert_eq!(app.tree_cursor, 0);

    press(&mut app, KeyCode::Backspace).await;
    assert_eq!(app.current, Some(AnimalId::new("pup")));
    assert!(app.history.is_empty());
  }

  #[tokio::test]
  async fn selecting_the_root_stays_put() {
    let mut app = app();
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.current, Some(AnimalId::new("pup")));
    assert!(app.history.is_empty());
  }

  #[tokio::test]
  async fn enrollment_prompt_only_for_empty_slots() {
    let mut app = app();

    press(&mut app, KeyCode::Char('s')).await;
    assert!(app.prompt.is_none());
    assert!(app.status_msg.contains("already has a sire"));

    press(&mut app, KeyCode::Char('d')).await;
    let prompt = app.prompt.as_ref().unwrap();
    assert_eq!(prompt.subject, AnimalId::new("pup"));
    assert_eq!(prompt.slot, Slot::Dam);
  }

  #[tokio::test]
  async fn prompt_collects_both_fields() {
    let mut app = app();
    press(&mut app, KeyCode::Char('d')).await;

    for c in "Yuki".chars() {
      press(&mut app, KeyCode::Char(c)).await;
    }
    press(&mut app, KeyCode::Enter).await;
    for c in "Yu".chars() {
      press(&mut app, KeyCode::Char(c)).await;
    }
    press(&mut app, KeyCode::Backspace).await;

    let prompt = app.prompt.as_ref().unwrap();
    assert_eq!(prompt.registered_name, "Yuki");
    assert_eq!(prompt.call_name, "Y");
    assert_eq!(prompt.field, PromptField::CallName);

    press(&mut app, KeyCode::Esc).await;
    assert!(app.prompt.is_none());
    assert_eq!(app.pedigrees.len(), 2);
  }

  #[tokio::test]
  async fn incomplete_prompt_is_not_submitted() {
    let mut app = app();
    press(&mut app, KeyCode::Char('d')).await;
    press(&mut app, KeyCode::Enter).await;
    press(&mut app, KeyCode::Enter).await;
    assert!(app.prompt.is_some());
    assert!(app.status_msg.contains("required"));
  }

  #[test]
  fn filter_matches_call_and_registered_names() {
    let mut app = app();
    let now = chrono::Utc::now();
    for (name, call) in [("Sakura's Rising Sun", "Kenji"), ("Kuma's Dew", "Tsuyu")] {
      app.animals.push(Animal {
        id:                  AnimalId::new(call),
        registered_name:     name.into(),
        call_name:           call.into(),
        gender:              Gender::Male,
        sire_id:             None,
        dam_id:              None,
        titles:              vec![],
        owner_id:            "owner-1".into(),
        registration_number: None,
        color:               None,
        date_of_birth:       None,
        origin:              Default::default(),
        created_at:          now,
        updated_at:          now,
      });
    }

    app.filter = "knj".into();
    assert_eq!(app.filtered_animals().len(), 1);
    app.filter = "kuma".into();
    assert_eq!(app.filtered_animals()[0].call_name, "Tsuyu");
    app.filter.clear();
    assert_eq!(app.filtered_animals().len(), 2);
  }
}
