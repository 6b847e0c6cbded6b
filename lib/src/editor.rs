//! # Deck editor
//!
//! `Editor` holds everything a deck editor front end shows: the search text
//! and card preview, the deck list, the mana curve and the hand window. Every
//! user action is a method. Actions that need card lookups are handed to a
//! [`Fetcher`] and take effect when their result is picked up by
//! [`Editor::poll`] or [`Editor::settle`].
use crate::card::Card;
use crate::config::Config;
use crate::curve::ManaCurve;
use crate::deck::{DeckError, DeckList};
use crate::fetcher::{Fetcher, Lane};
use crate::hand::{HandError, HandSimulator, HandState, STARTING_HAND_SIZE};
use crate::provider::{CacheError, CardProvider, CardSource, FetchError};
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Preview is the card shown for the current search
#[derive(Debug, Clone)]
pub struct Preview {
  /// The search text this preview answers
  pub query: String,
  /// The name to display, the query itself when the lookup failed
  pub name: String,
  pub card: Option<Arc<Card>>,
  pub error: Option<FetchError>,
}

impl Preview {
  fn resolve<S: CardSource>(provider: &CardProvider<S>, query: &str) -> Self {
    match provider.fetch(query) {
      Ok(card) => Self {
        query: query.to_string(),
        name: card.name.clone(),
        card: Some(card),
        error: None,
      },
      Err(e) => {
        warn!("No preview for \"{}\": {}", query, e);
        Self {
          query: query.to_string(),
          name: query.to_string(),
          card: None,
          error: Some(e),
        }
      }
    }
  }

  pub fn is_found(&self) -> bool {
    self.card.is_some()
  }
}

/// Update is the result of a background job, applied on the editor's thread
#[derive(Debug)]
pub enum Update {
  Preview(Preview),
  Added { name: String, amount: usize },
  Removed { name: String, amount: usize },
  Cleared,
  Imported {
    path: PathBuf,
    result: Result<DeckList, DeckError>,
  },
  Curve(ManaCurve),
}

#[derive(Debug)]
pub enum EditorError {
  /// The action is not available in the current state
  Unavailable(&'static str),
  NoSuchRow(usize),
  Hand(HandError),
  Deck(DeckError),
  Cache(CacheError),
}

impl fmt::Display for EditorError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Unavailable(reason) => write!(f, "{}", reason),
      Self::NoSuchRow(row) => write!(f, "the deck has no row {}", row),
      Self::Hand(e) => write!(f, "{}", e),
      Self::Deck(e) => write!(f, "{}", e),
      Self::Cache(e) => write!(f, "{}", e),
    }
  }
}

impl Error for EditorError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      Self::Hand(e) => Some(e),
      Self::Deck(e) => Some(e),
      Self::Cache(e) => Some(e),
      _ => None,
    }
  }
}

impl From<HandError> for EditorError {
  fn from(error: HandError) -> Self {
    Self::Hand(error)
  }
}

impl From<DeckError> for EditorError {
  fn from(error: DeckError) -> Self {
    Self::Deck(error)
  }
}

impl From<CacheError> for EditorError {
  fn from(error: CacheError) -> Self {
    Self::Cache(error)
  }
}

pub struct Editor<S> {
  config: Config,
  deck: DeckList,
  hand: HandSimulator,
  fetcher: Fetcher<S, Update>,
  search: String,
  preview: Option<Preview>,
  curve_open: bool,
  curve: Option<ManaCurve>,
  notices: Vec<String>,
}

impl<S> Editor<S>
where
  S: CardSource + Send + Sync + 'static,
{
  /// Returns an editor with an empty deck. Cards cached by an earlier run
  /// are loaded when the configured cache file exists.
  pub fn new(source: S, config: Config) -> Self {
    let provider = CardProvider::new(source);
    if let Some(path) = config.cache_path.as_ref().filter(|p| p.exists()) {
      match provider.load_cache(path) {
        Ok(count) => info!("Loaded {} cached cards", count),
        Err(e) => warn!("Ignoring card cache @ {}: {}", path.display(), e),
      }
    }
    let hand = match config.seed {
      Some(seed) => HandSimulator::seeded(seed),
      None => HandSimulator::new(),
    };
    Self {
      config,
      deck: DeckList::new(),
      hand,
      fetcher: Fetcher::new(provider),
      search: String::new(),
      preview: None,
      curve_open: false,
      curve: None,
      notices: Vec::new(),
    }
  }

  /// Sets the search text and previews the card it names
  pub fn search(&mut self, query: &str) {
    self.search = query.to_string();
    if query.trim().is_empty() {
      self.preview = None;
      return;
    }
    let query = query.to_string();
    self
      .fetcher
      .submit(Lane::Preview, move |p| Update::Preview(Preview::resolve(p, &query)));
  }

  /// Searches for the card in deck row `row`
  pub fn select_row(&mut self, row: usize) -> Result<(), EditorError> {
    let name = match self.deck.get(row) {
      Some(entry) => entry.name.clone(),
      None => return Err(EditorError::NoSuchRow(row)),
    };
    self.search(&name);
    Ok(())
  }

  /// Sets the number of copies each add or remove applies
  pub fn set_amount(&mut self, amount: usize) -> Result<(), EditorError> {
    if amount == 0 {
      return Err(EditorError::Unavailable("the card amount must be at least 1"));
    }
    self.config.card_amount = amount;
    Ok(())
  }

  pub fn amount(&self) -> usize {
    self.config.card_amount
  }

  /// Adds the searched card to the deck
  pub fn add_card(&mut self) -> Result<(), EditorError> {
    let query = self.search_query()?;
    let amount = self.config.card_amount;
    self.fetcher.submit(Lane::Edit, move |p| Update::Added {
      name: p.display_name(&query),
      amount,
    });
    Ok(())
  }

  /// Removes the searched card from the deck
  pub fn remove_card(&mut self) -> Result<(), EditorError> {
    let query = self.search_query()?;
    let amount = self.config.card_amount;
    self.fetcher.submit(Lane::Edit, move |p| Update::Removed {
      name: p.display_name(&query),
      amount,
    });
    Ok(())
  }

  /// Empties the deck once the edits queued before it have been applied
  pub fn new_deck(&mut self) {
    self.fetcher.submit(Lane::Edit, |_| Update::Cleared);
  }

  /// Reads a deck file. The current deck is replaced once the file is read
  /// and its cards are looked up, and kept if reading fails. Edits queued
  /// before the call land on the old deck.
  pub fn open<P: AsRef<Path>>(&mut self, path: P) {
    let path = path.as_ref().to_path_buf();
    self.fetcher.submit(Lane::Edit, move |p| {
      let result = DeckList::load(&path, p);
      Update::Imported { path, result }
    });
  }

  /// Writes the deck file
  pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), EditorError> {
    self.deck.save(path)?;
    Ok(())
  }

  /// Whether the deck, with the edits applied so far, has any card
  pub fn can_show_curve(&self) -> bool {
    self.deck.total_quantity() > 0
  }

  /// Opens the curve window and computes the curve of the current deck
  pub fn show_curve(&mut self) -> Result<(), EditorError> {
    self.settle_edits();
    if !self.can_show_curve() {
      return Err(EditorError::Unavailable("the deck is empty"));
    }
    self.curve_open = true;
    let deck = self.deck.clone();
    self
      .fetcher
      .submit(Lane::Curve, move |p| Update::Curve(ManaCurve::from_deck(&deck, p)));
    Ok(())
  }

  pub fn close_curve(&mut self) {
    self.curve_open = false;
    self.curve = None;
  }

  /// Whether the deck, with the edits applied so far, holds a full hand
  pub fn can_draw_hand(&self) -> bool {
    self.deck.total_quantity() >= STARTING_HAND_SIZE
  }

  /// Opens the hand window with a fresh 7 card hand
  pub fn draw_hand(&mut self) -> Result<&[String], EditorError> {
    self.settle_edits();
    Ok(self.hand.begin(&self.deck)?)
  }

  pub fn can_mulligan(&self) -> bool {
    self.hand.state().can_mulligan()
  }

  pub fn mulligan(&mut self) -> Result<&[String], EditorError> {
    Ok(self.hand.mulligan()?)
  }

  pub fn close_hand(&mut self) {
    self.hand.close();
  }

  /// Applies every background result that has arrived. Returns the number
  /// of updates applied.
  pub fn poll(&mut self) -> usize {
    let completed = self.fetcher.drain();
    let count = completed.len();
    for c in completed {
      self.apply(c.value);
    }
    count
  }

  /// Waits for the queued deck edits, applying whatever else arrives meanwhile
  fn settle_edits(&mut self) {
    while self.fetcher.pending_in(Lane::Edit) > 0 {
      match self.fetcher.recv() {
        Some(c) => self.apply(c.value),
        None => break,
      }
    }
  }

  /// Waits for every outstanding background job and applies the results
  pub fn settle(&mut self) -> usize {
    let mut count = 0;
    while let Some(c) = self.fetcher.recv() {
      self.apply(c.value);
      count += 1;
    }
    count
  }

  /// Writes the card cache, if one is configured
  pub fn save_cache(&self) -> Result<Option<usize>, EditorError> {
    match &self.config.cache_path {
      Some(path) => Ok(Some(self.fetcher.provider().save_cache(path)?)),
      None => Ok(None),
    }
  }

  /// Returns and clears the messages produced while applying results
  pub fn take_notices(&mut self) -> Vec<String> {
    std::mem::replace(&mut self.notices, Vec::new())
  }

  pub fn deck(&self) -> &DeckList {
    &self.deck
  }

  pub fn search_text(&self) -> &str {
    &self.search
  }

  pub fn preview(&self) -> Option<&Preview> {
    self.preview.as_ref()
  }

  /// Returns the curve once it is computed, `None` while the curve window is
  /// closed
  pub fn curve(&self) -> Option<&ManaCurve> {
    self.curve.as_ref()
  }

  pub fn is_curve_open(&self) -> bool {
    self.curve_open
  }

  pub fn hand(&self) -> &[String] {
    self.hand.hand()
  }

  pub fn hand_state(&self) -> HandState {
    self.hand.state()
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn provider(&self) -> &CardProvider<S> {
    self.fetcher.provider()
  }

  /// Returns the number of background jobs still running
  pub fn pending(&self) -> usize {
    self.fetcher.pending()
  }

  fn search_query(&self) -> Result<String, EditorError> {
    if self.search.trim().is_empty() {
      return Err(EditorError::Unavailable("search for a card first"));
    }
    Ok(self.search.clone())
  }

  fn apply(&mut self, update: Update) {
    match update {
      Update::Preview(preview) => {
        // the search text may have changed since the job was queued
        if preview.query == self.search {
          self.preview = Some(preview);
        }
      }
      Update::Added { name, amount } => {
        debug!("Adding {} {}", amount, name);
        self.deck.add(&name, amount);
      }
      Update::Removed { name, amount } => {
        debug!("Removing {} {}", amount, name);
        self.deck.remove(&name, amount);
      }
      Update::Cleared => {
        info!("Starting a new deck");
        self.deck.clear();
      }
      Update::Imported { path, result } => match result {
        Ok(deck) => {
          info!("Opened {} with {} cards", path.display(), deck.total_quantity());
          self.deck = deck;
        }
        Err(e) => {
          error!("Cannot open {}: {}", path.display(), e);
          self
            .notices
            .push(format!("cannot open {}: {}", path.display(), e));
        }
      },
      Update::Curve(curve) => {
        if self.curve_open {
          self.curve = Some(curve);
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::catalog::Catalog;
  use crate::curve::CurveColor;
  use crate::editor::*;

  const CATALOG: &str = r#"[
    {"name": "Island", "type_line": "Basic Land — Island"},
    {"name": "Mountain", "type_line": "Basic Land — Mountain"},
    {"name": "Opt", "mana_cost": "{U}", "type_line": "Instant"},
    {"name": "Shock", "mana_cost": "{R}", "type_line": "Instant"},
    {"name": "Izzet Charm", "mana_cost": "{U}{R}", "type_line": "Instant"},
    {"name": "Fire // Ice", "mana_cost": "{1}{R} // {1}{U}", "type_line": "Instant // Instant"}
  ]"#;

  fn editor() -> Editor<Catalog> {
    let config = Config {
      cache_path: None,
      seed: Some(1),
      ..Config::default()
    };
    Editor::new(Catalog::from_json(CATALOG).unwrap(), config)
  }

  fn add(editor: &mut Editor<Catalog>, query: &str, amount: usize) {
    editor.set_amount(amount).unwrap();
    editor.search(query);
    editor.add_card().unwrap();
    editor.settle();
  }

  fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("deck-editor-{}-{}", std::process::id(), name))
  }

  #[test]
  fn search_previews_card() {
    let mut editor = editor();
    editor.search("izzet charm");
    editor.settle();
    let preview = editor.preview().unwrap();
    assert!(preview.is_found());
    assert_eq!(preview.name, "Izzet Charm");
    assert_eq!(preview.card.as_ref().unwrap().cmc(), 2);
  }

  #[test]
  fn failed_search_shows_query() {
    let mut editor = editor();
    editor.search("Lightnig Bolt");
    editor.settle();
    let preview = editor.preview().unwrap();
    assert!(!preview.is_found());
    assert_eq!(preview.name, "Lightnig Bolt");
    assert_eq!(
      preview.error,
      Some(FetchError::NotFound("Lightnig Bolt".to_string()))
    );
  }

  #[test]
  fn last_search_wins() {
    let mut editor = editor();
    editor.search("Opt");
    editor.search("Shock");
    editor.settle();
    assert_eq!(editor.preview().unwrap().name, "Shock");
    assert_eq!(editor.search_text(), "Shock");
  }

  #[test]
  fn add_uses_canonical_name() {
    let mut editor = editor();
    add(&mut editor, "opt", 4);
    add(&mut editor, "OPT", 2);
    assert_eq!(editor.deck().len(), 1);
    assert_eq!(editor.deck().quantity("Opt"), 6);
  }

  #[test]
  fn add_unknown_card_uses_query() {
    let mut editor = editor();
    add(&mut editor, "Doo Whisperer", 1);
    assert_eq!(editor.deck().quantity("Doo Whisperer"), 1);
  }

  #[test]
  fn edits_apply_in_order() {
    let mut editor = editor();
    editor.set_amount(3).unwrap();
    editor.search("Opt");
    editor.add_card().unwrap();
    editor.set_amount(1).unwrap();
    editor.remove_card().unwrap();
    editor.remove_card().unwrap();
    editor.settle();
    assert_eq!(editor.deck().quantity("Opt"), 1);
  }

  #[test]
  fn remove_to_zero_deletes_row() {
    let mut editor = editor();
    add(&mut editor, "Opt", 2);
    editor.set_amount(5).unwrap();
    editor.remove_card().unwrap();
    editor.settle();
    assert!(editor.deck().is_empty());
  }

  #[test]
  fn add_needs_search_text() {
    let mut editor = editor();
    assert!(editor.add_card().is_err());
    assert!(editor.set_amount(0).is_err());
    assert_eq!(editor.amount(), 1);
  }

  #[test]
  fn select_row_searches_entry() {
    let mut editor = editor();
    add(&mut editor, "Opt", 1);
    add(&mut editor, "fire // ice", 1);
    editor.search("");
    editor.select_row(1).unwrap();
    editor.settle();
    assert_eq!(editor.search_text(), "Fire // Ice");
    assert!(editor.preview().unwrap().is_found());
    match editor.select_row(5) {
      Err(EditorError::NoSuchRow(5)) => {}
      other => panic!("expected missing row, got {:?}", other),
    }
  }

  #[test]
  fn curve_and_hand_availability() {
    let mut editor = editor();
    assert!(!editor.can_show_curve());
    assert!(!editor.can_draw_hand());
    assert!(editor.show_curve().is_err());
    match editor.draw_hand() {
      Err(EditorError::Hand(HandError::DeckTooSmall { available: 0, .. })) => {}
      other => panic!("expected small deck error, got {:?}", other),
    }
    add(&mut editor, "Island", 6);
    assert!(editor.can_show_curve());
    assert!(!editor.can_draw_hand());
    add(&mut editor, "Opt", 1);
    assert!(editor.can_draw_hand());
  }

  #[test]
  fn show_curve() {
    let mut editor = editor();
    add(&mut editor, "Island", 10);
    add(&mut editor, "Opt", 4);
    add(&mut editor, "Izzet Charm", 2);
    editor.show_curve().unwrap();
    assert!(editor.is_curve_open());
    editor.settle();
    let curve = editor.curve().unwrap();
    assert_eq!(curve.count(1, CurveColor::Blue), 4);
    assert_eq!(curve.count(2, CurveColor::Multicolor), 2);
    assert_eq!(curve.total(), 6);
    editor.close_curve();
    assert!(editor.curve().is_none());
  }

  #[test]
  fn closed_curve_ignores_late_result() {
    let mut editor = editor();
    add(&mut editor, "Opt", 1);
    editor.show_curve().unwrap();
    editor.close_curve();
    editor.settle();
    assert!(editor.curve().is_none());
  }

  #[test]
  fn hand_and_mulligans() {
    let mut editor = editor();
    add(&mut editor, "Island", 20);
    add(&mut editor, "Opt", 20);
    assert_eq!(editor.draw_hand().unwrap().len(), 7);
    assert_eq!(editor.hand_state(), HandState::Seven);
    for size in (1..=6).rev() {
      assert!(editor.can_mulligan());
      assert_eq!(editor.mulligan().unwrap().len(), size);
    }
    assert!(!editor.can_mulligan());
    assert!(editor.mulligan().is_err());
    editor.close_hand();
    assert_eq!(editor.hand_state(), HandState::Closed);
    assert!(editor.hand().is_empty());
  }

  #[test]
  fn new_deck_clears() {
    let mut editor = editor();
    add(&mut editor, "Opt", 4);
    editor.new_deck();
    editor.settle();
    assert!(editor.deck().is_empty());
  }

  #[test]
  fn queued_add_does_not_survive_new_deck() {
    let mut editor = editor();
    editor.search("Opt");
    editor.add_card().unwrap();
    editor.new_deck();
    editor.settle();
    assert!(editor.deck().is_empty());
  }

  #[test]
  fn queued_add_lands_before_open() {
    let path = temp_path("queued_add_lands_before_open.txt");
    let mut editor = editor();
    add(&mut editor, "Island", 4);
    editor.save(&path).unwrap();
    editor.new_deck();
    editor.search("Shock");
    editor.add_card().unwrap();
    editor.open(&path);
    editor.settle();
    let _ = std::fs::remove_file(&path);
    assert_eq!(editor.deck().to_text(), "4 Island\n");
  }

  #[test]
  fn hand_and_curve_see_queued_edits() {
    let mut editor = editor();
    editor.set_amount(7).unwrap();
    editor.search("Island");
    editor.add_card().unwrap();
    assert_eq!(editor.draw_hand().unwrap().len(), 7);
    editor.close_hand();

    editor.new_deck();
    editor.set_amount(2).unwrap();
    editor.search("Shock");
    editor.add_card().unwrap();
    editor.show_curve().unwrap();
    editor.settle();
    assert_eq!(editor.curve().unwrap().total(), 2);
  }

  #[test]
  fn save_and_open() {
    let path = temp_path("save_and_open.txt");
    let mut editor = editor();
    add(&mut editor, "Island", 4);
    add(&mut editor, "Fire // Ice", 2);
    editor.save(&path).unwrap();

    editor.new_deck();
    editor.open(&path);
    editor.settle();
    let _ = std::fs::remove_file(&path);
    assert_eq!(editor.deck().to_text(), "4 Island\n2 Fire // Ice\n");
    assert!(editor.take_notices().is_empty());
  }

  #[test]
  fn failed_open_keeps_deck() {
    let mut editor = editor();
    add(&mut editor, "Opt", 4);
    editor.open(temp_path("missing.txt"));
    editor.settle();
    assert_eq!(editor.deck().quantity("Opt"), 4);
    let notices = editor.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].starts_with("cannot open"));
    assert!(editor.take_notices().is_empty());
  }

  #[test]
  fn cache_persists_between_editors() {
    let path = temp_path("editor-cache.gz");
    let config = Config {
      cache_path: Some(path.clone()),
      ..Config::default()
    };
    let mut editor = Editor::new(Catalog::from_json(CATALOG).unwrap(), config.clone());
    editor.search("Opt");
    editor.settle();
    assert_eq!(editor.save_cache().unwrap(), Some(1));

    // an empty catalog can still answer from the cache
    let mut editor = Editor::new(Catalog::default(), config);
    editor.search("Opt");
    editor.settle();
    let _ = std::fs::remove_file(&path);
    assert!(editor.preview().unwrap().is_found());
  }

  #[test]
  fn no_cache_path_saves_nothing() {
    let editor = editor();
    assert_eq!(editor.save_cache().unwrap(), None);
  }
}
