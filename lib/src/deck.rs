//! # Deck lists
//!
//! A `DeckList` maps card names to quantities, in insertion order. Deck files
//! are plain text with one `"<quantity> <name>"` row per line.
use crate::provider::{CardProvider, CardSource};
use regex::Regex;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

/// DeckEntry is a single deck row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
  pub name: String,
  pub quantity: usize,
}

/// DeckList is an ordered list of unique card names and their quantities.
/// No entry ever has a quantity of 0.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckList {
  entries: Vec<DeckEntry>,
}

#[derive(Debug)]
pub enum DeckError {
  Io(std::io::Error),
}

impl fmt::Display for DeckError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Io(e) => write!(f, "deck file error: {}", e),
    }
  }
}

impl Error for DeckError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      Self::Io(e) => Some(e),
    }
  }
}

impl From<std::io::Error> for DeckError {
  fn from(error: std::io::Error) -> Self {
    Self::Io(error)
  }
}

impl DeckList {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds `amount` copies of `name`, merging with an existing row
  pub fn add(&mut self, name: &str, amount: usize) {
    if amount == 0 {
      return;
    }
    match self.position(name) {
      Some(idx) => self.entries[idx].quantity += amount,
      None => self.entries.push(DeckEntry {
        name: name.to_string(),
        quantity: amount,
      }),
    }
  }

  /// Removes `amount` copies of `name`. The row is deleted once its
  /// quantity drops to 0.
  pub fn remove(&mut self, name: &str, amount: usize) {
    if let Some(idx) = self.position(name) {
      let entry = &mut self.entries[idx];
      if entry.quantity > amount {
        entry.quantity -= amount;
      } else {
        self.entries.remove(idx);
      }
    }
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  /// Returns the quantity of `name`, 0 if absent
  pub fn quantity(&self, name: &str) -> usize {
    self
      .position(name)
      .map_or(0, |idx| self.entries[idx].quantity)
  }

  pub fn position(&self, name: &str) -> Option<usize> {
    self.entries.iter().position(|e| e.name == name)
  }

  pub fn get(&self, row: usize) -> Option<&DeckEntry> {
    self.entries.get(row)
  }

  pub fn entries(&self) -> &[DeckEntry] {
    &self.entries
  }

  pub fn iter(&self) -> std::slice::Iter<'_, DeckEntry> {
    self.entries.iter()
  }

  /// Returns the number of rows
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Returns the number of cards in the deck
  pub fn total_quantity(&self) -> usize {
    self.entries.iter().fold(0, |accum, e| accum + e.quantity)
  }

  /// Returns every card name repeated by its quantity
  pub fn flatten(&self) -> Vec<&str> {
    let mut result = Vec::with_capacity(self.total_quantity());
    for entry in &self.entries {
      for _ in 0..entry.quantity {
        result.push(entry.name.as_str());
      }
    }
    result
  }

  /// Returns the deck in deck file format
  pub fn to_text(&self) -> String {
    self.to_string()
  }

  /// Parses deck file rows into `(quantity, query)` pairs.
  ///
  /// A row is a quantity, whitespace, and a card name. Rows whose first word
  /// is not a number, or that have no name, are skipped.
  pub fn parse_lines(text: &str) -> Vec<(usize, String)> {
    lazy_static! {
      static ref DECK_LINE_REGEX: Regex = Regex::new(r"^(?P<amount>\S+)(?:\s+(?P<name>.*))?$")
        .expect("Failed to compile DECK_LINE_REGEX regex");
    }
    let mut rows = Vec::new();
    for line in text.lines() {
      let trimmed = line.trim();
      let caps = match DECK_LINE_REGEX.captures(trimmed) {
        Some(caps) => caps,
        None => continue,
      };
      let amount = match caps["amount"].parse::<usize>() {
        Ok(amount) => amount,
        Err(_) => {
          debug!("Skipping deck line without a quantity: {}", line);
          continue;
        }
      };
      let name = caps.name("name").map_or("", |m| m.as_str().trim());
      if name.is_empty() {
        debug!("Skipping deck line without a card name: {}", line);
        continue;
      }
      rows.push((amount, name.to_string()));
    }
    rows
  }

  /// Builds a deck from deck file text, resolving every name through
  /// `provider` so that rows carry the canonical card name.
  /// Rows that cannot be resolved are dropped.
  pub fn from_text<S: CardSource>(text: &str, provider: &CardProvider<S>) -> Self {
    let mut deck = Self::new();
    for (amount, query) in Self::parse_lines(text) {
      match provider.fetch(&query) {
        Ok(card) => deck.add(&card.name, amount),
        Err(e) => warn!("Dropping deck line \"{} {}\": {}", amount, query, e),
      }
    }
    deck
  }

  /// Reads a deck file
  pub fn load<S, P>(path: P, provider: &CardProvider<S>) -> Result<Self, DeckError>
  where
    S: CardSource,
    P: AsRef<Path>,
  {
    let path = path.as_ref();
    info!("Loading deck @ {}", path.display());
    let text = fs::read_to_string(path)?;
    Ok(Self::from_text(&text, provider))
  }

  /// Writes a deck file
  pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DeckError> {
    let path = path.as_ref();
    info!("Saving {} deck rows @ {}", self.len(), path.display());
    fs::write(path, self.to_text())?;
    Ok(())
  }
}

impl fmt::Display for DeckList {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for entry in &self.entries {
      writeln!(f, "{} {}", entry.quantity, entry.name)?;
    }
    Ok(())
  }
}

impl<'a> IntoIterator for &'a DeckList {
  type Item = &'a DeckEntry;
  type IntoIter = std::slice::Iter<'a, DeckEntry>;

  fn into_iter(self) -> Self::IntoIter {
    self.entries.iter()
  }
}
