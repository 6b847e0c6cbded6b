//! # Catalog
//!
//! An offline `CardSource` backed by a JSON list of cards, for instance a
//! Scryfall bulk data file.
use crate::card::{mana_cost_tokens, Card};
use crate::provider::{CardSource, FetchError};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

/// A single catalog record. Unknown fields are ignored so that Scryfall
/// card objects can be read as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogCard {
  pub name: String,
  /// Mana cost in "{X}{R}{R}" style format
  #[serde(default)]
  pub mana_cost: String,
  #[serde(default)]
  pub type_line: String,
}

impl From<CatalogCard> for Card {
  fn from(item: CatalogCard) -> Self {
    Card {
      name: item.name.trim().to_string(),
      mana_cost: mana_cost_tokens(&item.mana_cost),
      type_line: item.type_line,
      image: Vec::new(),
    }
  }
}

#[derive(Debug)]
pub enum CatalogError {
  Io(std::io::Error),
  Json(serde_json::Error),
}

impl fmt::Display for CatalogError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Io(e) => write!(f, "catalog io error: {}", e),
      Self::Json(e) => write!(f, "catalog json error: {}", e),
    }
  }
}

impl Error for CatalogError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      Self::Io(e) => Some(e),
      Self::Json(e) => Some(e),
    }
  }
}

impl From<std::io::Error> for CatalogError {
  fn from(error: std::io::Error) -> Self {
    Self::Io(error)
  }
}

impl From<serde_json::Error> for CatalogError {
  fn from(error: serde_json::Error) -> Self {
    Self::Json(error)
  }
}

/// Catalog is a name-sorted list of cards
#[derive(Debug, Default, Clone)]
pub struct Catalog {
  cards: Vec<Card>,
}

impl Catalog {
  /// Returns a new catalog of cards
  pub fn from_cards(mut cards: Vec<Card>) -> Self {
    // sort for binary_search used in card_from_name
    cards.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Self { cards }
  }

  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    let records: Vec<CatalogCard> = serde_json::from_str(json)?;
    Ok(Self::from_cards(records.into_iter().map(Card::from).collect()))
  }

  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
    let path = path.as_ref();
    info!("Loading card catalog @ {}", path.display());
    let json = fs::read_to_string(path)?;
    let catalog = Self::from_json(&json)?;
    info!("Catalog holds {} cards", catalog.len());
    Ok(catalog)
  }

  /// Returns a card from the card name, ignoring case
  pub fn card_from_name(&self, name: &str) -> Option<&Card> {
    let name_lowercase = name.trim().to_lowercase();
    let res = self
      .cards
      .binary_search_by(|card| card.name.to_lowercase().cmp(&name_lowercase));
    res.map(|idx| &self.cards[idx]).ok()
  }

  pub fn len(&self) -> usize {
    self.cards.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cards.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Card> {
    self.cards.iter()
  }
}

impl CardSource for Catalog {
  /// Looks up the full name first. Split cards may also be found by their
  /// left face, "Fire" for "Fire // Ice", or the other way around.
  fn fetch(&self, query: &str) -> Result<Card, FetchError> {
    if let Some(card) = self.card_from_name(query) {
      return Ok(card.clone());
    }
    if let Some(left) = query.split("//").next().filter(|_| query.contains("//")) {
      if let Some(card) = self.card_from_name(left) {
        return Ok(card.clone());
      }
    }
    let query_lowercase = query.trim().to_lowercase();
    self
      .cards
      .iter()
      .find(|card| {
        card.is_split()
          && card
            .name
            .split("//")
            .any(|face| face.trim().to_lowercase() == query_lowercase)
      })
      .cloned()
      .ok_or_else(|| FetchError::NotFound(query.to_string()))
  }
}
