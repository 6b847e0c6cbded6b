//! # Internal card representation
//!
use crate::card::mana_symbol::ManaSymbol;
use std::hash::{Hash, Hasher};

// NOTE: PartialEq and Eq are implemented below
/// Card represents a Magic: The Gathering card as returned by a card source
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct Card {
  /// The canonical card name
  pub name: String,
  /// Mana cost symbol tokens in printed order, e.g. `["2", "White", "Blue"]`
  #[serde(default)]
  pub mana_cost: Vec<String>,
  /// The full type line, e.g. "Legendary Creature — Human Wizard"
  #[serde(default)]
  pub type_line: String,
  /// The encoded card image, empty if the source could not provide one
  #[serde(default)]
  pub image: Vec<u8>,
}

impl Card {
  /// Returns an empty card
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns a card that only carries `query` as its name, used as a display
  /// fallback when a lookup fails
  pub fn placeholder(query: &str) -> Self {
    Self {
      name: query.to_string(),
      ..Self::default()
    }
  }

  /// Returns the recognized mana symbols, skipping unknown tokens
  pub fn symbols(&self) -> impl Iterator<Item = ManaSymbol> + '_ {
    self
      .mana_cost
      .iter()
      .filter_map(|token| ManaSymbol::from_token(token))
  }

  /// Returns the converted mana cost of the card
  pub fn cmc(&self) -> u32 {
    crate::curve::converted_cost(self.symbols())
  }

  /// Returns the mana cost in "{2}{W}{U}" style format
  pub fn mana_cost_string(&self) -> String {
    self.symbols().map(|s| s.to_string()).collect()
  }

  /// Returns true if the card type is a land
  pub fn is_land(&self) -> bool {
    self.type_line.contains("Land")
  }

  /// Returns true if the card name names two faces, like "Fire // Ice"
  pub fn is_split(&self) -> bool {
    self.name.contains("//")
  }

  pub fn has_image(&self) -> bool {
    !self.image.is_empty()
  }
}

impl PartialEq for Card {
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name
  }
}

impl Eq for Card {}

impl Hash for Card {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.name.hash(state);
  }
}

#[cfg(test)]
mod tests {
  use crate::card::*;

  fn card(name: &str, mana_cost: &[&str], type_line: &str) -> Card {
    Card {
      name: name.to_string(),
      mana_cost: mana_cost.iter().map(|s| s.to_string()).collect(),
      type_line: type_line.to_string(),
      image: Vec::new(),
    }
  }

  #[test]
  fn card_steam_vents() {
    let card = card("Steam Vents", &[], "Land — Island Mountain");
    assert_eq!(card.is_land(), true);
    assert_eq!(card.cmc(), 0);
    assert_eq!(card.mana_cost_string(), "");
  }

  #[test]
  fn card_arcades_the_strategist() {
    let card = card(
      "Arcades, the Strategist",
      &["1", "Green", "White", "Blue"],
      "Legendary Creature — Elder Dragon",
    );
    assert_eq!(card.is_land(), false);
    assert_eq!(card.cmc(), 4);
    assert_eq!(card.mana_cost_string(), "{1}{G}{W}{U}");
  }

  #[test]
  fn card_carnival_carnage() {
    let card = card(
      "Carnival // Carnage",
      &["B/R", "2", "B", "R"],
      "Instant // Sorcery",
    );
    assert!(card.is_split());
    assert_eq!(card.cmc(), 5);
  }

  #[test]
  fn card_ignores_unknown_tokens() {
    let card = card("Odd Card", &["2", "Tap", "Blue"], "Artifact");
    assert_eq!(card.cmc(), 3);
    assert_eq!(card.mana_cost_string(), "{2}{U}");
  }

  #[test]
  fn placeholder_keeps_query() {
    let card = Card::placeholder("lightnig bolt");
    assert_eq!(card.name, "lightnig bolt");
    assert!(card.mana_cost.is_empty());
    assert!(!card.has_image());
  }

  #[test]
  fn cards_compare_by_name() {
    let a = card("Opt", &["U"], "Instant");
    let b = card("Opt", &[], "");
    assert_eq!(a, b);
  }
}
