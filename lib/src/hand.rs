//! # Opening hands and mulligans
//!
//! A `HandSimulator` deals a random opening hand from a snapshot of a deck list.
//! Every mulligan shuffles the whole deck again and deals one card fewer,
//! from 7 cards down to 1.
use crate::deck::DeckList;
use rand::prelude::*;
use rand::rngs::SmallRng;
use std::error::Error;
use std::fmt;

pub const STARTING_HAND_SIZE: usize = 7;

/// HandState is the size of the hand currently on display
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandState {
  Seven,
  Six,
  Five,
  Four,
  Three,
  Two,
  One,
  Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandError {
  /// The deck has fewer cards than a starting hand
  DeckTooSmall { required: usize, available: usize },
  /// The hand is already down to a single card
  NoFurtherMulligan,
  /// No hand has been drawn
  NotDrawing,
}

impl fmt::Display for HandError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::DeckTooSmall {
        required,
        available,
      } => write!(
        f,
        "a hand needs at least {} cards in the deck, found {}",
        required, available
      ),
      Self::NoFurtherMulligan => write!(f, "cannot mulligan below one card"),
      Self::NotDrawing => write!(f, "no hand has been drawn"),
    }
  }
}

impl Error for HandError {}

impl HandState {
  /// Returns the number of cards dealt in this state
  pub fn size(self) -> Option<usize> {
    match self {
      Self::Seven => Some(7),
      Self::Six => Some(6),
      Self::Five => Some(5),
      Self::Four => Some(4),
      Self::Three => Some(3),
      Self::Two => Some(2),
      Self::One => Some(1),
      Self::Closed => None,
    }
  }

  /// Returns the state after a mulligan
  pub fn mulligan(self) -> Result<Self, HandError> {
    match self {
      Self::Seven => Ok(Self::Six),
      Self::Six => Ok(Self::Five),
      Self::Five => Ok(Self::Four),
      Self::Four => Ok(Self::Three),
      Self::Three => Ok(Self::Two),
      Self::Two => Ok(Self::One),
      Self::One => Err(HandError::NoFurtherMulligan),
      Self::Closed => Err(HandError::NotDrawing),
    }
  }

  pub fn can_mulligan(self) -> bool {
    self.mulligan().is_ok()
  }
}

impl Default for HandState {
  fn default() -> Self {
    Self::Closed
  }
}

/// Library is the shuffled deck that a hand is dealt from
#[derive(Debug, Default, Clone)]
pub struct Library {
  cards: Vec<String>,
}

impl Library {
  /// Returns an unshuffled library holding `quantity` copies of every deck row
  pub fn from_deck(deck: &DeckList) -> Self {
    Self {
      cards: deck.flatten().into_iter().map(String::from).collect(),
    }
  }

  /// Shuffles the library, every order being equally likely
  pub fn shuffle(&mut self, rng: &mut impl Rng) {
    self.cards.shuffle(rng);
  }

  /// Takes the top card
  pub fn draw(&mut self) -> Option<String> {
    self.cards.pop()
  }

  pub fn len(&self) -> usize {
    self.cards.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cards.is_empty()
  }

  pub fn cards(&self) -> &[String] {
    &self.cards
  }
}

/// HandSimulator deals opening hands and walks through mulligans
#[derive(Debug)]
pub struct HandSimulator<R = SmallRng> {
  rng: R,
  deck: DeckList,
  library: Library,
  hand: Vec<String>,
  state: HandState,
}

impl HandSimulator<SmallRng> {
  /// Returns a simulator seeded from system entropy
  pub fn new() -> Self {
    Self::with_rng(SmallRng::from_entropy())
  }

  /// Returns a simulator with reproducible draws
  pub fn seeded(seed: u64) -> Self {
    Self::with_rng(SmallRng::seed_from_u64(seed))
  }
}

impl Default for HandSimulator<SmallRng> {
  fn default() -> Self {
    Self::new()
  }
}

impl<R: Rng> HandSimulator<R> {
  pub fn with_rng(rng: R) -> Self {
    Self {
      rng,
      deck: DeckList::new(),
      library: Library::default(),
      hand: Vec::with_capacity(STARTING_HAND_SIZE),
      state: HandState::Closed,
    }
  }

  /// Deals a 7 card hand from a snapshot of `deck`
  pub fn begin(&mut self, deck: &DeckList) -> Result<&[String], HandError> {
    let available = deck.total_quantity();
    if available < STARTING_HAND_SIZE {
      return Err(HandError::DeckTooSmall {
        required: STARTING_HAND_SIZE,
        available,
      });
    }
    self.deck = deck.clone();
    self.state = HandState::Seven;
    self.deal();
    Ok(&self.hand)
  }

  /// Shuffles the whole deck again and deals one card fewer
  pub fn mulligan(&mut self) -> Result<&[String], HandError> {
    self.state = self.state.mulligan()?;
    self.deal();
    Ok(&self.hand)
  }

  /// Throws away the hand, the library and the deck snapshot
  pub fn close(&mut self) {
    self.state = HandState::Closed;
    self.deck.clear();
    self.library = Library::default();
    self.hand.clear();
  }

  pub fn state(&self) -> HandState {
    self.state
  }

  pub fn hand(&self) -> &[String] {
    &self.hand
  }

  /// Returns the cards left after dealing the hand
  pub fn library(&self) -> &Library {
    &self.library
  }

  pub fn is_open(&self) -> bool {
    self.state != HandState::Closed
  }

  fn deal(&mut self) {
    let size = self.state.size().unwrap_or(0);
    self.library = Library::from_deck(&self.deck);
    self.library.shuffle(&mut self.rng);
    self.hand.clear();
    for _ in 0..size {
      match self.library.draw() {
        Some(card) => self.hand.push(card),
        None => break,
      }
    }
    debug!(
      "Dealt {} cards, {} left in library",
      self.hand.len(),
      self.library.len()
    );
  }
}

#[cfg(test)]
mod tests {
  use crate::deck::DeckList;
  use crate::hand::*;
  use std::collections::HashMap;

  fn forty_card_deck() -> DeckList {
    let mut deck = DeckList::new();
    deck.add("Island", 9);
    deck.add("Mountain", 8);
    deck.add("Opt", 4);
    deck.add("Shock", 4);
    deck.add("Fire // Ice", 3);
    deck.add("Niv-Mizzet, Parun", 1);
    deck.add("Izzet Charm", 4);
    deck.add("Lightning Strike", 4);
    deck.add("Crackling Drake", 3);
    assert_eq!(deck.total_quantity(), 40);
    deck
  }

  fn counts(cards: &[String]) -> HashMap<&str, usize> {
    let mut m = HashMap::new();
    for card in cards {
      *m.entry(card.as_str()).or_insert(0) += 1;
    }
    m
  }

  #[test]
  fn begin_deals_seven() {
    let deck = forty_card_deck();
    let mut sim = HandSimulator::seeded(7);
    let hand = sim.begin(&deck).unwrap().to_vec();
    assert_eq!(hand.len(), 7);
    for (name, count) in counts(&hand) {
      assert!(count <= deck.quantity(name), "{} drawn {} times", name, count);
    }
    assert_eq!(sim.state(), HandState::Seven);
    assert_eq!(sim.library().len(), 33);
  }

  #[test]
  fn hand_and_library_partition_the_deck() {
    let deck = forty_card_deck();
    let mut sim = HandSimulator::seeded(99);
    sim.begin(&deck).unwrap();
    let mut all = sim.hand().to_vec();
    all.extend(sim.library().cards().iter().cloned());
    let all = counts(&all);
    for entry in deck.iter() {
      assert_eq!(all[entry.name.as_str()], entry.quantity);
    }
  }

  #[test]
  fn exact_seven_card_deck() {
    let mut deck = DeckList::new();
    deck.add("Island", 4);
    deck.add("Plains", 3);
    assert_eq!(deck.total_quantity(), 7);
    let mut sim = HandSimulator::seeded(1);
    let hand = sim.begin(&deck).unwrap();
    let c = counts(hand);
    assert_eq!(c["Island"], 4);
    assert_eq!(c["Plains"], 3);
    assert!(sim.library().is_empty());
  }

  #[test]
  fn small_deck_is_rejected() {
    let mut deck = DeckList::new();
    deck.add("Island", 6);
    let mut sim = HandSimulator::seeded(1);
    assert_eq!(
      sim.begin(&deck).unwrap_err(),
      HandError::DeckTooSmall {
        required: 7,
        available: 6
      }
    );
    assert_eq!(sim.state(), HandState::Closed);
  }

  #[test]
  fn mulligans_shrink_by_one() {
    let deck = forty_card_deck();
    let mut sim = HandSimulator::seeded(3);
    sim.begin(&deck).unwrap();
    for expected in (2..=6).rev() {
      let hand = sim.mulligan().unwrap();
      assert_eq!(hand.len(), expected);
      // every mulligan starts from the full deck
      assert_eq!(sim.library().len(), 40 - expected);
    }
    assert_eq!(sim.state(), HandState::Two);
    assert_eq!(sim.hand().len(), 2);
    assert_eq!(sim.mulligan().unwrap().len(), 1);
    assert_eq!(sim.state(), HandState::One);
    assert!(!sim.state().can_mulligan());
    assert_eq!(sim.mulligan().unwrap_err(), HandError::NoFurtherMulligan);
    assert_eq!(sim.hand().len(), 1);
  }

  #[test]
  fn mulligan_without_hand() {
    let mut sim = HandSimulator::seeded(3);
    assert_eq!(sim.mulligan().unwrap_err(), HandError::NotDrawing);
  }

  #[test]
  fn close_discards_session() {
    let deck = forty_card_deck();
    let mut sim = HandSimulator::seeded(3);
    sim.begin(&deck).unwrap();
    sim.mulligan().unwrap();
    sim.close();
    assert_eq!(sim.state(), HandState::Closed);
    assert!(sim.hand().is_empty());
    assert!(sim.library().is_empty());
    assert!(!sim.is_open());
    assert_eq!(sim.mulligan().unwrap_err(), HandError::NotDrawing);
    // a new session starts over at seven
    assert_eq!(sim.begin(&deck).unwrap().len(), 7);
  }

  #[test]
  fn snapshot_is_independent_of_later_edits() {
    let mut deck = forty_card_deck();
    let mut sim = HandSimulator::seeded(11);
    sim.begin(&deck).unwrap();
    deck.clear();
    sim.mulligan().unwrap();
    assert_eq!(sim.hand().len(), 6);
    assert_eq!(sim.library().len(), 34);
  }

  #[test]
  fn seeded_draws_repeat() {
    let deck = forty_card_deck();
    let mut a = HandSimulator::seeded(42);
    let mut b = HandSimulator::seeded(42);
    assert_eq!(a.begin(&deck).unwrap(), b.begin(&deck).unwrap());
  }

  #[test]
  fn state_sizes() {
    let mut state = HandState::Seven;
    let mut sizes = vec![state.size().unwrap()];
    while let Ok(next) = state.mulligan() {
      state = next;
      sizes.push(state.size().unwrap());
    }
    assert_eq!(sizes, vec![7, 6, 5, 4, 3, 2, 1]);
    assert_eq!(HandState::Closed.size(), None);
    assert_eq!(HandState::default(), HandState::Closed);
  }

  #[test]
  fn shuffles_reach_every_card() {
    // the top card of a shuffled library should, over many shuffles, be every row
    let mut deck = DeckList::new();
    deck.add("Island", 4);
    deck.add("Plains", 3);
    deck.add("Opt", 1);
    let mut rng = SmallRng::seed_from_u64(5);
    let mut seen = HashMap::new();
    for _ in 0..400 {
      let mut library = Library::from_deck(&deck);
      library.shuffle(&mut rng);
      *seen.entry(library.draw().unwrap()).or_insert(0) += 1;
    }
    assert_eq!(seen.len(), 3);
    assert!(seen["Island"] > seen["Opt"]);
  }
}
