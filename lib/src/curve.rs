//! # Mana curve classification
//!
//! Every non-land card in a deck is placed into a `(converted cost, color)` bucket.
//! The color is a single color when every colored symbol agrees, and
//! [`CurveColor::Multicolor`] otherwise.
use crate::card::{Card, ManaColor, ManaSymbol};
use crate::deck::DeckList;
use crate::provider::{CardProvider, CardSource};
use std::collections::BTreeMap;

/// The number of columns in the curve chart, for converted costs 0 through 14
pub const CURVE_COLUMNS: usize = 15;

/// CurveColor is the color bucket a card is drawn in on the curve chart
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CurveColor {
  Colorless,
  White,
  Blue,
  Black,
  Red,
  Green,
  Multicolor,
}

impl CurveColor {
  /// All buckets, in chart stacking order from the bottom up
  pub const ALL: [CurveColor; 7] = [
    CurveColor::Colorless,
    CurveColor::White,
    CurveColor::Blue,
    CurveColor::Black,
    CurveColor::Red,
    CurveColor::Green,
    CurveColor::Multicolor,
  ];

  pub fn letter(self) -> char {
    match self {
      Self::Colorless => 'c',
      Self::White => 'w',
      Self::Blue => 'u',
      Self::Black => 'b',
      Self::Red => 'r',
      Self::Green => 'g',
      Self::Multicolor => 'm',
    }
  }

  /// Bar color, from the Tango palette
  pub fn hex(self) -> &'static str {
    match self {
      Self::Colorless => "#c17d11",
      Self::White => "#eeeeec",
      Self::Blue => "#3465a4",
      Self::Black => "#555753",
      Self::Red => "#cc0000",
      Self::Green => "#73d216",
      Self::Multicolor => "#c4a000",
    }
  }

  fn index(self) -> usize {
    self as usize
  }
}

impl From<ManaColor> for CurveColor {
  fn from(color: ManaColor) -> Self {
    match color {
      ManaColor::White => Self::White,
      ManaColor::Blue => Self::Blue,
      ManaColor::Black => Self::Black,
      ManaColor::Red => Self::Red,
      ManaColor::Green => Self::Green,
    }
  }
}

/// Returns the converted mana cost of a sequence of symbols
pub fn converted_cost<I>(symbols: I) -> u32
where
  I: IntoIterator<Item = ManaSymbol>,
{
  symbols.into_iter().map(ManaSymbol::cmc).sum()
}

/// Returns the single curve color for a sequence of symbols.
///
/// The first colored symbol establishes the color. A symbol of a different
/// color, or any two-color hybrid symbol, makes the result multicolor, and
/// multicolor never reverts.
pub fn curve_color<I>(symbols: I) -> CurveColor
where
  I: IntoIterator<Item = ManaSymbol>,
{
  let mut current = CurveColor::Colorless;
  for symbol in symbols {
    let color = match symbol {
      ManaSymbol::Colored(c) | ManaSymbol::Phyrexian(c) | ManaSymbol::TwoHybrid(c) => c,
      ManaSymbol::Hybrid(a, b) if a == b => a,
      ManaSymbol::Hybrid(_, _) => return CurveColor::Multicolor,
      _ => continue,
    };
    let color = CurveColor::from(color);
    if current == CurveColor::Colorless {
      current = color;
    } else if current != color {
      return CurveColor::Multicolor;
    }
  }
  current
}

/// Classifies raw mana cost tokens into `(converted cost, color)`.
/// Unrecognized tokens are ignored.
pub fn classify<T: AsRef<str>>(tokens: &[T]) -> (u32, CurveColor) {
  let symbols: Vec<ManaSymbol> = tokens
    .iter()
    .filter_map(|t| ManaSymbol::from_token(t.as_ref()))
    .collect();
  (
    converted_cost(symbols.iter().copied()),
    curve_color(symbols.iter().copied()),
  )
}

/// ManaCurve holds card counts per `(converted cost, color)` bucket
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManaCurve {
  counts: BTreeMap<(u32, CurveColor), usize>,
}

impl ManaCurve {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns the curve of all non-land cards in `deck`.
  ///
  /// Every row is looked up through `provider`. Rows that fail to resolve
  /// are left out of the curve.
  pub fn from_deck<S: CardSource>(deck: &DeckList, provider: &CardProvider<S>) -> Self {
    let mut curve = Self::new();
    for entry in deck.iter() {
      let card = match provider.fetch(&entry.name) {
        Ok(card) => card,
        Err(e) => {
          warn!("Leaving \"{}\" out of the mana curve: {}", entry.name, e);
          continue;
        }
      };
      if card.is_land() {
        continue;
      }
      curve.insert_card(&card, entry.quantity);
    }
    curve
  }

  pub fn insert_card(&mut self, card: &Card, quantity: usize) {
    let (cmc, color) = classify(&card.mana_cost[..]);
    self.insert(cmc, color, quantity);
  }

  pub fn insert(&mut self, cmc: u32, color: CurveColor, quantity: usize) {
    if quantity == 0 {
      return;
    }
    *self.counts.entry((cmc, color)).or_insert(0) += quantity;
  }

  /// Returns the count for a single bucket
  pub fn count(&self, cmc: u32, color: CurveColor) -> usize {
    self.counts.get(&(cmc, color)).copied().unwrap_or(0)
  }

  /// Returns the total number of cards on the curve
  pub fn total(&self) -> usize {
    self.counts.values().sum()
  }

  pub fn is_empty(&self) -> bool {
    self.counts.is_empty()
  }

  /// Returns the average converted mana cost of the cards on the curve
  pub fn average_cmc(&self) -> f64 {
    let total = self.total();
    if total == 0 {
      return 0.0;
    }
    let sum = self
      .counts
      .iter()
      .fold(0usize, |accum, ((cmc, _), count)| accum + *cmc as usize * count);
    sum as f64 / total as f64
  }

  pub fn iter(&self) -> impl Iterator<Item = (u32, CurveColor, usize)> + '_ {
    self
      .counts
      .iter()
      .map(|(&(cmc, color), &count)| (cmc, color, count))
  }

  /// Returns one series per color, in `CurveColor::ALL` order, ready to be
  /// drawn as a stacked bar chart. Costs beyond the last column are counted
  /// in the last column.
  pub fn columns(&self) -> [[usize; CURVE_COLUMNS]; 7] {
    let mut columns = [[0; CURVE_COLUMNS]; 7];
    for (cmc, color, count) in self.iter() {
      let column = std::cmp::min(cmc as usize, CURVE_COLUMNS - 1);
      columns[color.index()][column] += count;
    }
    columns
  }
}
