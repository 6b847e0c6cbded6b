use std::fmt;

/// ManaColor represents one of the five [colors](https://mtg.gamepedia.com/Color)
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ManaColor {
  #[serde(rename = "W")]
  White,
  #[serde(rename = "U")]
  Blue,
  #[serde(rename = "B")]
  Black,
  #[serde(rename = "R")]
  Red,
  #[serde(rename = "G")]
  Green,
}

impl ManaColor {
  pub const ALL: [ManaColor; 5] = [
    ManaColor::White,
    ManaColor::Blue,
    ManaColor::Black,
    ManaColor::Red,
    ManaColor::Green,
  ];

  /// Returns the color for either a single letter ("W") or a word ("White")
  pub fn from_name(name: &str) -> Option<Self> {
    match name.trim() {
      "W" | "w" | "White" => Some(Self::White),
      "U" | "u" | "Blue" => Some(Self::Blue),
      "B" | "b" | "Black" => Some(Self::Black),
      "R" | "r" | "Red" => Some(Self::Red),
      "G" | "g" | "Green" => Some(Self::Green),
      _ => None,
    }
  }

  pub fn letter(self) -> char {
    match self {
      Self::White => 'W',
      Self::Blue => 'U',
      Self::Black => 'B',
      Self::Red => 'R',
      Self::Green => 'G',
    }
  }
}

/// ManaSymbol is a single parsed [mana symbol](https://mtg.gamepedia.com/Mana_symbol)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManaSymbol {
  /// {0}, {1}, {2}, ...
  Generic(u32),
  /// {X}, {Y} or {Z}
  Variable,
  /// {C}
  Colorless,
  /// {S}
  Snow,
  /// {W}, {U}, {B}, {R}, {G}
  Colored(ManaColor),
  /// {W/P}
  Phyrexian(ManaColor),
  /// {W/U}
  Hybrid(ManaColor, ManaColor),
  /// {2/W}
  TwoHybrid(ManaColor),
}

impl ManaSymbol {
  /// Parses a single mana cost token.
  ///
  /// Accepts the brace notation used by most card databases (`"{W/U}"`, `"R"`, `"{2/G}"`)
  /// as well as the image alt text used by Gatherer (`"White or Blue"`, `"Phyrexian Red"`,
  /// `"Variable Colorless"`). Returns `None` for anything else.
  pub fn from_token(token: &str) -> Option<Self> {
    let token = token.trim();
    let token = token
      .strip_prefix('{')
      .and_then(|t| t.strip_suffix('}'))
      .unwrap_or(token)
      .trim();
    if token.is_empty() {
      return None;
    }
    if let Ok(n) = token.parse::<u32>() {
      return Some(Self::Generic(n));
    }
    match token {
      "X" | "Y" | "Z" | "x" | "Variable Colorless" => return Some(Self::Variable),
      "C" | "Colorless" => return Some(Self::Colorless),
      "S" | "Snow" => return Some(Self::Snow),
      _ => {}
    }
    if let Some(color) = ManaColor::from_name(token) {
      return Some(Self::Colored(color));
    }
    if token.contains('/') {
      return Self::from_slashed(token);
    }
    if let Some(rest) = token.strip_prefix("Phyrexian ") {
      return match Self::from_token(rest)? {
        Self::Colored(color) => Some(Self::Phyrexian(color)),
        hybrid @ Self::Hybrid(_, _) => Some(hybrid),
        _ => None,
      };
    }
    if let Some((left, right)) = split_once(token, " or ") {
      if left == "Two" {
        return ManaColor::from_name(right).map(Self::TwoHybrid);
      }
      return match (ManaColor::from_name(left), ManaColor::from_name(right)) {
        (Some(a), Some(b)) => Some(Self::Hybrid(a, b)),
        _ => None,
      };
    }
    None
  }

  fn from_slashed(token: &str) -> Option<Self> {
    let parts: Vec<&str> = token.split('/').map(str::trim).collect();
    match parts.as_slice() {
      [color, "P"] | [color, "p"] => ManaColor::from_name(color).map(Self::Phyrexian),
      ["2", color] => ManaColor::from_name(color).map(Self::TwoHybrid),
      [a, b] | [a, b, "P"] | [a, b, "p"] => {
        match (ManaColor::from_name(a), ManaColor::from_name(b)) {
          (Some(a), Some(b)) => Some(Self::Hybrid(a, b)),
          _ => None,
        }
      }
      _ => None,
    }
  }

  /// Returns the amount this symbol adds to the converted mana cost
  pub fn cmc(self) -> u32 {
    match self {
      Self::Generic(n) => n,
      Self::Variable => 0,
      Self::TwoHybrid(_) => 2,
      _ => 1,
    }
  }
}

impl fmt::Display for ManaSymbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      Self::Generic(n) => write!(f, "{{{}}}", n),
      Self::Variable => write!(f, "{{X}}"),
      Self::Colorless => write!(f, "{{C}}"),
      Self::Snow => write!(f, "{{S}}"),
      Self::Colored(c) => write!(f, "{{{}}}", c.letter()),
      Self::Phyrexian(c) => write!(f, "{{{}/P}}", c.letter()),
      Self::Hybrid(a, b) => write!(f, "{{{}/{}}}", a.letter(), b.letter()),
      Self::TwoHybrid(c) => write!(f, "{{2/{}}}", c.letter()),
    }
  }
}

fn split_once<'a>(s: &'a str, pat: &str) -> Option<(&'a str, &'a str)> {
  let idx = s.find(pat)?;
  Some((s[..idx].trim(), s[idx + pat.len()..].trim()))
}

/// Splits a mana cost string like `"{2}{W}{U/B}"` into its symbol tokens.
/// Characters outside of braces are ignored.
pub fn mana_cost_tokens(mana_cost_str: &str) -> Vec<String> {
  let mut sigil = String::new();
  let mut tokens = Vec::new();
  let mut in_symbol = false;
  for c in mana_cost_str.chars() {
    match c {
      '{' => {
        sigil.clear();
        in_symbol = true;
      }
      '}' => {
        if in_symbol && !sigil.is_empty() {
          tokens.push(sigil.clone());
        }
        in_symbol = false;
      }
      c if in_symbol => sigil.push(c),
      _ => {}
    }
  }
  tokens
}
