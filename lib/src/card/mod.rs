mod card;
mod mana_symbol;

pub use card::*;
pub use mana_symbol::*;
