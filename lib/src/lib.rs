//! # Magic: The Gathering Deck Editor Library
//!
//! deck_editor is the toolkit independent core of a deck editor for Magic: The Gathering.
//! It looks cards up by name through a cached card source, keeps a deck list with quantities,
//! classifies the deck's mana curve for a stacked bar chart, and deals random opening hands
//! with mulligans. The [`editor::Editor`] ties these together behind one method per user action.

#[macro_use]
extern crate serde_derive;
extern crate serde;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate bincode;
extern crate flate2;
extern crate once_cell;
extern crate parking_lot;
extern crate rand;
extern crate regex;

pub mod card;
pub mod catalog;
pub mod config;
pub mod curve;
pub mod deck;
pub mod dispatch;
pub mod editor;
pub mod fetcher;
pub mod hand;
pub mod provider;

pub use crate::editor::Editor;
pub use crate::provider::{CardProvider, CardSource, FetchError};
