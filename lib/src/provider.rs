//! # Card lookup and caching
//!
//! A `CardSource` knows how to look a card up by name, e.g. by scraping a card
//! database or by searching a local catalog. A `CardProvider` wraps a source
//! with a cache keyed by the exact query string, so each distinct query hits the
//! source at most once (unless it fails).
use crate::card::Card;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// FetchError represents a failed card lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
  /// The source could not be reached
  Network(String),
  /// The source answered with something that is not a card
  Parse(String),
  /// The source has no card for the query
  NotFound(String),
}

impl fmt::Display for FetchError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Network(e) => write!(f, "network error: {}", e),
      Self::Parse(e) => write!(f, "cannot parse card: {}", e),
      Self::NotFound(query) => write!(f, "no card named \"{}\"", query),
    }
  }
}

impl Error for FetchError {}

/// CardSource looks cards up by name without any caching
pub trait CardSource {
  fn fetch(&self, query: &str) -> Result<Card, FetchError>;
}

impl<S: CardSource + ?Sized> CardSource for Box<S> {
  fn fetch(&self, query: &str) -> Result<Card, FetchError> {
    (**self).fetch(query)
  }
}

#[derive(Debug)]
pub enum CacheError {
  Io(std::io::Error),
  Bincode(bincode::Error),
}

impl fmt::Display for CacheError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Io(e) => write!(f, "card cache io error: {}", e),
      Self::Bincode(e) => write!(f, "card cache encoding error: {}", e),
    }
  }
}

impl Error for CacheError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      Self::Io(e) => Some(e),
      Self::Bincode(e) => Some(e),
    }
  }
}

impl From<std::io::Error> for CacheError {
  fn from(error: std::io::Error) -> Self {
    Self::Io(error)
  }
}

impl From<bincode::Error> for CacheError {
  fn from(error: bincode::Error) -> Self {
    Self::Bincode(error)
  }
}

type Slot = Arc<OnceCell<Arc<Card>>>;

/// CardProvider is a `CardSource` plus a cache of every card it has returned.
///
/// The provider is shared between the interaction thread and fetch workers,
/// so all methods take `&self`.
pub struct CardProvider<S> {
  source: S,
  cache: Mutex<HashMap<String, Slot>>,
}

impl<S: CardSource> CardProvider<S> {
  pub fn new(source: S) -> Self {
    Self {
      source,
      cache: Mutex::new(HashMap::new()),
    }
  }

  /// Returns the card for `query`, asking the source only on a cache miss.
  ///
  /// Concurrent calls for the same query wait for a single source fetch.
  /// Failures are not cached.
  pub fn fetch(&self, query: &str) -> Result<Arc<Card>, FetchError> {
    let slot = {
      let mut cache = self.cache.lock();
      cache
        .entry(query.to_string())
        .or_insert_with(Default::default)
        .clone()
    };
    let result = slot
      .get_or_try_init(|| {
        debug!("Fetching card \"{}\"", query);
        self.source.fetch(query).map(Arc::new)
      })
      .map(Arc::clone);
    if result.is_err() {
      let mut cache = self.cache.lock();
      let unfilled = match cache.get(query) {
        Some(entry) => Arc::ptr_eq(entry, &slot) && entry.get().is_none(),
        None => false,
      };
      if unfilled {
        cache.remove(query);
      }
    }
    result
  }

  /// Returns the card for `query` only if it was fetched before
  pub fn cached(&self, query: &str) -> Option<Arc<Card>> {
    let cache = self.cache.lock();
    cache.get(query).and_then(|slot| slot.get().cloned())
  }

  /// Returns the canonical name for `query`, or `query` itself when the
  /// lookup fails
  pub fn display_name(&self, query: &str) -> String {
    match self.fetch(query) {
      Ok(card) => card.name.clone(),
      Err(e) => {
        warn!("Using \"{}\" as its own name: {}", query, e);
        query.to_string()
      }
    }
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  /// Returns the number of cached cards
  pub fn len(&self) -> usize {
    let cache = self.cache.lock();
    cache.values().filter(|slot| slot.get().is_some()).count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Writes every cached card to `path` as gzip compressed bincode
  pub fn save_cache<P: AsRef<Path>>(&self, path: P) -> Result<usize, CacheError> {
    let entries: Vec<(String, Card)> = {
      let cache = self.cache.lock();
      cache
        .iter()
        .filter_map(|(query, slot)| slot.get().map(|card| (query.clone(), (**card).clone())))
        .collect()
    };
    let path = path.as_ref();
    info!("Writing {} cached cards @ {}", entries.len(), path.display());
    let encoded = bincode::serialize(&entries)?;
    let file = File::create(path)?;
    let mut e = GzEncoder::new(file, Compression::default());
    e.write_all(&encoded[..])?;
    e.finish()?;
    Ok(entries.len())
  }

  /// Reads cards written by `save_cache` into the cache.
  /// Cards already in the cache are kept.
  pub fn load_cache<P: AsRef<Path>>(&self, path: P) -> Result<usize, CacheError> {
    let path = path.as_ref();
    info!("Loading cached cards @ {}", path.display());
    let mut gz = GzDecoder::new(File::open(path)?);
    let mut s: Vec<u8> = Vec::new();
    gz.read_to_end(&mut s)?;
    let entries: Vec<(String, Card)> = bincode::deserialize(&s)?;
    let count = entries.len();
    let mut cache = self.cache.lock();
    for (query, card) in entries {
      let slot = cache.entry(query).or_insert_with(Default::default);
      let _ = slot.set(Arc::new(card));
    }
    Ok(count)
  }
}

impl<S: fmt::Debug> fmt::Debug for CardProvider<S> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CardProvider")
      .field("source", &self.source)
      .field("queries", &self.cache.lock().len())
      .finish()
  }
}
