//! Card lookups against the Gatherer card database, by scraping the card
//! details page.
use deck_editor::card::Card;
use deck_editor::config::GathererConfig;
use deck_editor::provider::{CardSource, FetchError};
use regex::Regex;
use select::document::Document;
use select::node::Node;
use select::predicate::{Attr, Name, Predicate};

const ROW_ID_PREFIX: &str = "ctl00_ctl00_ctl00_MainContent_SubContent_SubContent_";

#[derive(Debug)]
pub struct Gatherer {
  client: reqwest::blocking::Client,
  config: GathererConfig,
}

impl Gatherer {
  pub fn new(config: GathererConfig) -> Result<Self, reqwest::Error> {
    let client = reqwest::blocking::Client::builder()
      .user_agent(concat!("mtg-deck-editor/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { client, config })
  }

  pub fn details_url(&self, query: &str) -> String {
    self.config.details_url.replace("%s", &details_query(query))
  }

  /// Split cards are printed sideways, so their image is requested rotated
  pub fn image_url(&self, query: &str) -> String {
    let url = self.config.image_url.replace("%s", query);
    if query.contains("//") {
      format!("{}&options=rotate90", url)
    } else {
      url
    }
  }

  fn get(&self, url: &str) -> Result<reqwest::blocking::Response, FetchError> {
    info!("Fetching {}", url);
    let response = self
      .client
      .get(url)
      .send()
      .map_err(|e| FetchError::Network(e.to_string()))?;
    if !response.status().is_success() {
      return Err(FetchError::Network(format!("{} answered {}", url, response.status())));
    }
    Ok(response)
  }

  fn image(&self, query: &str) -> Result<Vec<u8>, FetchError> {
    let bytes = self
      .get(&self.image_url(query))?
      .bytes()
      .map_err(|e| FetchError::Network(e.to_string()))?;
    Ok(bytes.to_vec())
  }
}

impl CardSource for Gatherer {
  fn fetch(&self, query: &str) -> Result<Card, FetchError> {
    let html = self
      .get(&self.details_url(query))?
      .text()
      .map_err(|e| FetchError::Network(e.to_string()))?;
    let mut card = parse_details(&html, query)?;
    if self.config.fetch_images {
      match self.image(query) {
        Ok(image) => card.image = image,
        Err(e) => warn!("No image for \"{}\": {}", query, e),
      }
    }
    Ok(card)
  }
}

/// Returns the details page query for a card name. Gatherer finds split
/// cards by both face names: "Fire // Ice" becomes "[Fire]+[//]+[Ice]".
pub fn details_query(query: &str) -> String {
  lazy_static! {
    static ref SPLIT_NAME_REGEX: Regex =
      Regex::new(r"(.*) // (.*)").expect("Failed to compile SPLIT_NAME_REGEX regex");
  }
  SPLIT_NAME_REGEX
    .replace(query, "[$1]+[//]+[$2]")
    .into_owned()
}

/// Returns the value cell of a details row, the second `div` in the row
fn row_value<'a>(doc: &'a Document, field: &str) -> Option<Node<'a>> {
  let id = format!("{}{}Row", ROW_ID_PREFIX, field);
  doc.find(Attr("id", id.as_str()).child(Name("div"))).nth(1)
}

fn row_text(doc: &Document, field: &str) -> Option<String> {
  row_value(doc, field).map(|node| node.text().trim().to_string())
}

/// Parses a card details page. The mana cost is read from the alt text of
/// the mana symbol images, like "Variable Colorless" or "White or Blue".
pub fn parse_details(html: &str, query: &str) -> Result<Card, FetchError> {
  let doc = Document::from(html);
  let name = match row_text(&doc, "name") {
    Some(name) if !name.is_empty() => name,
    _ => return Err(FetchError::NotFound(query.to_string())),
  };
  let type_line = row_text(&doc, "type")
    .ok_or_else(|| FetchError::Parse(format!("no type line for \"{}\"", name)))?;
  let mana_cost = row_value(&doc, "mana")
    .map(|node| {
      node
        .find(Name("img"))
        .filter_map(|img| img.attr("alt"))
        .map(|alt| alt.trim().to_string())
        .collect()
    })
    .unwrap_or_else(Vec::new);
  Ok(Card {
    name,
    mana_cost,
    type_line,
    image: Vec::new(),
  })
}
