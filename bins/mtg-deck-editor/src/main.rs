extern crate deck_editor;
extern crate env_logger;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate regex;
extern crate reqwest;
extern crate select;

mod gatherer;

use deck_editor::catalog::Catalog;
use deck_editor::config::Config;
use deck_editor::curve::{CurveColor, CURVE_COLUMNS};
use deck_editor::dispatch::{ActionError, ActionTable};
use deck_editor::editor::Editor;
use deck_editor::provider::CardSource;
use gatherer::Gatherer;
use std::env;
use std::io::prelude::*;

type Source = Box<dyn CardSource + Send + Sync>;

struct Shell {
  editor: Editor<Source>,
  running: bool,
}

impl Shell {
  fn print_notices(&mut self) {
    for notice in self.editor.take_notices() {
      println!("! {}", notice);
    }
  }

  fn print_preview(&self) {
    match self.editor.preview() {
      Some(preview) => match &preview.card {
        Some(card) => {
          println!("{}", card.name);
          println!("  mana cost: {}", card.mana_cost_string());
          println!("  converted: {}", card.cmc());
          println!("  type:      {}", card.type_line);
          if card.has_image() {
            println!("  image:     {} bytes", card.image.len());
          }
        }
        None => match &preview.error {
          Some(e) => println!("{} ({})", preview.name, e),
          None => println!("{}", preview.name),
        },
      },
      None => println!("nothing to show"),
    }
  }

  fn print_deck(&self) {
    let deck = self.editor.deck();
    for (row, entry) in deck.iter().enumerate() {
      println!("{:>3}. {:>2} {}", row + 1, entry.quantity, entry.name);
    }
    println!("     {} cards", deck.total_quantity());
  }

  fn print_hand(&self) {
    println!("{:?} card hand:", self.editor.hand_state());
    for card in self.editor.hand() {
      println!("  {}", card);
    }
    if self.editor.can_mulligan() {
      println!("(mulligan to draw one card fewer)");
    }
  }

  fn print_curve(&self) {
    let curve = match self.editor.curve() {
      Some(curve) => curve,
      None => {
        println!("no curve");
        return;
      }
    };
    let columns = curve.columns();
    for cmc in 0..CURVE_COLUMNS {
      let mut bar = String::new();
      for color in CurveColor::ALL.iter() {
        let count = columns[*color as usize][cmc];
        bar.extend(std::iter::repeat(color.letter()).take(count));
      }
      let label = if cmc == CURVE_COLUMNS - 1 {
        format!("{}+", cmc)
      } else {
        cmc.to_string()
      };
      println!("{:>3} | {}", label, bar);
    }
    println!("{} spells, average cost {:.2}", curve.total(), curve.average_cmc());
  }

  /// Searches for `args` first, if given
  fn search_for(&mut self, args: &str) {
    if !args.is_empty() {
      self.editor.search(args);
    }
  }
}

fn actions() -> ActionTable<Shell> {
  let mut table = ActionTable::new();
  table.register("search", "search <name>", "Look a card up", |s: &mut Shell, args: &str| {
    if args.is_empty() {
      return Err(ActionError::Usage("search <name>"));
    }
    s.editor.search(args);
    s.editor.settle();
    s.print_preview();
    Ok(())
  });
  table.register("amount", "amount <n>", "Set copies per add or remove", |s: &mut Shell, args: &str| {
    let amount: usize = args.parse().map_err(|_| ActionError::Usage("amount <n>"))?;
    s.editor.set_amount(amount)?;
    Ok(())
  });
  table.register("add", "add [name]", "Add the searched card", |s: &mut Shell, args: &str| {
    s.search_for(args);
    s.editor.add_card()?;
    s.editor.settle();
    s.print_deck();
    Ok(())
  });
  table.register("remove", "remove [name]", "Remove the searched card", |s: &mut Shell, args: &str| {
    s.search_for(args);
    s.editor.remove_card()?;
    s.editor.settle();
    s.print_deck();
    Ok(())
  });
  table.register("select", "select <row>", "Search the card in a deck row", |s: &mut Shell, args: &str| {
    let row: usize = args.parse().map_err(|_| ActionError::Usage("select <row>"))?;
    if row == 0 {
      return Err(ActionError::Usage("select <row>"));
    }
    s.editor.select_row(row - 1)?;
    s.editor.settle();
    s.print_preview();
    Ok(())
  });
  table.register("list", "list", "Show the deck", |s: &mut Shell, _: &str| {
    s.print_deck();
    Ok(())
  });
  table.register("new", "new", "Start an empty deck", |s: &mut Shell, _: &str| {
    s.editor.new_deck();
    s.editor.settle();
    Ok(())
  });
  table.register("open", "open <path>", "Read a deck file", |s: &mut Shell, args: &str| {
    if args.is_empty() {
      return Err(ActionError::Usage("open <path>"));
    }
    s.editor.open(args);
    s.editor.settle();
    s.print_notices();
    s.print_deck();
    Ok(())
  });
  table.register("save", "save <path>", "Write the deck file", |s: &mut Shell, args: &str| {
    if args.is_empty() {
      return Err(ActionError::Usage("save <path>"));
    }
    s.editor.save(args)?;
    Ok(())
  });
  table.register("curve", "curve", "Show the mana curve", |s: &mut Shell, _: &str| {
    s.editor.show_curve()?;
    s.editor.settle();
    s.print_curve();
    Ok(())
  });
  table.register("hand", "hand", "Draw an opening hand", |s: &mut Shell, _: &str| {
    s.editor.draw_hand()?;
    s.print_hand();
    Ok(())
  });
  table.register("mulligan", "mulligan", "Draw a hand one card smaller", |s: &mut Shell, _: &str| {
    s.editor.mulligan()?;
    s.print_hand();
    Ok(())
  });
  table.register("close", "close <curve|hand>", "Close the curve or hand", |s: &mut Shell, args: &str| {
    match args {
      "curve" => s.editor.close_curve(),
      "hand" => s.editor.close_hand(),
      _ => return Err(ActionError::Usage("close <curve|hand>")),
    }
    Ok(())
  });
  table.register("quit", "quit", "Leave the editor", |s: &mut Shell, _: &str| {
    s.running = false;
    Ok(())
  });
  table
}

fn source(config: &Config) -> Result<Source, Box<dyn std::error::Error>> {
  match &config.catalog_path {
    Some(path) => Ok(Box::new(Catalog::load(path)?)),
    None => Ok(Box::new(Gatherer::new(config.gatherer.clone())?)),
  }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  env_logger::init();
  let args: Vec<String> = env::args().collect();
  let config = match args.get(1) {
    Some(path) => Config::load(path)?,
    None => Config::default(),
  };
  let source = source(&config)?;
  let mut shell = Shell {
    editor: Editor::new(source, config),
    running: true,
  };
  let table = actions();
  println!("mtg-deck-editor, type \"help\" for a list of actions");

  let stdin = std::io::stdin();
  let mut lines = stdin.lock().lines();
  while shell.running {
    print!("> ");
    std::io::stdout().flush()?;
    let line = match lines.next() {
      Some(line) => line?,
      None => break,
    };
    if line.trim() == "help" {
      print!("{}", table.help());
      println!("  {:width$}  {}", "help", "Show this list", width = table.usage_width());
      continue;
    }
    if let Err(e) = table.dispatch(&mut shell, &line) {
      println!("! {}", e);
    }
    shell.editor.poll();
    shell.print_notices();
  }

  match shell.editor.save_cache() {
    Ok(Some(count)) => info!("Saved {} cards to the card cache", count),
    Ok(None) => {}
    Err(e) => error!("Cannot save the card cache: {}", e),
  }
  Ok(())
}
