//! # Action dispatch
//!
//! An `ActionTable` maps action names to handlers. A front end registers one
//! handler per user action and feeds it command lines, `"<action> <args>"`.
use crate::editor::EditorError;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum ActionError {
  /// No action is registered under the name
  Unknown(String),
  /// The arguments do not fit the action; holds the usage line
  Usage(&'static str),
  /// The action ran and refused
  Rejected(String),
}

impl fmt::Display for ActionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Unknown(name) => write!(f, "unknown action \"{}\", try \"help\"", name),
      Self::Usage(usage) => write!(f, "usage: {}", usage),
      Self::Rejected(reason) => write!(f, "{}", reason),
    }
  }
}

impl Error for ActionError {}

impl From<EditorError> for ActionError {
  fn from(error: EditorError) -> Self {
    Self::Rejected(error.to_string())
  }
}

pub type Handler<C> = Box<dyn Fn(&mut C, &str) -> Result<(), ActionError>>;

pub struct Action<C> {
  pub usage: &'static str,
  pub summary: &'static str,
  handler: Handler<C>,
}

/// ActionTable routes command lines to the handler registered for their first word
pub struct ActionTable<C> {
  actions: BTreeMap<&'static str, Action<C>>,
}

impl<C> Default for ActionTable<C> {
  fn default() -> Self {
    Self {
      actions: BTreeMap::new(),
    }
  }
}

impl<C> ActionTable<C> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers `handler` under `name`, replacing an earlier registration
  pub fn register<F>(&mut self, name: &'static str, usage: &'static str, summary: &'static str, handler: F)
  where
    F: Fn(&mut C, &str) -> Result<(), ActionError> + 'static,
  {
    let action = Action {
      usage,
      summary,
      handler: Box::new(handler),
    };
    if self.actions.insert(name, action).is_some() {
      warn!("Action \"{}\" registered twice", name);
    }
  }

  /// Runs the action named by the first word of `line` with the rest of the
  /// line, trimmed, as its argument. A blank line does nothing.
  pub fn dispatch(&self, context: &mut C, line: &str) -> Result<(), ActionError> {
    let line = line.trim();
    if line.is_empty() {
      return Ok(());
    }
    let (name, args) = match line.find(char::is_whitespace) {
      Some(idx) => (&line[..idx], line[idx..].trim()),
      None => (line, ""),
    };
    match self.actions.get(name) {
      Some(action) => {
        debug!("Dispatching \"{}\" with \"{}\"", name, args);
        (action.handler)(context, args)
      }
      None => Err(ActionError::Unknown(name.to_string())),
    }
  }

  pub fn contains(&self, name: &str) -> bool {
    self.actions.contains_key(name)
  }

  /// Returns the registered actions in name order
  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Action<C>)> + '_ {
    self.actions.iter().map(|(name, action)| (*name, action))
  }

  /// Returns the width of the usage column in `help`
  pub fn usage_width(&self) -> usize {
    self.actions.values().map(|a| a.usage.len()).max().unwrap_or(0)
  }

  /// Returns one line per action, `usage` padded to a column and then `summary`
  pub fn help(&self) -> String {
    let width = self.usage_width();
    let mut s = String::new();
    for action in self.actions.values() {
      s.push_str(&format!("  {:width$}  {}\n", action.usage, action.summary, width = width));
    }
    s
  }
}
