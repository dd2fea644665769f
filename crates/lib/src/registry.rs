//! Command registry.
//!
//! Maps target names to their bodies and remembers registration order for the
//! help listing. Registration problems are recorded on the build rather than
//! returned, so a build script can register everything up front and have the
//! dispatcher report all mistakes at once.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::build::Build;
use crate::error::BuildError;

/// A target body. It receives the build it runs under.
pub type Action = Rc<dyn Fn(&mut Build)>;

/// Wraps a closure as an [`Action`].
pub fn action(body: impl Fn(&mut Build) + 'static) -> Action {
  Rc::new(body)
}

/// A named target for [`Build::register`].
#[derive(Clone)]
pub struct Command {
  pub name: String,
  pub body: Option<Action>,
}

impl Command {
  pub fn new(name: impl Into<String>, body: impl Fn(&mut Build) + 'static) -> Self {
    Self {
      name: name.into(),
      body: Some(action(body)),
    }
  }

  pub fn from_action(name: impl Into<String>, body: Action) -> Self {
    Self {
      name: name.into(),
      body: Some(body),
    }
  }
}

impl fmt::Debug for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Command")
      .field("name", &self.name)
      .field("body", &self.body.as_ref().map(|_| ".."))
      .finish()
  }
}

#[derive(Default)]
pub(crate) struct Registry {
  order: Vec<String>,
  commands: HashMap<String, Action>,
}

impl Registry {
  pub(crate) fn insert(&mut self, name: String, body: Option<Action>) -> Result<(), BuildError> {
    if self.commands.contains_key(&name) {
      return Err(BuildError::DuplicateCommand { name });
    }
    let Some(body) = body else {
      return Err(BuildError::MissingBody { name });
    };
    self.order.push(name.clone());
    self.commands.insert(name, body);
    Ok(())
  }

  pub(crate) fn get(&self, name: &str) -> Option<Action> {
    self.commands.get(name).cloned()
  }

  pub(crate) fn contains(&self, name: &str) -> bool {
    self.commands.contains_key(name)
  }

  pub(crate) fn names(&self) -> &[String] {
    &self.order
  }
}

impl Build {
  /// Registers `body` under `name`.
  ///
  /// A duplicate name or a missing body is recorded as an error; the first
  /// registration of a name always wins.
  pub fn register_command(&mut self, name: impl Into<String>, body: Option<Action>) {
    let name = name.into();
    match self.registry.insert(name.clone(), body) {
      Ok(()) => debug!(name = %name, "registered command"),
      Err(err) => self.add_error(err),
    }
  }

  /// Registers a closure under `name`.
  pub fn cmd(&mut self, name: impl Into<String>, body: impl Fn(&mut Build) + 'static) {
    self.register_command(name, Some(action(body)));
  }

  /// Registers each command in order.
  pub fn register(&mut self, commands: impl IntoIterator<Item = Command>) {
    for command in commands {
      self.register_command(command.name, command.body);
    }
  }

  /// Registered target names in registration order.
  pub fn target_names(&self) -> &[String] {
    self.registry.names()
  }

  pub fn has_command(&self, name: &str) -> bool {
    self.registry.contains(name)
  }
}
