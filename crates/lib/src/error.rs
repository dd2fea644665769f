//! Error types for registration, dispatch and process execution.
//!
//! Nothing in the library panics on an expected failure. Every failure becomes a
//! [`BuildError`] in the build's accumulator, and the dispatcher turns a
//! non-empty accumulator into a single [`BuildFailure`].

use std::fmt;
use std::io;
use std::process::ExitCode;

use thiserror::Error;

use crate::consts::FAILURE_EXIT_CODE;

/// A single failure recorded while registering or running targets.
#[derive(Debug, Error)]
pub enum BuildError {
  /// A command with the same name was registered earlier.
  #[error("can't register command `{name}`: a command with this name already exists")]
  DuplicateCommand { name: String },

  /// A command was registered without a body.
  #[error("can't register command `{name}`: command body is missing")]
  MissingBody { name: String },

  /// A requested target is not registered.
  #[error("can't find such command as: `{name}`")]
  UnknownTarget { name: String },

  /// The process could not be started (for example, executable not found).
  #[error("failed to start `{command}`: {source}")]
  Spawn {
    command: String,
    #[source]
    source: io::Error,
  },

  /// Waiting on a started process failed.
  #[error("failed to wait for `{command}`: {source}")]
  Wait {
    command: String,
    #[source]
    source: io::Error,
  },

  /// The process ran but did not exit successfully.
  #[error("command failed with exit code {}: {}", display_code(.code), .command)]
  CommandFailed { command: String, code: Option<i32> },

  /// A failure reported by a target body.
  #[error("{0}")]
  Message(String),
}

impl From<String> for BuildError {
  fn from(message: String) -> Self {
    BuildError::Message(message)
  }
}

impl From<&str> for BuildError {
  fn from(message: &str) -> Self {
    BuildError::Message(message.to_string())
  }
}

/// `None` means the child was killed by a signal.
fn display_code(code: &Option<i32>) -> String {
  match code {
    Some(code) => code.to_string(),
    None => "none (terminated by signal)".to_string(),
  }
}

/// An accumulated error together with the breadcrumb that was active when it
/// was recorded.
#[derive(Debug)]
pub struct RecordedError {
  pub breadcrumb: String,
  pub error: BuildError,
}

impl fmt::Display for RecordedError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.breadcrumb.is_empty() {
      write!(f, "{}", self.error)
    } else {
      write!(f, "{} {}", self.breadcrumb, self.error)
    }
  }
}

/// Terminal outcome of a failed dispatch.
///
/// Produced once the errors have been printed; the caller decides how to end
/// the process, usually via [`BuildFailure::exit_code`].
#[derive(Debug, Error)]
#[error("{}", failure_summary(.breadcrumb, .errors.len()))]
pub struct BuildFailure {
  pub errors: Vec<RecordedError>,
  pub breadcrumb: String,
}

impl BuildFailure {
  pub fn exit_code(&self) -> ExitCode {
    ExitCode::from(FAILURE_EXIT_CODE)
  }
}

fn failure_summary(breadcrumb: &str, count: usize) -> String {
  if breadcrumb.is_empty() {
    format!("Build failed: {} error(s)", count)
  } else {
    format!("{} Build failed: {} error(s)", breadcrumb, count)
  }
}
