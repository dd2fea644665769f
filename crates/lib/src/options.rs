//! Construction-time configuration for a [`Build`](crate::Build).
//!
//! Options are set once and copied into the build. [`BuildOptions::from_env`]
//! layers the `MKRS_*` environment variables on top of the defaults.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::process::Stdio;
use std::str::FromStr;

use owo_colors::Stream;
use thiserror::Error;
use tracing::warn;

use crate::consts::{COLOR_ENV, SHELL_ENV, VERBOSE_ENV};

/// Where status lines and child process output are written.
pub enum Sink {
  /// The parent's standard output.
  Stdout,
  /// The parent's standard error.
  Stderr,
  /// Any other writer, e.g. an in-memory buffer or a log file.
  Writer(Box<dyn Write + Send>),
}

impl Sink {
  pub fn writer(writer: impl Write + Send + 'static) -> Self {
    Sink::Writer(Box::new(writer))
  }

  /// The terminal stream backing this sink, used for color detection.
  pub(crate) fn stream(&self) -> Option<Stream> {
    match self {
      Sink::Stdout => Some(Stream::Stdout),
      Sink::Stderr => Some(Stream::Stderr),
      Sink::Writer(_) => None,
    }
  }

  /// How a child's output stream should be connected to this sink.
  ///
  /// Inherited streams are handed to the child directly; anything else needs a
  /// pipe that the runner drains.
  pub(crate) fn child_stdio(&self) -> Stdio {
    match self {
      Sink::Stdout => Stdio::from(io::stdout()),
      Sink::Stderr => Stdio::from(io::stderr()),
      Sink::Writer(_) => Stdio::piped(),
    }
  }
}

impl Write for Sink {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    match self {
      Sink::Stdout => io::stdout().write(buf),
      Sink::Stderr => io::stderr().write(buf),
      Sink::Writer(w) => w.write(buf),
    }
  }

  fn flush(&mut self) -> io::Result<()> {
    match self {
      Sink::Stdout => io::stdout().flush(),
      Sink::Stderr => io::stderr().flush(),
      Sink::Writer(w) => w.flush(),
    }
  }
}

impl fmt::Debug for Sink {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Sink::Stdout => f.write_str("Sink::Stdout"),
      Sink::Stderr => f.write_str("Sink::Stderr"),
      Sink::Writer(_) => f.write_str("Sink::Writer(..)"),
    }
  }
}

/// Whether status lines are colorized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorMode {
  /// Colorize when the sink is a terminal that supports it.
  #[default]
  Auto,
  Always,
  Never,
}

#[derive(Debug, Error)]
#[error("invalid color mode `{0}` (expected auto, always or never)")]
pub struct ParseColorModeError(String);

impl FromStr for ColorMode {
  type Err = ParseColorModeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "auto" => Ok(ColorMode::Auto),
      "always" => Ok(ColorMode::Always),
      "never" => Ok(ColorMode::Never),
      _ => Err(ParseColorModeError(s.to_string())),
    }
  }
}

/// Options for [`Build::new`](crate::Build::new).
#[derive(Debug)]
pub struct BuildOptions {
  /// Variables applied on top of the inherited environment of every child.
  pub env: BTreeMap<String, String>,
  pub stdout: Sink,
  pub stderr: Sink,
  /// Shell used by the shell-run variants; `None` selects the platform default.
  pub shell: Option<String>,
  pub color: ColorMode,
  /// Start in verbose mode without needing the `-v` flag.
  pub verbose: bool,
}

impl Default for BuildOptions {
  fn default() -> Self {
    Self {
      env: BTreeMap::new(),
      stdout: Sink::Stdout,
      stderr: Sink::Stderr,
      shell: None,
      color: ColorMode::Auto,
      verbose: false,
    }
  }
}

impl BuildOptions {
  pub fn new() -> Self {
    Self::default()
  }

  /// Defaults overridden by `MKRS_VERBOSE`, `MKRS_COLOR` and `MKRS_SHELL`.
  pub fn from_env() -> Self {
    let mut options = Self::default();

    if let Ok(value) = std::env::var(VERBOSE_ENV) {
      options.verbose = is_truthy(&value);
    }

    if let Ok(value) = std::env::var(COLOR_ENV) {
      options.color = value.parse().unwrap_or_else(|err| {
        warn!(error = %err, "ignoring {}", COLOR_ENV);
        ColorMode::Auto
      });
    }

    if let Ok(value) = std::env::var(SHELL_ENV)
      && !value.trim().is_empty()
    {
      options.shell = Some(value);
    }

    options
  }

  pub fn env<K, V>(mut self, key: K, value: V) -> Self
  where
    K: Into<String>,
    V: Into<String>,
  {
    self.env.insert(key.into(), value.into());
    self
  }

  pub fn envs<I, K, V>(mut self, vars: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    self
      .env
      .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
    self
  }

  pub fn stdout(mut self, sink: Sink) -> Self {
    self.stdout = sink;
    self
  }

  pub fn stderr(mut self, sink: Sink) -> Self {
    self.stderr = sink;
    self
  }

  pub fn shell(mut self, shell: impl Into<String>) -> Self {
    self.shell = Some(shell.into());
    self
  }

  pub fn color(mut self, color: ColorMode) -> Self {
    self.color = color;
    self
  }

  pub fn verbose(mut self, verbose: bool) -> Self {
    self.verbose = verbose;
    self
  }
}

fn is_truthy(value: &str) -> bool {
  matches!(
    value.trim().to_ascii_lowercase().as_str(),
    "1" | "true" | "yes" | "on"
  )
}
