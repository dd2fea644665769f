//! The `Build` object: state shared by registration, dispatch and the runner.
//!
//! A `Build` holds `Rc` handles and is therefore neither `Send` nor `Sync`;
//! targets and the processes they start run one at a time on the thread that
//! owns it.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;

use tracing::{debug, warn};

use crate::error::{BuildError, BuildFailure, RecordedError};
use crate::options::{BuildOptions, ColorMode, Sink};
use crate::output::{Tone, paint};
use crate::registry::Registry;
use crate::targets::{StepGuard, TargetStack};

/// Which of the two sinks a status line goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Channel {
  Out,
  Err,
}

pub struct Build {
  pub(crate) verbose: bool,
  pub(crate) env: BTreeMap<String, String>,
  pub(crate) stdout: Sink,
  pub(crate) stderr: Sink,
  pub(crate) shell: Option<String>,
  pub(crate) color: ColorMode,
  pub(crate) errors: Vec<RecordedError>,
  pub(crate) targets: TargetStack,
  pub(crate) registry: Registry,
  pub(crate) once_runs: HashSet<String>,
}

impl Default for Build {
  fn default() -> Self {
    Self::new(BuildOptions::default())
  }
}

impl Build {
  pub fn new(options: BuildOptions) -> Self {
    Self {
      verbose: options.verbose,
      env: options.env,
      stdout: options.stdout,
      stderr: options.stderr,
      shell: options.shell,
      color: options.color,
      errors: Vec::new(),
      targets: TargetStack::new(),
      registry: Registry::default(),
      once_runs: HashSet::new(),
    }
  }

  pub fn is_verbose(&self) -> bool {
    self.verbose
  }

  pub fn set_verbose(&mut self, verbose: bool) {
    self.verbose = verbose;
  }

  /// The environment overlay applied to every spawned process.
  pub fn env(&self) -> &BTreeMap<String, String> {
    &self.env
  }

  /// Appends an error, tagged with the current breadcrumb.
  pub fn add_error(&mut self, err: impl Into<BuildError>) {
    let error = err.into();
    let breadcrumb = self.breadcrumb();
    debug!(breadcrumb = %breadcrumb, error = %error, "recorded error");
    self.errors.push(RecordedError { breadcrumb, error });
  }

  /// Records the error of a failed result and passes a successful value on.
  pub fn record<T, E>(&mut self, result: Result<T, E>) -> Option<T>
  where
    E: Into<BuildError>,
  {
    match result {
      Ok(value) => Some(value),
      Err(err) => {
        self.add_error(err);
        None
      }
    }
  }

  pub fn has_errors(&self) -> bool {
    !self.errors.is_empty()
  }

  pub fn errors(&self) -> &[RecordedError] {
    &self.errors
  }

  pub fn clear_errors(&mut self) {
    if !self.errors.is_empty() {
      debug!(count = self.errors.len(), "clearing errors");
    }
    self.errors.clear();
  }

  /// Prints every accumulated error and the failure banner, then hands the
  /// errors back as a [`BuildFailure`].
  ///
  /// This is the one place failures are reported; ending the process is left
  /// to whoever owns `main`.
  pub fn report_failure(&mut self) -> BuildFailure {
    let breadcrumb = self.breadcrumb();
    let lines: Vec<String> = self.errors.iter().map(ToString::to_string).collect();

    self.write_line(Channel::Err, Tone::Plain, "");
    for line in &lines {
      self.write_line(Channel::Err, Tone::Error, line);
    }
    let banner = if breadcrumb.is_empty() {
      "Build failed".to_string()
    } else {
      format!("{} Build failed", breadcrumb)
    };
    self.write_line(Channel::Err, Tone::Error, &banner);

    BuildFailure {
      errors: std::mem::take(&mut self.errors),
      breadcrumb,
    }
  }

  /// Pushes a nested step and prints the new breadcrumb.
  ///
  /// The step is popped when the returned guard is dropped:
  ///
  /// ```
  /// # use mkrs_lib::Build;
  /// fn generate(b: &mut Build) {
  ///   let _step = b.enter_step("generate");
  ///   b.run("go", ["generate", "./..."]);
  /// }
  /// ```
  pub fn enter_step(&mut self, name: impl Into<String>) -> StepGuard {
    let guard = self.targets.push(name);
    let breadcrumb = self.breadcrumb();
    self.say(Tone::Target, &breadcrumb);
    guard
  }

  /// The active targets rendered as `[outer | inner]`.
  pub fn breadcrumb(&self) -> String {
    self.targets.breadcrumb()
  }

  pub fn targets(&self) -> &TargetStack {
    &self.targets
  }

  /// Runs `body` the first time `name` is seen by this build; later calls
  /// with the same name do nothing.
  pub fn once(&mut self, name: &str, body: impl FnOnce(&mut Build)) {
    if !self.once_runs.insert(name.to_string()) {
      debug!(name = %name, "skipping, already ran once");
      return;
    }
    body(self);
  }

  /// Prints `[info] message`, only in verbose mode.
  pub fn info(&mut self, message: &str) {
    if !self.verbose {
      return;
    }
    self.say(Tone::Info, &format!("[info] {}", message));
  }

  /// Prints `[warn] message`.
  pub fn warn(&mut self, message: &str) {
    self.say(Tone::Warning, &format!("[warn] {}", message));
  }

  pub(crate) fn say(&mut self, tone: Tone, text: &str) {
    self.write_line(Channel::Out, tone, text);
  }

  /// Status output is best effort: a closed terminal must not fail the build.
  pub(crate) fn write_line(&mut self, channel: Channel, tone: Tone, text: &str) {
    let color = self.color;
    let sink = match channel {
      Channel::Out => &mut self.stdout,
      Channel::Err => &mut self.stderr,
    };
    let line = paint(text, tone, color, sink.stream());
    if let Err(err) = writeln!(sink, "{}", line) {
      warn!(error = %err, channel = ?channel, "failed to write status line");
    }
  }
}
