//! Dispatcher: turns command-line arguments into target runs.
//!
//! Dispatch goes through three phases:
//! 1. flags: [`Request::parse`] decides between help and a run, and whether
//!    the run is verbose;
//! 2. validation: every requested name must be registered before anything runs;
//! 3. execution: targets run in order, and the first one that leaves errors in
//!    the accumulator ends the dispatch.

use std::ffi::OsString;
use std::process::ExitCode;
use std::time::Instant;

use tracing::{debug, info};

use crate::build::Build;
use crate::consts::{HELP_FLAGS, VERBOSE_FLAGS};
use crate::error::{BuildError, BuildFailure};
use crate::output::{Tone, format_duration, paint};

/// What the arguments ask the dispatcher to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
  /// Print the available targets.
  Help,
  /// Run `targets` in order.
  Run { verbose: bool, targets: Vec<String> },
}

impl Request {
  /// Flags are only recognized in the first position.
  pub fn parse<I, S>(args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut args: Vec<String> = args.into_iter().map(Into::into).collect();

    let Some(first) = args.first() else {
      return Request::Help;
    };
    if HELP_FLAGS.contains(&first.as_str()) {
      return Request::Help;
    }

    let verbose = VERBOSE_FLAGS.contains(&first.as_str());
    if verbose {
      args.remove(0);
    }

    Request::Run {
      verbose,
      targets: args,
    }
  }
}

impl Build {
  /// Runs the targets named by `args`.
  ///
  /// Errors recorded during registration, an unknown target name, or errors
  /// left behind by a target are printed and returned as a [`BuildFailure`].
  pub fn build<I, S>(&mut self, args: I) -> Result<(), BuildFailure>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    if self.has_errors() {
      return Err(self.report_failure());
    }

    let (verbose, targets) = match Request::parse(args) {
      Request::Help => {
        self.print_available_targets();
        return Ok(());
      }
      Request::Run { verbose, targets } => (verbose, targets),
    };

    if verbose {
      self.verbose = true;
    }

    self.validate(&targets)?;

    let started = Instant::now();
    for name in &targets {
      self.run_target(name)?;
    }

    let elapsed = format_duration(started.elapsed());
    info!(targets = targets.len(), elapsed = %elapsed, "build succeeded");
    self.say(Tone::Plain, "");
    self.say(Tone::Success, &format!("Successful build ({})", elapsed));
    Ok(())
  }

  /// Dispatches the process arguments and converts the outcome to an exit
  /// status: success, or 255 after the failure has been printed.
  ///
  /// Arguments that are not valid Unicode are converted lossily, so they
  /// fail validation as unknown targets.
  pub fn build_from_os_args(&mut self) -> ExitCode {
    match self.build(lossy_args(std::env::args_os().skip(1))) {
      Ok(()) => ExitCode::SUCCESS,
      Err(failure) => failure.exit_code(),
    }
  }

  fn validate(&mut self, targets: &[String]) -> Result<(), BuildFailure> {
    let Some(unknown) = targets.iter().find(|name| !self.has_command(name)) else {
      return Ok(());
    };

    self.print_available_targets();
    self.add_error(BuildError::UnknownTarget {
      name: unknown.clone(),
    });
    Err(self.report_failure())
  }

  fn run_target(&mut self, name: &str) -> Result<(), BuildFailure> {
    let Some(body) = self.registry.get(name) else {
      self.add_error(BuildError::UnknownTarget {
        name: name.to_string(),
      });
      return Err(self.report_failure());
    };

    self.targets.clear();
    let _target = self.enter_step(name);

    debug!(name = %name, "running target");
    let started = Instant::now();
    body(self);
    debug!(name = %name, elapsed = ?started.elapsed(), "target finished");

    // Checked while the target is still on the stack so the banner names it.
    if self.has_errors() {
      return Err(self.report_failure());
    }
    Ok(())
  }

  pub fn print_available_targets(&mut self) {
    self.say(Tone::Plain, "Available targets:");
    let names: Vec<String> = self.target_names().to_vec();
    for name in &names {
      let painted = paint(name, Tone::Target, self.color, self.stdout.stream());
      self.say(Tone::Plain, &format!("    - {}", painted));
    }
  }
}

fn lossy_args(args: impl IntoIterator<Item = OsString>) -> Vec<String> {
  args
    .into_iter()
    .map(|arg| arg.to_string_lossy().into_owned())
    .collect()
}
