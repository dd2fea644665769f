//! Process runner.
//!
//! Spawns external commands with the build's environment overlay, connects
//! their output to the build's sinks and records failures in the accumulator.
//! Nothing here aborts: the caller (usually the dispatcher, after the target
//! body returns) decides what a failure means.

use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::rc::Rc;
use std::thread;

use tracing::{debug, warn};

use crate::build::Build;
use crate::error::BuildError;
use crate::options::Sink;
use crate::output::Tone;
use crate::registry::Action;

impl Build {
  /// Runs `command` with `args` and waits for it.
  ///
  /// Returns whether it succeeded. A failure is also recorded as an error.
  pub fn run<I, S>(&mut self, command: &str, args: I) -> bool
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let args = collect_args(args);
    let line = command_line(command, &args);

    if self.verbose {
      let breadcrumb = self.breadcrumb();
      let echo = if breadcrumb.is_empty() {
        format!("[cmd] {}", line)
      } else {
        format!("[cmd] {} {}", breadcrumb, line)
      };
      self.say(Tone::Command, &echo);
    }

    match execute(command, &args, &self.env, &mut self.stdout, &mut self.stderr) {
      Ok(()) => true,
      Err(err) => {
        self.add_error(err);
        false
      }
    }
  }

  /// Like [`Build::run`], but clears every accumulated error afterwards.
  pub fn force_run<I, S>(&mut self, command: &str, args: I) -> bool
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let ok = self.run(command, args);
    self.clear_errors();
    ok
  }

  /// Joins `command` and `args` with spaces and runs the result through the
  /// shell, so pipes and globs work. Quoting is up to the caller.
  pub fn shell_run<I, S>(&mut self, command: &str, args: I) -> bool
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let script = command_line(command, &collect_args(args));
    let (shell, mut shell_args) = get_shell(self.shell.as_deref());
    shell_args.push(script);
    self.run(&shell, &shell_args)
  }

  /// Like [`Build::shell_run`], but clears every accumulated error afterwards.
  pub fn force_shell_run<I, S>(&mut self, command: &str, args: I) -> bool
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let ok = self.shell_run(command, args);
    self.clear_errors();
    ok
  }

  /// An action that calls [`Build::run`] with the given command line.
  pub fn run_cmd<I, S>(command: &str, args: I) -> Action
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let command = command.to_string();
    let args = collect_args(args);
    Rc::new(move |b: &mut Build| {
      b.run(&command, &args);
    })
  }

  /// An action that calls [`Build::force_run`] with the given command line.
  pub fn force_run_cmd<I, S>(command: &str, args: I) -> Action
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let command = command.to_string();
    let args = collect_args(args);
    Rc::new(move |b: &mut Build| {
      b.force_run(&command, &args);
    })
  }

  /// An action that calls [`Build::shell_run`] with the given command line.
  pub fn shell_run_cmd<I, S>(command: &str, args: I) -> Action
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let command = command.to_string();
    let args = collect_args(args);
    Rc::new(move |b: &mut Build| {
      b.shell_run(&command, &args);
    })
  }

  /// An action that calls [`Build::force_shell_run`] with the given command line.
  pub fn force_shell_run_cmd<I, S>(command: &str, args: I) -> Action
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let command = command.to_string();
    let args = collect_args(args);
    Rc::new(move |b: &mut Build| {
      b.force_shell_run(&command, &args);
    })
  }
}

/// Spawns the process and blocks until it exits.
///
/// The child inherits the parent's environment and stdin. Overlay variables
/// replace inherited ones of the same name. Child stdout goes to `stdout` and
/// child stderr to `stderr`.
fn execute(
  program: &str,
  args: &[String],
  env: &BTreeMap<String, String>,
  stdout: &mut Sink,
  stderr: &mut Sink,
) -> Result<(), BuildError> {
  let line = command_line(program, args);

  // Keep our own status lines ahead of the child's output.
  let _ = stdout.flush();
  let _ = stderr.flush();

  let mut command = Command::new(program);
  command
    .args(args)
    .envs(env)
    .stdin(Stdio::inherit())
    .stdout(stdout.child_stdio())
    .stderr(stderr.child_stdio());

  debug!(program = %program, args = ?args, overlay = env.len(), "spawning process");

  let mut child = command.spawn().map_err(|source| BuildError::Spawn {
    command: line.clone(),
    source,
  })?;

  let child_stdout = child.stdout.take();
  let child_stderr = child.stderr.take();

  // Both pipes are drained at the same time so a chatty child can't fill one
  // while we block on the other.
  let status = thread::scope(|scope| {
    let stderr_pump = child_stderr.map(|pipe| scope.spawn(move || forward(pipe, stderr)));
    if let Some(pipe) = child_stdout {
      forward(pipe, stdout);
    }
    if let Some(handle) = stderr_pump
      && handle.join().is_err()
    {
      warn!("stderr forwarding thread panicked");
    }
    child.wait()
  })
  .map_err(|source| BuildError::Wait {
    command: line.clone(),
    source,
  })?;

  debug!(program = %program, status = %status, "process exited");

  if status.success() {
    Ok(())
  } else {
    Err(BuildError::CommandFailed {
      command: line,
      code: status.code(),
    })
  }
}

/// Copies a child pipe into a sink until EOF.
///
/// If the sink stops accepting writes the rest of the pipe is discarded, so
/// the child never blocks on a full pipe.
fn forward(mut pipe: impl Read, sink: &mut Sink) {
  if let Err(err) = io::copy(&mut pipe, sink) {
    warn!(error = %err, "failed to forward process output");
    let _ = io::copy(&mut pipe, &mut io::sink());
  }
  let _ = sink.flush();
}

fn collect_args<I, S>(args: I) -> Vec<String>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  args.into_iter().map(|a| a.as_ref().to_string()).collect()
}

pub(crate) fn command_line(program: &str, args: &[String]) -> String {
  if args.is_empty() {
    return program.to_string();
  }
  format!("{} {}", program, args.join(" "))
}

/// Get the shell command and argument for the current platform.
///
/// An explicit shell gets the flag its family expects; otherwise `/bin/sh -c`
/// on Unix and PowerShell on Windows. `$SHELL` is deliberately not consulted.
fn get_shell(override_shell: Option<&str>) -> (String, Vec<String>) {
  if let Some(shell) = override_shell {
    let args = if shell.contains("powershell") || shell.contains("pwsh") {
      vec!["-NoProfile".to_string(), "-Command".to_string()]
    } else if shell.contains("cmd") {
      vec!["/C".to_string()]
    } else {
      vec!["-c".to_string()]
    };
    return (shell.to_string(), args);
  }

  #[cfg(unix)]
  {
    ("/bin/sh".to_string(), vec!["-c".to_string()])
  }

  #[cfg(windows)]
  {
    (
      "powershell.exe".to_string(),
      vec![
        "-NoProfile".to_string(),
        "-ExecutionPolicy".to_string(),
        "Bypass".to_string(),
        "-Command".to_string(),
      ],
    )
  }
}
