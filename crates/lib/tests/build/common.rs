//! Shared helpers for build integration tests.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use mkrs_lib::{Build, BuildOptions, ColorMode, Sink};

/// A cloneable writer backed by a shared buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
  pub fn contents(&self) -> String {
    String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
  }
}

impl Write for SharedBuffer {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.0.lock().unwrap().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

/// A build whose output is captured, uncolored.
pub struct TestBuild {
  pub build: Build,
  pub out: SharedBuffer,
  pub err: SharedBuffer,
}

impl TestBuild {
  pub fn new() -> Self {
    Self::with_options(BuildOptions::new())
  }

  pub fn with_options(options: BuildOptions) -> Self {
    let out = SharedBuffer::default();
    let err = SharedBuffer::default();
    let build = Build::new(
      options
        .stdout(Sink::writer(out.clone()))
        .stderr(Sink::writer(err.clone()))
        .color(ColorMode::Never),
    );
    Self { build, out, err }
  }

  pub fn stdout(&self) -> String {
    self.out.contents()
  }

  pub fn stderr(&self) -> String {
    self.err.contents()
  }
}

/// A command line that succeeds without output.
#[cfg(unix)]
pub fn succeed() -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), "exit 0".to_string()])
}

#[cfg(windows)]
pub fn succeed() -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), "exit 0".to_string()])
}

/// A command line that exits with status 1.
#[cfg(unix)]
pub fn fail() -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), "exit 1".to_string()])
}

#[cfg(windows)]
pub fn fail() -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), "exit 1".to_string()])
}

/// An executable name that is not on any search path.
pub const MISSING_TOOL: &str = "mkrs-missing-toolchain-9d2e";
