//! Targets that drive cargo.

use mkrs_lib::Build;
use mkrs_lib::consts::CARGO;

/// Format check, lint, then compile. Every step runs even after a failure.
pub fn verify(b: &mut Build) {
  fetch(b);
  {
    let _step = b.enter_step("fmt");
    b.run(CARGO, ["fmt", "--all", "--check"]);
  }
  {
    let _step = b.enter_step("clippy");
    b.run(
      CARGO,
      ["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    );
  }
  b.run(CARGO, ["build", "--workspace"]);
}

pub fn test(b: &mut Build) {
  fetch(b);
  b.run(CARGO, ["test", "--workspace"]);
}

/// Removing build output is best effort.
pub fn clean(b: &mut Build) {
  if !b.force_run(CARGO, ["clean"]) {
    b.warn("cargo clean failed, continuing");
  }
}

/// Line counts per source file.
pub fn loc(b: &mut Build) {
  b.shell_run("find", ["crates", "-name", "'*.rs'", "|", "xargs", "wc", "-l"]);
}

/// Downloads dependencies once, however many targets ask for it.
fn fetch(b: &mut Build) {
  b.once("fetch", |b| {
    let _step = b.enter_step("fetch");
    b.run(CARGO, ["fetch"]);
  });
}
