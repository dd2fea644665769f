//! Targets of the workspace build script.

mod cargo;
mod demo;

use mkrs_lib::consts::CARGO;
use mkrs_lib::{Build, Command};

/// Every target, in the order `mk` lists them.
pub fn commands() -> Vec<Command> {
  vec![
    Command::from_action("build", Build::run_cmd(CARGO, ["build", "--workspace"])),
    Command::new("verify", cargo::verify),
    Command::new("test", cargo::test),
    Command::new("clean", cargo::clean),
    Command::new("loc", cargo::loc),
    Command::new("hello", demo::hello),
    Command::new("fail", demo::fail),
    Command::new("failFromRun", demo::fail_from_run),
  ]
}
