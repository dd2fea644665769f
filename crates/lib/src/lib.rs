//! mkrs-lib: a small build-script framework.
//!
//! A project describes its build as named targets on a [`Build`]:
//! - targets are registered with [`Build::cmd`] or [`Build::register`]
//! - bodies shell out through [`Build::run`] and friends, which record failures
//!   instead of aborting
//! - [`Build::build`] validates the requested target names, runs them in order
//!   and stops at the first target that leaves errors behind
//!
//! ```no_run
//! use mkrs_lib::{Build, BuildOptions, Command};
//! use mkrs_lib::consts::GO;
//!
//! fn main() -> std::process::ExitCode {
//!   let mut b = Build::new(BuildOptions::from_env());
//!   b.register([
//!     Command::from_action("build", Build::run_cmd(GO, ["build", "./..."])),
//!     Command::new("verify", |b| {
//!       b.run(GO, ["vet", "./..."]);
//!       b.run(GO, ["build", "./..."]);
//!     }),
//!   ]);
//!   b.build_from_os_args()
//! }
//! ```

pub mod build;
pub mod consts;
pub mod dispatch;
pub mod error;
pub mod options;
pub mod output;
pub mod process;
pub mod registry;
pub mod targets;


pub use build::Build;
pub use dispatch::Request;
pub use error::{BuildError, BuildFailure, RecordedError};
pub use options::{BuildOptions, ColorMode, Sink};
pub use registry::{Action, Command, action};
pub use targets::{StepGuard, TargetStack};
