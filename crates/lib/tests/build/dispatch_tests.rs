//! Tests for registration and dispatch.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mkrs_lib::{BuildError, Command};

use super::common::{TestBuild, fail, succeed};

/// Registers a target that appends its name to `log` when it runs.
fn logging_target(t: &mut TestBuild, name: &str, log: &Rc<RefCell<Vec<String>>>) {
  let log = log.clone();
  let label = name.to_string();
  t.build.cmd(name, move |_| log.borrow_mut().push(label.clone()));
}

mod registration {
  use super::*;

  #[test]
  fn duplicate_name_keeps_first_body() {
    let mut t = TestBuild::new();
    let which = Rc::new(Cell::new(""));

    let first = which.clone();
    t.build.cmd("build", move |_| first.set("first"));
    let second = which.clone();
    t.build.cmd("build", move |_| second.set("second"));

    assert!(matches!(
      &t.build.errors()[0].error,
      BuildError::DuplicateCommand { name } if name == "build"
    ));

    // The recorded registration error fails the dispatch before any target runs.
    assert!(t.build.build(["build"]).is_err());
    assert_eq!(which.get(), "");

    // Reporting drains the accumulator, so a second dispatch runs the first body.
    t.build.build(["build"]).unwrap();
    assert_eq!(which.get(), "first");
  }

  #[test]
  fn missing_body_is_not_runnable() {
    let mut t = TestBuild::new();
    t.build.register([Command {
      name: "lint".to_string(),
      body: None,
    }]);

    assert!(!t.build.has_command("lint"));
    assert!(t.build.target_names().is_empty());

    let failure = t.build.build(["lint"]).unwrap_err();
    assert!(matches!(failure.errors[0].error, BuildError::MissingBody { .. }));
  }

  #[test]
  fn registration_errors_reported_before_help() {
    let mut t = TestBuild::new();
    t.build.cmd("build", |_| {});
    t.build.cmd("build", |_| {});

    let failure = t.build.build(Vec::<String>::new()).unwrap_err();

    assert_eq!(failure.errors.len(), 1);
    assert!(!t.stdout().contains("Available targets:"));
    assert!(t.stderr().contains("can't register command `build`"));
    assert!(t.stderr().contains("Build failed"));
  }
}

mod help {
  use super::*;

  #[test]
  fn no_arguments_lists_targets_in_registration_order() {
    let mut t = TestBuild::new();
    for name in ["verify", "build", "test"] {
      t.build.cmd(name, |_| {});
    }

    t.build.build(Vec::<String>::new()).unwrap();

    assert_eq!(
      t.stdout(),
      "Available targets:\n    - verify\n    - build\n    - test\n"
    );
    assert!(t.stderr().is_empty());
  }

  #[test]
  fn help_flag_lists_targets_and_runs_nothing() {
    let mut t = TestBuild::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    logging_target(&mut t, "build", &log);

    t.build.build(["-h", "build"]).unwrap();

    assert!(t.stdout().starts_with("Available targets:\n"));
    assert!(log.borrow().is_empty());
  }
}

mod validation {
  use super::*;

  #[test]
  fn unknown_target_runs_nothing() {
    let mut t = TestBuild::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    logging_target(&mut t, "build", &log);
    logging_target(&mut t, "test", &log);

    let failure = t.build.build(["build", "deploy", "test"]).unwrap_err();

    assert!(log.borrow().is_empty());
    assert_eq!(failure.errors.len(), 1);
    assert!(matches!(
      &failure.errors[0].error,
      BuildError::UnknownTarget { name } if name == "deploy"
    ));
    assert!(t.stdout().contains("Available targets:"));
    assert!(t.stderr().contains("can't find such command as: `deploy`"));
  }

  #[test]
  fn verbose_flag_after_target_is_an_unknown_target() {
    let mut t = TestBuild::new();
    t.build.cmd("build", |_| {});

    let failure = t.build.build(["build", "-v"]).unwrap_err();

    assert!(matches!(
      &failure.errors[0].error,
      BuildError::UnknownTarget { name } if name == "-v"
    ));
  }
}

mod execution {
  use super::*;

  #[test]
  fn targets_run_in_requested_order() {
    let mut t = TestBuild::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    for name in ["a", "b", "c"] {
      logging_target(&mut t, name, &log);
    }

    t.build.build(["c", "a", "b", "a"]).unwrap();

    assert_eq!(*log.borrow(), ["c", "a", "b", "a"]);
    assert!(t.stdout().ends_with(")\n"));
    assert!(t.stdout().contains("Successful build ("));
  }

  #[test]
  fn each_target_prints_its_breadcrumb() {
    let mut t = TestBuild::new();
    t.build.cmd("build", |_| {});
    t.build.cmd("test", |_| {});

    t.build.build(["build", "test"]).unwrap();

    let stdout = t.stdout();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "[build]");
    assert_eq!(lines[1], "[test]");
  }

  #[test]
  fn failing_target_halts_the_rest() {
    let mut t = TestBuild::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    t.build.cmd("broken", |b| {
      let (program, args) = fail();
      b.run(program, &args);
    });
    logging_target(&mut t, "after", &log);

    let failure = t.build.build(["broken", "after"]).unwrap_err();

    assert!(log.borrow().is_empty());
    assert_eq!(failure.breadcrumb, "[broken]");
    assert_eq!(failure.errors.len(), 1);
    assert!(matches!(
      failure.errors[0].error,
      BuildError::CommandFailed { code: Some(1), .. }
    ));
    assert!(!t.stdout().contains("Successful build"));
  }

  #[test]
  fn failing_run_prints_exactly_that_failure() {
    let mut t = TestBuild::new();
    t.build.cmd("broken", |b| {
      let (program, args) = fail();
      b.run(program, &args);
    });

    t.build.build(["broken"]).unwrap_err();

    let stderr = t.stderr();
    let error_lines: Vec<&str> = stderr.lines().filter(|l| l.contains("command failed")).collect();
    assert_eq!(error_lines.len(), 1);
    assert!(error_lines[0].starts_with("[broken] command failed with exit code 1"));
    assert!(stderr.trim_end().ends_with("[broken] Build failed"));
  }

  #[test]
  fn force_run_lets_the_next_target_run() {
    let mut t = TestBuild::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    t.build.cmd("tolerant", |b| {
      let (bad, bad_args) = fail();
      let (good, good_args) = succeed();
      b.run(bad, &bad_args);
      b.force_run(good, &good_args);
    });
    logging_target(&mut t, "next", &log);

    t.build.build(["tolerant", "next"]).unwrap();

    assert_eq!(*log.borrow(), ["next"]);
    assert!(!t.build.has_errors());
  }

  #[test]
  fn body_error_without_process_fails_the_target() {
    let mut t = TestBuild::new();
    t.build.cmd("fail", |b| {
      let _step = b.enter_step("targetThatWillFail");
      b.add_error("this thing is supposed to fail");
    });

    let failure = t.build.build(["fail"]).unwrap_err();

    assert_eq!(failure.breadcrumb, "[fail]");
    assert_eq!(failure.errors[0].breadcrumb, "[fail | targetThatWillFail]");
    assert!(
      t.stderr()
        .contains("[fail | targetThatWillFail] this thing is supposed to fail")
    );
  }

  #[test]
  fn verbose_only_flag_succeeds_without_targets() {
    let mut t = TestBuild::new();
    t.build.cmd("build", |_| {});

    t.build.build(["-v"]).unwrap();

    assert!(t.build.is_verbose());
    assert!(t.stdout().contains("Successful build"));
  }
}

mod verbosity {
  use super::*;

  fn echoing_build() -> TestBuild {
    let mut t = TestBuild::new();
    t.build.cmd("quiet", |b| {
      let (program, args) = succeed();
      b.run(program, &args);
      b.info("details");
    });
    t
  }

  #[test]
  fn verbose_flag_echoes_commands_and_info() {
    let mut t = echoing_build();

    t.build.build(["-v", "quiet"]).unwrap();

    let (program, args) = succeed();
    let expected = format!("[cmd] [quiet] {} {}", program, args.join(" "));
    let stdout = t.stdout();
    assert!(stdout.lines().any(|l| l == expected), "missing {expected:?} in {stdout:?}");
    assert!(stdout.contains("[info] details"));
  }

  #[test]
  fn default_dispatch_does_not_echo() {
    let mut t = echoing_build();

    t.build.build(["quiet"]).unwrap();

    let stdout = t.stdout();
    assert!(!stdout.contains("[cmd]"));
    assert!(!stdout.contains("[info]"));
  }
}
