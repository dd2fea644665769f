//! Targets that show how status output and failures look.

use mkrs_lib::Build;

pub fn hello(b: &mut Build) {
  b.info("hello sailor!!!");
  additional_step(b);
  b.warn("hello bananas!!!");
}

fn additional_step(b: &mut Build) {
  let _step = b.enter_step("additionalStep");
  b.info("hey brother!!!");
}

pub fn fail(b: &mut Build) {
  b.info("going to fail");
  let _step = b.enter_step("targetThatWillFail");
  b.add_error("this thing is supposed to fail");
}

pub fn fail_from_run(b: &mut Build) {
  b.info("going to fail");
  let missing = format!("mk-missing-tool-{}", std::process::id());
  b.run(&missing, Vec::<String>::new());
}
