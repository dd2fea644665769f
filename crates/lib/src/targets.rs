//! Target stack and breadcrumbs.
//!
//! The stack records which target, and which nested steps inside it, are
//! currently running. Entries are only ever removed by dropping the
//! [`StepGuard`] returned when they were pushed, so the stack stays balanced on
//! early returns too.

use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to the stack of active target and step names.
#[derive(Debug, Clone, Default)]
pub struct TargetStack {
  names: Rc<RefCell<Vec<String>>>,
}

impl TargetStack {
  pub fn new() -> Self {
    Self::default()
  }

  /// Pushes `name` and returns the guard that pops it.
  pub fn push(&self, name: impl Into<String>) -> StepGuard {
    let mut names = self.names.borrow_mut();
    let depth = names.len();
    names.push(name.into());
    StepGuard {
      stack: self.clone(),
      depth,
    }
  }

  /// Renders the stack as `[outer | inner]`; an empty stack renders as `""`.
  pub fn breadcrumb(&self) -> String {
    render_breadcrumb(&self.names.borrow())
  }

  pub fn names(&self) -> Vec<String> {
    self.names.borrow().clone()
  }

  pub fn depth(&self) -> usize {
    self.names.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.borrow().is_empty()
  }

  pub(crate) fn clear(&self) {
    self.truncate(0);
  }

  fn truncate(&self, depth: usize) {
    self.names.borrow_mut().truncate(depth);
  }
}

/// Pops its step from the [`TargetStack`] when dropped.
///
/// Dropping a guard also discards any entries pushed above it whose guards are
/// still alive; their own drops then do nothing.
#[derive(Debug)]
#[must_use = "the step is popped as soon as the guard is dropped"]
pub struct StepGuard {
  stack: TargetStack,
  depth: usize,
}

impl Drop for StepGuard {
  fn drop(&mut self) {
    self.stack.truncate(self.depth);
  }
}

pub(crate) fn render_breadcrumb(names: &[String]) -> String {
  if names.is_empty() {
    return String::new();
  }
  format!("[{}]", names.join(" | "))
}
