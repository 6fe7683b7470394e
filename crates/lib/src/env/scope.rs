//! Scoped environment changes.

use std::ops::{Deref, DerefMut};

use tracing::debug;

use super::{EnvironmentSnapshot, ProcessEnvironment};

/// Mutable access to a [`ProcessEnvironment`] that is rolled back on drop.
///
/// The snapshot is taken when the scope is created. Dropping the scope, by
/// normal return, `?` or unwinding, restores it.
pub struct EnvironmentScope<'a> {
  env: &'a mut ProcessEnvironment,
  snapshot: Option<EnvironmentSnapshot>,
}

impl<'a> EnvironmentScope<'a> {
  pub(super) fn new(env: &'a mut ProcessEnvironment) -> Self {
    let snapshot = env.snapshot();
    debug!(
      search_path = snapshot.search_path.len(),
      modules = snapshot.modules.len(),
      "process environment snapshot taken"
    );
    Self {
      env,
      snapshot: Some(snapshot),
    }
  }

  /// The state that will be restored.
  pub fn snapshot(&self) -> Option<&EnvironmentSnapshot> {
    self.snapshot.as_ref()
  }
}

impl Deref for EnvironmentScope<'_> {
  type Target = ProcessEnvironment;

  fn deref(&self) -> &ProcessEnvironment {
    self.env
  }
}

impl DerefMut for EnvironmentScope<'_> {
  fn deref_mut(&mut self) -> &mut ProcessEnvironment {
    self.env
  }
}

impl Drop for EnvironmentScope<'_> {
  fn drop(&mut self) {
    if let Some(snapshot) = self.snapshot.take() {
      self.env.restore(snapshot);
      debug!("process environment restored");
    }
  }
}
