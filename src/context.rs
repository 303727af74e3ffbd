//! Explicit context passing for the drawer manager.
//!
//! Instead of a process-wide injection key, the host builds one
//! [`DrawerContext`] per UI scope and hands it to whatever needs the manager.
//! Asking a context that was never given a manager is a wiring bug and fails
//! immediately with [`DrawerError::MissingManager`].

use crate::domain::{DrawerError, Result};
use crate::presentation::{Coordinator, ExitMode};
use crate::stack::StackManager;

/// Scope object carrying the manager and the install-time surface options.
pub struct DrawerContext<T = ()> {
    manager: Option<StackManager<T>>,
    teleport_target: String,
    exit_mode: ExitMode,
}

impl<T: Clone + 'static> DrawerContext<T> {
    /// A context with no manager yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            manager: None,
            teleport_target: crate::DEFAULT_TELEPORT_TARGET.to_string(),
            exit_mode: ExitMode::default(),
        }
    }

    #[must_use]
    pub fn with_manager(manager: StackManager<T>) -> Self {
        let mut context = Self::new();
        context.provide(manager);
        context
    }

    /// Makes `manager` available to everything using this context.
    pub fn provide(&mut self, manager: StackManager<T>) {
        self.manager = Some(manager);
    }

    #[must_use]
    pub fn teleport_target(mut self, target: impl Into<String>) -> Self {
        self.teleport_target = target.into();
        self
    }

    #[must_use]
    pub const fn exit_mode(mut self, mode: ExitMode) -> Self {
        self.exit_mode = mode;
        self
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.teleport_target
    }

    #[must_use]
    pub const fn mode(&self) -> ExitMode {
        self.exit_mode
    }

    #[must_use]
    pub const fn has_manager(&self) -> bool {
        self.manager.is_some()
    }

    /// The provided manager.
    ///
    /// # Errors
    ///
    /// Returns [`DrawerError::MissingManager`] if nothing was provided.
    pub fn manager(&self) -> Result<StackManager<T>> {
        self.manager.clone().ok_or_else(|| {
            DrawerError::MissingManager(
                "no StackManager in this context; call drawer_stack::install or DrawerContext::provide first"
                    .to_string(),
            )
        })
    }

    /// Binds a coordinator for this context's surface using its exit mode.
    ///
    /// # Errors
    ///
    /// Returns [`DrawerError::MissingManager`] if nothing was provided.
    pub fn coordinator(&self) -> Result<Coordinator<T>> {
        Coordinator::from_context(self, self.exit_mode)
    }
}

impl<T: Clone + 'static> Default for DrawerContext<T> {
    fn default() -> Self {
        Self::new()
    }
}
