//! Error types for the drawer stack.
//!
//! Most "failures" in this crate are not errors at all: closing a missing key,
//! raising a drawer that is already on top or updating with an unchanged value
//! are silent no-ops. [`DrawerError`] only covers wiring and configuration
//! problems that indicate a programmer mistake rather than a data condition.

use thiserror::Error;

/// The main error type for drawer stack setup and configuration.
///
/// # Examples
///
/// ```
/// use drawer_stack::DrawerError;
///
/// fn require_manager() -> Result<(), DrawerError> {
///     Err(DrawerError::MissingManager("no manager in scope".to_string()))
/// }
///
/// assert!(require_manager().is_err());
/// ```
#[derive(Debug, Error)]
pub enum DrawerError {
    /// A coordinator or context accessor was used before a manager was provided.
    ///
    /// This is fatal: it means the install step was skipped or the context was
    /// built for a different surface. The string names the missing setup step.
    #[error("Drawer manager is not available: {0}")]
    MissingManager(String),

    /// Install-time configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An initial snapshot could not be decoded.
    #[error("Snapshot seed error: {0}")]
    Seed(String),

    /// Filesystem or I/O operation failed.
    ///
    /// Raised while reading configuration files or preparing the trace file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for drawer stack operations.
pub type Result<T> = std::result::Result<T, DrawerError>;
