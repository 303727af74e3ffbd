//! Stack layer: the authoritative drawer stack and its change notifications.
//!
//! # Modules
//!
//! - [`manager`]: [`StackManager`], the mutating operations and listener fan-out
//! - [`snapshot`]: [`StackSnapshot`], immutable stack values compared by identity
//! - [`subscription`]: [`Subscription`] handles returned by `subscribe`

pub mod manager;
pub mod snapshot;
pub mod subscription;

pub use manager::StackManager;
pub use snapshot::StackSnapshot;
pub use subscription::{Listener, Subscription};
