//! Presentation layer: animated reconciliation of the drawer stack.
//!
//! The presentation layer follows a unidirectional data flow pattern:
//!
//! ```text
//! Stack change / host input → Coordinator → ExitStrategy → render state → DrawerView list
//! ```
//!
//! # Modules
//!
//! - [`coordinator`]: [`Coordinator`], the subscription and public operations
//! - [`strategy`]: [`ExitStrategy`] with the [`ImmediateExit`] and [`AnimatedExit`] variants
//! - [`state`]: [`PresentationState`], render stack and animation marks
//! - [`input`]: Host events and the animation naming convention
//! - [`view`]: [`DrawerView`] view models and attribute filtering

pub mod coordinator;
pub mod input;
pub mod state;
pub mod strategy;
pub mod view;

pub use coordinator::{Coordinator, RenderHook};
pub use input::{AnimationEnd, ElementId, InputEvent, ENTER_ANIMATION_PREFIX, EXIT_ANIMATION_PREFIX};
pub use state::PresentationState;
pub use strategy::{AnimatedExit, ExitMode, ExitStrategy, ImmediateExit};
pub use view::{filter_attributes, DrawerHandle, DrawerView, RESERVED_ATTRIBUTE_PREFIX};
