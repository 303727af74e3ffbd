//! Domain layer: drawer records, option bags and errors.
//!
//! Nothing here knows about stacking or animation. The types are shared by the
//! stack manager (which owns records) and the presentation coordinator (which
//! only reads them).
//!
//! # Organization
//!
//! - [`drawer`]: [`DrawerRecord`], [`DrawerOptions`] and the serializable seeds
//! - [`error`]: Error types and result alias
//!
//! # Examples
//!
//! ```
//! use drawer_stack::domain::{DrawerOptions, DrawerRecord, Placement};
//!
//! let record: DrawerRecord = DrawerRecord::with_options(
//!     "settings",
//!     DrawerOptions::new().placement(Placement::Left),
//! );
//! assert_eq!(record.placement(), Placement::Left);
//! assert!(record.closes_on_escape_key());
//! ```

pub mod drawer;
pub mod error;

pub use drawer::{
    AttrValue, CloseBehavior, ClosePredicate, DrawerOptions, DrawerRecord, DrawerSeed, OptionsSeed,
    Placement,
};
pub use error::{DrawerError, Result};
