//! drawer-stack: a stack of overlay drawers with animated enter and exit.
//!
//! The crate manages which overlay panels ("drawers") are open, in what
//! order, and how they animate in and out while exactly one of them is on top:
//! - An authoritative, synchronous stack manager with change notification
//! - A presentation coordinator that keeps closing drawers on screen until
//!   their exit animation finishes
//! - Distinct handling of a bulk `close_all` versus closing one drawer
//! - Explicit context passing instead of a global injection key
//!
//! # Architecture
//!
//! The crate follows a layered architecture pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Host adapter / script runner (main.rs)             │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Context (context.rs)                               │  ← Explicit wiring
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Presentation Layer (presentation/)                 │  ← Animation state machine
//! │  - Reconciliation of stack changes                  │
//! │  - Exit strategies (immediate / animated)           │
//! │  - View models and host input                       │
//! └─────────────────────────────────────────────────────┘
//!                        │ subscribe
//! ┌─────────────────────────────────────────────────────┐
//! │  Stack Layer (stack/)                               │  ← Source of truth
//! │  - Snapshots, listeners, open/close/reorder         │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain Layer (domain/)                             │
//! │  - Drawer records and options, errors               │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`domain`]: Drawer records, option bags, errors
//! - [`stack`]: [`StackManager`] and immutable snapshots
//! - [`presentation`]: [`Coordinator`] and its exit strategies
//! - [`context`]: [`DrawerContext`], the scoped replacement for dependency injection
//! - [`observability`]: tracing subscriber and span export
//!
//! # Configuration
//!
//! Install-time options can come from a TOML file:
//!
//! ```toml
//! teleport_target = "#overlays"
//! headless = false
//! trace_level = "debug"
//!
//! [default_options]
//! placement = "left"
//! close_on_escape_key = true
//! ```
//!
//! # Examples
//!
//! ```rust
//! use drawer_stack::{install, Config, DrawerRecord};
//!
//! let context = install::<()>(&Config::default());
//! let manager = context.manager()?;
//! let coordinator = context.coordinator()?;
//!
//! manager.open(DrawerRecord::new("settings"));
//! manager.open(DrawerRecord::new("profile"));
//! assert_eq!(coordinator.render_keys(), vec!["settings", "profile"]);
//!
//! manager.close_all();
//! assert!(coordinator.is_bulk_closing());
//! # Ok::<(), drawer_stack::DrawerError>(())
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod context;
pub mod domain;
pub mod observability;
pub mod presentation;
pub mod stack;

pub use context::DrawerContext;
pub use domain::{
    AttrValue, CloseBehavior, DrawerError, DrawerOptions, DrawerRecord, DrawerSeed, OptionsSeed,
    Placement, Result,
};
pub use presentation::{AnimationEnd, Coordinator, DrawerView, ElementId, ExitMode, InputEvent};
pub use stack::{StackManager, StackSnapshot, Subscription};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Element drawers are mounted into when nothing else is configured.
pub const DEFAULT_TELEPORT_TARGET: &str = "body";

/// Install-time options for one drawer surface.
///
/// Only the adapter layer reads these; the manager and coordinator receive
/// already-resolved values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults merged under every `open`.
    pub default_options: Option<OptionsSeed>,

    /// Selector of the element drawers are rendered into. Default: `"body"`
    pub teleport_target: String,

    /// Disables animations; closes take effect immediately. Default: `false`
    pub headless: bool,

    /// Tracing filter directive. Options: `trace`, `debug`, `info`, `warn`,
    /// `error`, or any `EnvFilter` expression. Default: `"info"`
    pub trace_level: Option<String>,

    /// File receiving one JSON line per finished span.
    pub trace_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_options: None,
            teleport_target: DEFAULT_TELEPORT_TARGET.to_string(),
            headless: false,
            trace_level: None,
            trace_file: None,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Parses configuration from a host-provided string map.
    ///
    /// # Parsing Rules
    ///
    /// - `teleport_target`: String, empty values fall back to `"body"`
    /// - `headless`: `true/false/1/0/yes/no/on/off`, unparsable → `false`
    /// - `placement`: `top/right/bottom/left` → default placement, unknown ignored
    /// - `close_on_escape_key`, `close_on_backdrop_click`: flags → defaults
    /// - `trace_level`, `trace_file`: passed through
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use drawer_stack::{Config, Placement};
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("headless".to_string(), "yes".to_string());
    /// map.insert("placement".to_string(), "left".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert!(config.headless);
    /// assert_eq!(config.default_options.unwrap().placement, Some(Placement::Left));
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let teleport_target = map
            .get("teleport_target")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_TELEPORT_TARGET.to_string());

        let headless = map
            .get("headless")
            .and_then(|s| parse_flag(s))
            .unwrap_or(false);

        let defaults = OptionsSeed {
            placement: map.get("placement").and_then(|s| Placement::parse(s)),
            close_on_escape_key: map.get("close_on_escape_key").and_then(|s| parse_flag(s)),
            close_on_backdrop_click: map
                .get("close_on_backdrop_click")
                .and_then(|s| parse_flag(s)),
            ..OptionsSeed::default()
        };

        Self {
            default_options: (defaults != OptionsSeed::default()).then_some(defaults),
            teleport_target,
            headless,
            trace_level: map.get("trace_level").cloned(),
            trace_file: map.get("trace_file").map(PathBuf::from),
        }
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`DrawerError::Config`] on invalid TOML or mistyped fields.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| DrawerError::Config(format!("failed to parse config TOML: {e}")))
    }

    /// Loads a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`DrawerError::Io`] if the file cannot be read and
    /// [`DrawerError::Config`] if it cannot be parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    #[must_use]
    pub const fn exit_mode(&self) -> ExitMode {
        ExitMode::from_headless(self.headless)
    }

    /// Configured defaults as an option bag.
    #[must_use]
    pub fn defaults<T>(&self) -> Option<DrawerOptions<T>> {
        self.default_options.clone().map(OptionsSeed::into_options)
    }
}

/// Builds a context for one drawer surface from install-time options.
///
/// The returned context holds a fresh, empty manager seeded with the
/// configured defaults, plus the teleport target and exit mode.
pub fn install<T: Clone + 'static>(config: &Config) -> DrawerContext<T> {
    tracing::debug!(
        teleport_target = %config.teleport_target,
        headless = config.headless,
        has_defaults = config.default_options.is_some(),
        "installing drawer stack"
    );

    let manager = StackManager::with_state(Vec::new(), config.defaults());
    DrawerContext::with_manager(manager)
        .teleport_target(config.teleport_target.clone())
        .exit_mode(config.exit_mode())
}
