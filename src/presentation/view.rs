//! Per-drawer view models handed to the rendering layer.
//!
//! A [`DrawerView`] holds everything the host needs to draw one panel plus a
//! [`DrawerHandle`] with the two callbacks it wires to DOM events. Views are
//! computed on demand from the coordinator's render state and hold no logic.

use super::coordinator::CoordinatorInner;
use super::input::{AnimationEnd, InputEvent};
use crate::domain::{AttrValue, DrawerRecord, Placement};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Weak;

/// Attribute keys starting with this prefix are reserved for internal styling
/// hooks and never forwarded from caller data.
pub const RESERVED_ATTRIBUTE_PREFIX: &str = "data-drawer-";

/// Display state of one rendered drawer.
pub struct DrawerView<T = ()> {
    /// Key of the drawer this view draws.
    pub key: String,

    /// Resolved screen edge, used to pick the enter and exit animations.
    pub placement: Placement,

    /// Whether the panel is styled as the topmost drawer.
    ///
    /// While the top drawer animates out, the drawer below it already
    /// carries this flag.
    pub is_top: bool,

    /// The exit animation is playing; the panel should run `drawer-exit-*`.
    pub is_closing: bool,

    /// The enter animation is playing; the panel should run `drawer-enter-*`.
    pub is_entering: bool,

    /// Accessible name of the panel.
    pub aria_label: Option<String>,

    /// Id of the element labelling the panel.
    pub aria_labelledby: Option<String>,

    /// Id of the element describing the panel.
    pub aria_describedby: Option<String>,

    /// Caller attributes with reserved keys removed.
    pub attributes: BTreeMap<String, AttrValue>,
    /// The (possibly stale) record being drawn.
    pub record: DrawerRecord<T>,
    pub handle: DrawerHandle<T>,
}

impl<T> DrawerView<T> {
    pub(crate) fn new(
        record: &DrawerRecord<T>,
        is_top: bool,
        is_closing: bool,
        is_entering: bool,
        handle: DrawerHandle<T>,
    ) -> Self {
        let options = record.options();
        Self {
            key: record.key().to_string(),
            placement: record.placement(),
            is_top,
            is_closing,
            is_entering,
            aria_label: options.aria_label.clone(),
            aria_labelledby: options.aria_labelledby.clone(),
            aria_describedby: options.aria_describedby.clone(),
            attributes: filter_attributes(options.extra_attributes.as_ref()),
            record: record.clone(),
            handle,
        }
    }
}

impl<T> fmt::Debug for DrawerView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawerView")
            .field("key", &self.key)
            .field("placement", &self.placement)
            .field("is_top", &self.is_top)
            .field("is_closing", &self.is_closing)
            .field("is_entering", &self.is_entering)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

/// Drops every attribute whose key starts with [`RESERVED_ATTRIBUTE_PREFIX`].
#[must_use]
pub fn filter_attributes(
    attributes: Option<&BTreeMap<String, AttrValue>>,
) -> BTreeMap<String, AttrValue> {
    attributes
        .map(|attributes| {
            attributes
                .iter()
                .filter(|(name, _)| !name.starts_with(RESERVED_ATTRIBUTE_PREFIX))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// Callbacks bound to one rendered drawer.
///
/// Holds only a weak reference; once the coordinator is gone the callbacks do
/// nothing and return `false`.
pub struct DrawerHandle<T = ()> {
    coordinator: Weak<CoordinatorInner<T>>,
    key: String,
}

impl<T: Clone + 'static> DrawerHandle<T> {
    pub(crate) fn new(coordinator: Weak<CoordinatorInner<T>>, key: String) -> Self {
        Self { coordinator, key }
    }

    /// Key of the drawer the callbacks act on.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Backdrop of this drawer was clicked.
    ///
    /// # Returns
    ///
    /// `true` if the drawer started closing, `false` if it was already closing,
    /// its backdrop behaviour refused, or the coordinator is gone.
    pub fn on_backdrop_click(&self) -> bool {
        self.dispatch(&InputEvent::BackdropClick {
            key: self.key.clone(),
        })
    }

    /// An animation ended on this drawer's panel or one of its descendants.
    ///
    /// # Parameters
    ///
    /// * `event` - The `animationend` event as seen by the panel's listener
    ///
    /// # Returns
    ///
    /// `true` if an exit or enter animation of this drawer was completed.
    /// Bubbled events and unrelated animation names return `false`.
    pub fn on_panel_animation_end(&self, event: &AnimationEnd) -> bool {
        self.dispatch(&InputEvent::AnimationEnd {
            key: self.key.clone(),
            event: event.clone(),
        })
    }

    fn dispatch(&self, event: &InputEvent) -> bool {
        match self.coordinator.upgrade() {
            Some(inner) => CoordinatorInner::handle_input(&inner, event),
            None => {
                tracing::trace!(key = %self.key, "coordinator dropped, ignoring drawer callback");
                false
            }
        }
    }
}

impl<T> Clone for DrawerHandle<T> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Weak::clone(&self.coordinator),
            key: self.key.clone(),
        }
    }
}
