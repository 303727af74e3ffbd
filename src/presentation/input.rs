//! Input events delivered by the rendering layer.
//!
//! The coordinator is purely reactive: besides stack notifications it only
//! ever sees the three events below. Keyboard and pointer events are already
//! resolved to a drawer by the host; animation-end events carry enough of the
//! DOM event to tell an exit of the panel itself from an unrelated animation
//! that bubbled up from child content.

/// Animation names starting with this prefix are exit animations.
pub const EXIT_ANIMATION_PREFIX: &str = "drawer-exit";

/// Animation names starting with this prefix are enter animations.
pub const ENTER_ANIMATION_PREFIX: &str = "drawer-enter";

/// Opaque identity of a rendered element, assigned by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

/// An `animationend` notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationEnd {
    pub animation_name: String,
    /// Element the animation ran on.
    pub target: ElementId,
    /// Element the listener is attached to (the drawer panel).
    pub current_target: ElementId,
}

impl AnimationEnd {
    /// An event fired on the panel element itself.
    #[must_use]
    pub fn on_panel(animation_name: impl Into<String>, panel: ElementId) -> Self {
        Self {
            animation_name: animation_name.into(),
            target: panel,
            current_target: panel,
        }
    }

    /// An event that bubbled up from `descendant` to `panel`.
    #[must_use]
    pub fn bubbled(animation_name: impl Into<String>, descendant: ElementId, panel: ElementId) -> Self {
        Self {
            animation_name: animation_name.into(),
            target: descendant,
            current_target: panel,
        }
    }

    #[must_use]
    pub fn fired_on_panel(&self) -> bool {
        self.target == self.current_target
    }

    #[must_use]
    pub fn is_exit(&self) -> bool {
        self.animation_name.starts_with(EXIT_ANIMATION_PREFIX)
    }

    #[must_use]
    pub fn is_enter(&self) -> bool {
        self.animation_name.starts_with(ENTER_ANIMATION_PREFIX)
    }
}

/// Events handled by `Coordinator::handle_input`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Escape was pressed; only the topmost drawer responds.
    EscapeKey,
    /// The backdrop behind `key` was clicked.
    BackdropClick { key: String },
    /// An animation ended on (or inside) the panel of `key`.
    AnimationEnd { key: String, event: AnimationEnd },
}
