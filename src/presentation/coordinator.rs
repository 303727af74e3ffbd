//! Presentation coordinator: reconciles the authoritative stack with what is drawn.
//!
//! The stack manager removes a record the instant `close` is called, but a
//! drawer on screen needs two phases: mark it closing, let its exit animation
//! play, then drop it. [`Coordinator`] subscribes to a manager, keeps its own
//! render stack plus the closing/entering marks, and turns stack changes and
//! host events into per-drawer lifecycle flags.
//!
//! # Event Flow
//!
//! ```text
//! StackManager ──notify──► reconcile ──► render state ──► render hook(views)
//!       ▲                                     ▲
//!       └── deferred close ◄── finalize ◄─────┴── InputEvent (Escape, backdrop, animationend)
//! ```
//!
//! # Example
//!
//! ```rust
//! use drawer_stack::domain::DrawerRecord;
//! use drawer_stack::presentation::{AnimationEnd, Coordinator, ElementId, ExitMode};
//! use drawer_stack::stack::StackManager;
//!
//! let manager: StackManager = StackManager::new();
//! let coordinator = Coordinator::bind(&manager, ExitMode::Animated);
//!
//! manager.open(DrawerRecord::new("cart"));
//! coordinator.close_with_animation("cart");
//! assert!(coordinator.is_closing("cart"));
//! assert!(manager.contains("cart"));
//!
//! let panel = ElementId(7);
//! coordinator.views()[0]
//!     .handle
//!     .on_panel_animation_end(&AnimationEnd::on_panel("drawer-exit-right", panel));
//! assert!(manager.is_empty());
//! ```

use super::input::InputEvent;
use super::state::PresentationState;
use super::strategy::{ExitMode, ExitStrategy};
use super::view::{DrawerHandle, DrawerView};
use crate::context::DrawerContext;
use crate::domain::{DrawerRecord, Result};
use crate::stack::{StackManager, StackSnapshot, Subscription};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Callback receiving the current drawer list after every render-state change.
pub type RenderHook<T> = Rc<dyn Fn(&[DrawerView<T>])>;

pub(crate) struct CoordinatorInner<T> {
    manager: StackManager<T>,
    state: RefCell<PresentationState<T>>,
    strategy: Box<dyn ExitStrategy<T>>,
    subscription: RefCell<Option<Subscription>>,
    render_hook: RefCell<Option<RenderHook<T>>>,
}

impl<T: Clone + 'static> CoordinatorInner<T> {
    fn on_stack_change(this: &Rc<Self>, next: &Rc<StackSnapshot<T>>) {
        // A listener earlier in the round may have mutated the manager; the
        // nested round already delivered the live snapshot.
        if !Rc::ptr_eq(next, &this.manager.get_state()) {
            tracing::trace!(len = next.len(), "ignoring superseded snapshot");
            return;
        }
        {
            let mut state = this.state.borrow_mut();
            if Rc::ptr_eq(&state.last_seen, next) {
                return;
            }
            let prev = std::mem::replace(&mut state.last_seen, Rc::clone(next));
            let _span = tracing::debug_span!(
                "reconcile",
                prev_len = prev.len(),
                next_len = next.len()
            )
            .entered();
            this.strategy.reconcile(&mut state, &prev, next);
        }
        Self::emit_render(this);
    }

    pub(crate) fn handle_input(this: &Rc<Self>, event: &InputEvent) -> bool {
        let _span = tracing::debug_span!("handle_input", event = ?event).entered();

        match event {
            InputEvent::EscapeKey => {
                let top = {
                    let state = this.state.borrow();
                    state
                        .effective_top_index()
                        .map(|index| state.render_stack[index].clone())
                };
                let Some(record) = top else {
                    return false;
                };
                if record.closes_on_escape_key() {
                    Self::close_with_animation(this, record.key())
                } else {
                    tracing::debug!(key = %record.key(), "escape not allowed for top drawer");
                    false
                }
            }
            InputEvent::BackdropClick { key } => {
                let target = {
                    let state = this.state.borrow();
                    state
                        .position(key)
                        .filter(|_| !state.is_closing(key))
                        .map(|index| state.render_stack[index].clone())
                };
                let Some(record) = target else {
                    return false;
                };
                if record.closes_on_backdrop_click() {
                    Self::close_with_animation(this, key)
                } else {
                    tracing::debug!(key = %key, "backdrop click not allowed for drawer");
                    false
                }
            }
            InputEvent::AnimationEnd { key, event } => {
                if !event.fired_on_panel() {
                    tracing::trace!(key = %key, animation = %event.animation_name, "ignoring bubbled animation end");
                    false
                } else if event.is_exit() {
                    Self::finalize_close(this, key)
                } else if event.is_enter() {
                    Self::finish_enter(this, key)
                } else {
                    tracing::trace!(key = %key, animation = %event.animation_name, "ignoring unrelated animation end");
                    false
                }
            }
        }
    }

    fn close_with_animation(this: &Rc<Self>, key: &str) -> bool {
        let changed = this.strategy.begin_close(&this.state, &this.manager, key);
        if changed {
            Self::emit_render(this);
        }
        changed
    }

    fn finalize_close(this: &Rc<Self>, key: &str) -> bool {
        let changed = this.strategy.finish_close(&this.state, &this.manager, key);
        if changed {
            Self::emit_render(this);
        }
        changed
    }

    fn finish_enter(this: &Rc<Self>, key: &str) -> bool {
        let changed = {
            let mut state = this.state.borrow_mut();
            this.strategy.finish_enter(&mut state, key)
        };
        if changed {
            Self::emit_render(this);
        }
        changed
    }

    fn views(this: &Rc<Self>) -> Vec<DrawerView<T>> {
        let state = this.state.borrow();
        let top = state.styled_top_index();
        state
            .render_stack
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let key = record.key();
                DrawerView::new(
                    record,
                    top == Some(index),
                    state.is_closing(key),
                    state.is_entering(key),
                    DrawerHandle::new(Rc::downgrade(this), key.to_string()),
                )
            })
            .collect()
    }

    fn emit_render(this: &Rc<Self>) {
        let hook = this.render_hook.borrow().clone();
        if let Some(hook) = hook {
            let views = Self::views(this);
            hook(&views);
        }
    }
}

impl<T> Drop for CoordinatorInner<T> {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.get_mut().take() {
            subscription.unsubscribe();
        }
    }
}

/// Animation coordinator bound to one stack manager and one rendering surface.
///
/// Several coordinators may watch the same manager; each keeps its own render
/// state. Cloning shares the coordinator.
pub struct Coordinator<T = ()> {
    inner: Rc<CoordinatorInner<T>>,
}

impl<T> Clone for Coordinator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Coordinator<T> {
    /// Subscribes to `manager` and seeds the render stack from its current state.
    ///
    /// Drawers already open at bind time are rendered without entering marks.
    #[must_use]
    pub fn bind(manager: &StackManager<T>, mode: ExitMode) -> Self {
        let inner = Rc::new(CoordinatorInner {
            manager: manager.clone(),
            state: RefCell::new(PresentationState::seeded(manager.get_state())),
            strategy: mode.strategy(),
            subscription: RefCell::new(None),
            render_hook: RefCell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        let subscription = manager.subscribe(move |snapshot| {
            if let Some(inner) = weak.upgrade() {
                CoordinatorInner::on_stack_change(&inner, snapshot);
            }
        });
        *inner.subscription.borrow_mut() = Some(subscription);

        tracing::debug!(mode = ?mode, render_len = manager.len(), "coordinator bound");
        Self { inner }
    }

    /// Binds to the manager provided through `context`.
    ///
    /// # Errors
    ///
    /// Returns [`DrawerError::MissingManager`](crate::DrawerError::MissingManager)
    /// when the context has no manager.
    pub fn from_context(context: &DrawerContext<T>, mode: ExitMode) -> Result<Self> {
        let manager = context.manager()?;
        Ok(Self::bind(&manager, mode))
    }

    /// The manager this coordinator listens to.
    #[must_use]
    pub fn manager(&self) -> &StackManager<T> {
        &self.inner.manager
    }

    /// The exit mode chosen at bind time.
    #[must_use]
    pub fn exit_mode(&self) -> ExitMode {
        self.inner.strategy.mode()
    }

    /// Installs the render callback, replacing any previous one.
    pub fn set_render_hook<F>(&self, hook: F)
    where
        F: Fn(&[DrawerView<T>]) + 'static,
    {
        *self.inner.render_hook.borrow_mut() = Some(Rc::new(hook));
    }

    /// Removes the render callback. Render state keeps updating.
    pub fn clear_render_hook(&self) {
        self.inner.render_hook.borrow_mut().take();
    }

    /// Starts dismissing `key` from a UI event handler.
    ///
    /// In animated mode the drawer is only marked closing; the manager keeps it
    /// until [`finalize_close`](Self::finalize_close). If it was the effective
    /// top, the drawer below becomes `next_top_key`. In immediate mode the
    /// manager closes it right away.
    ///
    /// During a bulk close only drawers opened after `close_all` can start
    /// closing; the outgoing ones are already animating.
    ///
    /// # Parameters
    ///
    /// * `key` - Key of a rendered drawer
    ///
    /// # Returns
    ///
    /// `true` if the drawer started closing. Unknown keys and drawers that are
    /// already closing return `false`.
    pub fn close_with_animation(&self, key: &str) -> bool {
        CoordinatorInner::close_with_animation(&self.inner, key)
    }

    /// Completes the exit of `key` once its animation has finished.
    ///
    /// Issues the deferred `close` on the manager unless the drawer was
    /// reopened in the meantime. Drawers closed by `close_all` are already gone
    /// from the manager and only leave the render stack.
    ///
    /// # Returns
    ///
    /// `true` if `key` was closing, `false` otherwise.
    pub fn finalize_close(&self, key: &str) -> bool {
        CoordinatorInner::finalize_close(&self.inner, key)
    }

    /// Clears the entering mark of `key` once its enter animation has finished.
    pub fn finish_enter(&self, key: &str) -> bool {
        CoordinatorInner::finish_enter(&self.inner, key)
    }

    /// Processes one host event. Returns whether the render state changed.
    pub fn handle_input(&self, event: &InputEvent) -> bool {
        CoordinatorInner::handle_input(&self.inner, event)
    }

    /// Shorthand for [`InputEvent::EscapeKey`].
    pub fn on_escape_key(&self) -> bool {
        self.handle_input(&InputEvent::EscapeKey)
    }

    /// Views of every rendered drawer, bottom first.
    #[must_use]
    pub fn views(&self) -> Vec<DrawerView<T>> {
        CoordinatorInner::views(&self.inner)
    }

    /// Records currently drawn, bottom first. May include drawers the manager
    /// has already removed.
    #[must_use]
    pub fn render_stack(&self) -> Vec<DrawerRecord<T>> {
        self.inner.state.borrow().render_stack().to_vec()
    }

    /// Keys of [`render_stack`](Self::render_stack).
    #[must_use]
    pub fn render_keys(&self) -> Vec<String> {
        self.inner
            .state
            .borrow()
            .render_stack()
            .iter()
            .map(|record| record.key().to_string())
            .collect()
    }

    /// Keys whose exit animation is in flight, sorted.
    #[must_use]
    pub fn closing_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.state.borrow().closing.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Keys whose enter animation is in flight, sorted.
    #[must_use]
    pub fn entering_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.state.borrow().entering.iter().cloned().collect();
        keys.sort();
        keys
    }

    /// Whether `key` is playing its exit animation.
    #[must_use]
    pub fn is_closing(&self, key: &str) -> bool {
        self.inner.state.borrow().is_closing(key)
    }

    /// Whether `key` is playing its enter animation.
    #[must_use]
    pub fn is_entering(&self, key: &str) -> bool {
        self.inner.state.borrow().is_entering(key)
    }

    /// Drawer styled as top while the real top animates out.
    #[must_use]
    pub fn next_top_key(&self) -> Option<String> {
        self.inner.state.borrow().next_top_key().map(str::to_string)
    }

    /// Whether a `close_all` exit is still playing.
    #[must_use]
    pub fn is_bulk_closing(&self) -> bool {
        self.inner.state.borrow().is_bulk_closing()
    }

    /// Whether the coordinator still listens to its manager.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner
            .subscription
            .borrow()
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Stops listening to the manager. Idempotent.
    pub fn detach(&self) {
        if let Some(subscription) = self.inner.subscription.borrow_mut().take() {
            subscription.unsubscribe();
            tracing::debug!("coordinator detached");
        }
    }
}

impl<T> fmt::Debug for Coordinator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Coordinator")
            .field("render_len", &state.render_stack().len())
            .field("closing", &state.closing.len())
            .field("entering", &state.entering.len())
            .field("next_top_key", &state.next_top_key())
            .field("bulk_closing_all", &state.is_bulk_closing())
            .finish_non_exhaustive()
    }
}
