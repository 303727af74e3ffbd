//! Exit strategies: how a coordinator turns stack changes into animations.
//!
//! The strategy is picked once, when the coordinator is bound, instead of
//! checking a headless flag in every method.
//!
//! - [`ImmediateExit`] mirrors every authoritative change 1:1 into the render
//!   stack and closes synchronously through the manager. Nothing animates.
//! - [`AnimatedExit`] keeps closing drawers rendered until the rendering layer
//!   reports their exit animation finished, and groups a `close_all` into one
//!   bulk exit.

use super::state::PresentationState;
use crate::stack::{StackManager, StackSnapshot};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Which [`ExitStrategy`] a coordinator uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitMode {
    /// Headless: no animations, closes are immediate.
    Immediate,
    #[default]
    Animated,
}

impl ExitMode {
    #[must_use]
    pub const fn from_headless(headless: bool) -> Self {
        if headless {
            Self::Immediate
        } else {
            Self::Animated
        }
    }

    #[must_use]
    pub fn strategy<T: Clone + 'static>(self) -> Box<dyn ExitStrategy<T>> {
        match self {
            Self::Immediate => Box::new(ImmediateExit),
            Self::Animated => Box::new(AnimatedExit),
        }
    }
}

/// Capability deciding how drawers leave the screen.
///
/// Methods that may call into the manager take the state cell rather than a
/// borrow, because the manager notifies the coordinator synchronously and the
/// coordinator then borrows the same state to reconcile.
pub trait ExitStrategy<T> {
    fn mode(&self) -> ExitMode;

    /// Folds the authoritative transition `prev -> next` into the render state.
    fn reconcile(
        &self,
        state: &mut PresentationState<T>,
        prev: &Rc<StackSnapshot<T>>,
        next: &Rc<StackSnapshot<T>>,
    );

    /// Starts dismissing `key`. Returns whether anything changed.
    fn begin_close(
        &self,
        state: &RefCell<PresentationState<T>>,
        manager: &StackManager<T>,
        key: &str,
    ) -> bool;

    /// The exit animation of `key` finished. Returns whether anything changed.
    fn finish_close(
        &self,
        state: &RefCell<PresentationState<T>>,
        manager: &StackManager<T>,
        key: &str,
    ) -> bool;

    /// The enter animation of `key` finished. Returns whether anything changed.
    fn finish_enter(&self, state: &mut PresentationState<T>, key: &str) -> bool;
}

/// Headless strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateExit;

impl<T: Clone + 'static> ExitStrategy<T> for ImmediateExit {
    fn mode(&self) -> ExitMode {
        ExitMode::Immediate
    }

    fn reconcile(
        &self,
        state: &mut PresentationState<T>,
        _prev: &Rc<StackSnapshot<T>>,
        next: &Rc<StackSnapshot<T>>,
    ) {
        state.render_stack = next.stack().to_vec();
        state.clear_animation_marks();
    }

    fn begin_close(
        &self,
        _state: &RefCell<PresentationState<T>>,
        manager: &StackManager<T>,
        key: &str,
    ) -> bool {
        if !manager.contains(key) {
            return false;
        }
        manager.close(Some(key));
        true
    }

    fn finish_close(
        &self,
        _state: &RefCell<PresentationState<T>>,
        _manager: &StackManager<T>,
        _key: &str,
    ) -> bool {
        false
    }

    fn finish_enter(&self, _state: &mut PresentationState<T>, _key: &str) -> bool {
        false
    }
}

/// Animated strategy with deferred removal and bulk-close detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimatedExit;

impl AnimatedExit {
    fn begin_bulk_close<T: Clone>(state: &mut PresentationState<T>, prev: &StackSnapshot<T>) {
        state.bulk_closing_all = true;
        for record in prev.stack() {
            state.closing.insert(record.key().to_string(), record.generation());
            state.entering.remove(record.key());
        }
        state.render_stack = prev.stack().to_vec();
        state.next_top_key = None;
        tracing::debug!(closing = state.closing.len(), "bulk close started");
    }
}

impl<T: Clone + 'static> ExitStrategy<T> for AnimatedExit {
    fn mode(&self) -> ExitMode {
        ExitMode::Animated
    }

    fn reconcile(
        &self,
        state: &mut PresentationState<T>,
        prev: &Rc<StackSnapshot<T>>,
        next: &Rc<StackSnapshot<T>>,
    ) {
        // Non-empty to empty with nothing mid-exit can only be close_all.
        if !prev.is_empty() && next.is_empty() && state.closing.is_empty() {
            Self::begin_bulk_close(state, prev);
            return;
        }

        let prev_keys: HashSet<&str> = prev.keys().into_iter().collect();
        for record in next.stack() {
            let key = record.key();
            let reopened = state
                .closing
                .get(key)
                .is_some_and(|generation| *generation != record.generation());
            if reopened || !prev_keys.contains(key) {
                if state.closing.remove(key).is_some() {
                    tracing::debug!(key = %key, "drawer reopened during exit animation");
                }
                state.entering.insert(key.to_string());
            }
        }

        if let Some(next_top) = state.next_top_key.as_deref() {
            let still_pending = next.contains(next_top)
                && next
                    .top()
                    .is_some_and(|top| top.key() == next_top || state.closing.contains_key(top.key()));
            if !still_pending {
                state.next_top_key = None;
            }
        }

        if state.bulk_closing_all {
            // Drawers still in the stack stay closing only if it is the same open.
            state.closing.retain(|key, generation| {
                next.get(key)
                    .map_or(true, |live| live.generation() == *generation)
            });
            if state.closing.is_empty() {
                state.bulk_closing_all = false;
                state.render_stack = next.stack().to_vec();
            } else {
                // Keep the outgoing drawers underneath whatever was opened meanwhile.
                let mut render_stack: Vec<_> = state
                    .render_stack
                    .iter()
                    .filter(|record| {
                        state.closing.contains_key(record.key()) && !next.contains(record.key())
                    })
                    .cloned()
                    .collect();
                render_stack.extend(next.stack().iter().cloned());
                state.render_stack = render_stack;
            }
        } else {
            // A closing drawer that left the stack some other way has nothing left to animate.
            state.closing.retain(|key, _| next.contains(key));
            state.render_stack = next.stack().to_vec();
        }

        state.entering.retain(|key| next.contains(key));

        tracing::trace!(
            render_len = state.render_stack.len(),
            closing = state.closing.len(),
            entering = state.entering.len(),
            bulk = state.bulk_closing_all,
            "render state reconciled"
        );
    }

    fn begin_close(
        &self,
        state: &RefCell<PresentationState<T>>,
        manager: &StackManager<T>,
        key: &str,
    ) -> bool {
        let mut state = state.borrow_mut();
        if state.closing.contains_key(key) {
            return false;
        }
        // During a bulk close only drawers opened since then can still leave.
        if state.bulk_closing_all && !manager.contains(key) {
            return false;
        }
        let Some(index) = state.position(key) else {
            return false;
        };

        if state.effective_top_index() == Some(index) {
            let below = state.render_stack[..index]
                .iter()
                .rev()
                .find(|record| !state.closing.contains_key(record.key()))
                .map(|record| record.key().to_string());
            state.next_top_key = below;
        }

        let generation = state.render_stack[index].generation();
        state.closing.insert(key.to_string(), generation);
        state.entering.remove(key);
        tracing::debug!(key = %key, next_top = ?state.next_top_key, "exit animation started");
        true
    }

    fn finish_close(
        &self,
        state: &RefCell<PresentationState<T>>,
        manager: &StackManager<T>,
        key: &str,
    ) -> bool {
        let (bulk, generation) = {
            let state = state.borrow();
            match state.closing.get(key) {
                Some(generation) => (state.bulk_closing_all, *generation),
                None => {
                    tracing::trace!(key = %key, "exit finished for a drawer that is not closing");
                    return false;
                }
            }
        };

        // Last write wins: a drawer reopened since its exit started stays open.
        let closed_live = match manager.get_drawer(key) {
            Some(live) if live.generation() == generation => {
                manager.close(Some(key));
                true
            }
            Some(_) => {
                tracing::debug!(key = %key, "skipping deferred close of reopened drawer");
                false
            }
            None => false,
        };

        let mut state = state.borrow_mut();
        state.closing.remove(key);
        state.entering.remove(key);

        if state.bulk_closing_all {
            if closed_live {
                state.render_stack.retain(|record| record.key() != key);
            }
            if state.closing.is_empty() {
                state.render_stack = manager.get_state().stack().to_vec();
                state.bulk_closing_all = false;
                tracing::debug!("bulk close finished");
            }
        }

        if bulk {
            let stale = state
                .next_top_key
                .as_deref()
                .is_some_and(|next_top| !manager.contains(next_top));
            if stale {
                state.next_top_key = None;
            }
        } else {
            state.next_top_key = None;
        }

        tracing::debug!(key = %key, bulk, "exit animation finished");
        true
    }

    fn finish_enter(&self, state: &mut PresentationState<T>, key: &str) -> bool {
        state.entering.remove(key)
    }
}
