//! Authoritative drawer stack.
//!
//! [`StackManager`] is the single source of truth for which drawers exist and in
//! what order. Every mutating call computes a fresh [`StackSnapshot`], swaps it
//! in and notifies listeners synchronously before returning. Calls that would not
//! change anything return without notifying.
//!
//! # Re-entrancy
//!
//! No internal borrow is held while listeners or caller-supplied updaters run,
//! so a listener may call back into the manager. The nested call sees the
//! snapshot produced by the call that triggered it and runs its own
//! notification round.
//!
//! # Example
//!
//! ```rust
//! use drawer_stack::domain::DrawerRecord;
//! use drawer_stack::stack::StackManager;
//!
//! let manager: StackManager = StackManager::new();
//! manager.open(DrawerRecord::new("settings"));
//! manager.open(DrawerRecord::new("profile"));
//! manager.close(Some("settings"));
//! assert_eq!(manager.get_state().keys(), vec!["profile"]);
//! ```

use super::snapshot::StackSnapshot;
use super::subscription::{Listener, Listeners, Subscription};
use crate::domain::{DrawerError, DrawerOptions, DrawerRecord, DrawerSeed, Result};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

struct ManagerInner<T> {
    snapshot: RefCell<Rc<StackSnapshot<T>>>,
    defaults: RefCell<Option<Rc<DrawerOptions<T>>>>,
    listeners: Rc<Listeners<T>>,
    next_generation: Cell<u64>,
}

/// Shared handle to one drawer stack.
///
/// Cloning the handle shares the same stack. The manager is single-threaded.
pub struct StackManager<T = ()> {
    inner: Rc<ManagerInner<T>>,
}

impl<T> Clone for StackManager<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Default for StackManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> StackManager<T> {
    /// Creates an empty manager without defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(Vec::new(), None)
    }

    /// Creates a manager from an initial stack and optional defaults.
    ///
    /// Initial records are taken as-is; defaults only apply to later `open`
    /// calls. If the initial stack repeats a key, the later record wins and
    /// takes the later position.
    #[must_use]
    pub fn with_state(initial: Vec<DrawerRecord<T>>, defaults: Option<DrawerOptions<T>>) -> Self {
        let mut seen = HashSet::new();
        let mut deduped: Vec<DrawerRecord<T>> = Vec::with_capacity(initial.len());
        for record in initial.into_iter().rev() {
            if seen.insert(record.key().to_string()) {
                deduped.push(record);
            } else {
                tracing::debug!(key = %record.key(), "dropping duplicate key from initial stack");
            }
        }
        deduped.reverse();

        let mut generation = 0;
        let stack = deduped
            .into_iter()
            .map(|record| {
                generation += 1;
                record.stamped(generation)
            })
            .collect::<Vec<_>>();

        tracing::debug!(initial_len = stack.len(), has_defaults = defaults.is_some(), "stack manager created");

        Self {
            inner: Rc::new(ManagerInner {
                snapshot: RefCell::new(StackSnapshot::new(stack)),
                defaults: RefCell::new(defaults.map(Rc::new)),
                listeners: Rc::new(Listeners::new()),
                next_generation: Cell::new(generation + 1),
            }),
        }
    }

    /// Creates a manager from a JSON array of [`DrawerSeed`]s.
    ///
    /// # Errors
    ///
    /// Returns [`DrawerError::Seed`] if the JSON cannot be decoded.
    pub fn from_json(json: &str, defaults: Option<DrawerOptions<T>>) -> Result<Self> {
        let seeds: Vec<DrawerSeed> = serde_json::from_str(json)
            .map_err(|e| DrawerError::Seed(format!("failed to parse initial stack: {e}")))?;

        let records = seeds.into_iter().map(DrawerSeed::into_record).collect();
        Ok(Self::with_state(records, defaults))
    }

    /// Current snapshot. Cheap: the snapshot is shared, not copied.
    #[must_use]
    pub fn get_state(&self) -> Rc<StackSnapshot<T>> {
        Rc::clone(&self.inner.snapshot.borrow())
    }

    #[must_use]
    pub fn get_drawer(&self, key: &str) -> Option<DrawerRecord<T>> {
        self.inner.snapshot.borrow().get(key).cloned()
    }

    #[must_use]
    pub fn get_default_options(&self) -> Option<Rc<DrawerOptions<T>>> {
        self.inner.defaults.borrow().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.snapshot.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.snapshot.borrow().is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.snapshot.borrow().contains(key)
    }

    #[must_use]
    pub fn top_key(&self) -> Option<String> {
        self.inner
            .snapshot
            .borrow()
            .top()
            .map(|record| record.key().to_string())
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Registers `listener`, called with every new snapshot.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Rc<StackSnapshot<T>>) + 'static,
    {
        let listener: Listener<T> = Rc::new(listener);
        let id = self.inner.listeners.insert(listener);
        tracing::trace!(listener_id = id, "listener subscribed");
        Subscription::new(&self.inner.listeners, id)
    }

    /// Opens a drawer, or moves an already-open key to the top.
    ///
    /// Global defaults are merged underneath the record's own options. Opening
    /// always promotes to the top, even if the options did not change, and
    /// stamps a new generation on the record.
    pub fn open(&self, record: DrawerRecord<T>) -> String {
        let key = record.key().to_string();
        let _span = tracing::debug_span!("open", key = %key).entered();

        let options = match self.get_default_options() {
            Some(defaults) => Rc::new(record.options().merged_over(&defaults)),
            None => Rc::clone(record.options()),
        };

        let generation = self.inner.next_generation.get();
        self.inner.next_generation.set(generation + 1);
        let entry = DrawerRecord::from_shared(key.clone(), options).stamped(generation);

        let prev = self.get_state();
        let was_open = prev.contains(&key);
        let mut stack: Vec<DrawerRecord<T>> = prev
            .stack()
            .iter()
            .filter(|existing| existing.key() != key)
            .cloned()
            .collect();
        stack.push(entry);

        tracing::debug!(generation, was_open, stack_len = stack.len(), "drawer opened");
        self.commit(stack);
        key
    }

    /// Closes the drawer with `key`, or the topmost drawer when `key` is `None`.
    ///
    /// Empty stacks and unknown keys are no-ops.
    pub fn close(&self, key: Option<&str>) {
        let _span = tracing::debug_span!("close", key = ?key).entered();

        let prev = self.get_state();
        if prev.is_empty() {
            tracing::trace!("close on empty stack ignored");
            return;
        }

        let index = match key {
            None => prev.len() - 1,
            Some(key) => {
                let Some(index) = prev.position(key) else {
                    tracing::trace!("close of unknown key ignored");
                    return;
                };
                index
            }
        };

        let mut stack = prev.stack().to_vec();
        let removed = stack.remove(index);
        tracing::debug!(removed = %removed.key(), stack_len = stack.len(), "drawer closed");
        self.commit(stack);
    }

    /// Closes the topmost drawer.
    pub fn close_top(&self) {
        self.close(None);
    }

    /// Moves `key` to the top without touching its options or generation.
    pub fn bring_to_top(&self, key: &str) {
        let prev = self.get_state();
        if prev.len() < 2 {
            return;
        }
        let Some(index) = prev.position(key) else {
            return;
        };
        if index == prev.len() - 1 {
            return;
        }

        let mut stack = prev.stack().to_vec();
        let record = stack.remove(index);
        stack.push(record);
        tracing::debug!(key = %key, from_index = index, "drawer brought to top");
        self.commit(stack);
    }

    /// Empties the stack. A no-op if it is already empty.
    pub fn close_all(&self) {
        let prev_len = self.len();
        if prev_len == 0 {
            return;
        }
        tracing::debug!(closed = prev_len, "closing all drawers");
        self.commit(Vec::new());
    }

    /// Replaces the global defaults with `updater(previous)`.
    ///
    /// Open drawers are untouched and listeners are not notified; only future
    /// `open` calls see the new defaults.
    pub fn update_default_options<F>(&self, updater: F)
    where
        F: FnOnce(Option<&DrawerOptions<T>>) -> DrawerOptions<T>,
    {
        let previous = self.get_default_options();
        let next = updater(previous.as_deref());
        *self.inner.defaults.borrow_mut() = Some(Rc::new(next));
        tracing::debug!("default options updated");
    }

    /// Replaces the options of `key` in place with `updater(current)`.
    ///
    /// The drawer keeps its position. Returning the same `Rc` that was passed in
    /// skips the update and the notification entirely.
    pub fn update_options<F>(&self, key: &str, updater: F)
    where
        F: FnOnce(&Rc<DrawerOptions<T>>) -> Rc<DrawerOptions<T>>,
    {
        let prev = self.get_state();
        let Some(index) = prev.position(key) else {
            return;
        };

        let current = &prev.stack()[index];
        let next = updater(current.options());
        if Rc::ptr_eq(&next, current.options()) {
            tracing::trace!(key = %key, "options unchanged, skipping update");
            return;
        }

        // The updater may have re-entered the manager; splice into the live stack.
        let live = self.get_state();
        let Some(index) = live.position(key) else {
            return;
        };
        let mut stack = live.stack().to_vec();
        stack[index] = stack[index].replace_options(next);
        tracing::debug!(key = %key, index, "drawer options updated");
        self.commit(stack);
    }

    fn commit(&self, stack: Vec<DrawerRecord<T>>) {
        let snapshot = StackSnapshot::new(stack);
        *self.inner.snapshot.borrow_mut() = Rc::clone(&snapshot);
        self.inner.listeners.notify(&snapshot);
    }
}

impl<T: fmt::Debug> fmt::Debug for StackManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackManager")
            .field("snapshot", &self.inner.snapshot.borrow())
            .field("listeners", &self.inner.listeners.len())
            .finish_non_exhaustive()
    }
}
