//! Listener registry and subscription handles.

use super::snapshot::StackSnapshot;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Callback receiving each new snapshot.
pub type Listener<T> = Rc<dyn Fn(&Rc<StackSnapshot<T>>)>;

/// Registered listeners of one manager.
pub(crate) struct Listeners<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Listener<T>)>>,
}

impl<T> Listeners<T> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            entries: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn insert(&self, listener: Listener<T>) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push((id, listener));
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    fn contains(&self, id: u64) -> bool {
        self.entries.borrow().iter().any(|(entry_id, _)| *entry_id == id)
    }

    /// Calls every listener registered at the start of the round.
    ///
    /// The registry is not borrowed while listeners run, so they may subscribe,
    /// unsubscribe or mutate the manager again. Listeners subscribed during the
    /// round wait for the next one; listeners unsubscribed during the round are
    /// skipped if they have not run yet.
    pub(crate) fn notify(&self, snapshot: &Rc<StackSnapshot<T>>) {
        let round: Vec<(u64, Listener<T>)> = self
            .entries
            .borrow()
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect();

        for (id, listener) in round {
            if self.contains(id) {
                listener(snapshot);
            }
        }
    }
}

trait Unregister {
    fn unregister(&self, id: u64) -> bool;
}

impl<T> Unregister for Listeners<T> {
    fn unregister(&self, id: u64) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }
}

/// Handle returned by `StackManager::subscribe`.
///
/// Dropping the handle does not unsubscribe; call [`unsubscribe`] explicitly,
/// typically from the host's unmount hook.
///
/// [`unsubscribe`]: Subscription::unsubscribe
pub struct Subscription {
    registry: Weak<dyn Unregister>,
    id: u64,
    active: Cell<bool>,
}

impl Subscription {
    pub(crate) fn new<T: 'static>(registry: &Rc<Listeners<T>>, id: u64) -> Self {
        let registry: Weak<Listeners<T>> = Rc::downgrade(registry);
        Self {
            registry,
            id,
            active: Cell::new(true),
        }
    }

    /// Removes exactly this listener. Further calls are no-ops.
    pub fn unsubscribe(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            let removed = registry.unregister(self.id);
            tracing::trace!(listener_id = self.id, removed, "listener unsubscribed");
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get() && self.registry.strong_count() > 0
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active.get())
            .finish_non_exhaustive()
    }
}
