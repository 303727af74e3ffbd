//! Immutable stack snapshots.

use crate::domain::DrawerRecord;
use std::fmt;
use std::rc::Rc;

/// One immutable value of the drawer stack.
///
/// The last record is the topmost, visible drawer. Snapshots are handed out as
/// `Rc<StackSnapshot>` and never mutated after creation, so consumers can hold
/// on to one and detect "nothing changed" with [`Rc::ptr_eq`].
pub struct StackSnapshot<T = ()> {
    stack: Vec<DrawerRecord<T>>,
}

impl<T> StackSnapshot<T> {
    pub(crate) fn new(stack: Vec<DrawerRecord<T>>) -> Rc<Self> {
        Rc::new(Self { stack })
    }

    /// An empty snapshot.
    #[must_use]
    pub fn empty() -> Rc<Self> {
        Self::new(Vec::new())
    }

    /// Records in z-order, bottom first.
    #[must_use]
    pub fn stack(&self) -> &[DrawerRecord<T>] {
        &self.stack
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// The topmost record.
    #[must_use]
    pub fn top(&self) -> Option<&DrawerRecord<T>> {
        self.stack.last()
    }

    #[must_use]
    pub fn position(&self, key: &str) -> Option<usize> {
        self.stack.iter().position(|record| record.key() == key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DrawerRecord<T>> {
        self.stack.iter().find(|record| record.key() == key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Keys in z-order, bottom first.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.stack.iter().map(DrawerRecord::key).collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for StackSnapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackSnapshot")
            .field("stack", &self.stack)
            .finish()
    }
}
