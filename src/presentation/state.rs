//! Transient render state owned by one coordinator.

use crate::domain::DrawerRecord;
use crate::stack::StackSnapshot;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// What a coordinator is currently drawing and which drawers are animating.
///
/// `render_stack` may lag the authoritative stack while exit animations play.
/// `closing` maps each closing key to the generation it had when its exit
/// started, so a reopen during the animation can be told apart.
pub struct PresentationState<T = ()> {
    pub(crate) render_stack: Vec<DrawerRecord<T>>,
    pub(crate) closing: HashMap<String, u64>,
    pub(crate) entering: HashSet<String>,
    pub(crate) next_top_key: Option<String>,
    pub(crate) bulk_closing_all: bool,
    pub(crate) last_seen: Rc<StackSnapshot<T>>,
}

impl<T> PresentationState<T> {
    /// Seeds the render stack from `snapshot` with nothing animating.
    pub(crate) fn seeded(snapshot: Rc<StackSnapshot<T>>) -> Self {
        Self {
            render_stack: snapshot.stack().to_vec(),
            closing: HashMap::new(),
            entering: HashSet::new(),
            next_top_key: None,
            bulk_closing_all: false,
            last_seen: snapshot,
        }
    }

    #[must_use]
    pub fn render_stack(&self) -> &[DrawerRecord<T>] {
        &self.render_stack
    }

    #[must_use]
    pub fn is_closing(&self, key: &str) -> bool {
        self.closing.contains_key(key)
    }

    #[must_use]
    pub fn is_entering(&self, key: &str) -> bool {
        self.entering.contains(key)
    }

    #[must_use]
    pub fn next_top_key(&self) -> Option<&str> {
        self.next_top_key.as_deref()
    }

    #[must_use]
    pub const fn is_bulk_closing(&self) -> bool {
        self.bulk_closing_all
    }

    /// Index of the topmost rendered drawer that is not on its way out.
    pub(crate) fn effective_top_index(&self) -> Option<usize> {
        self.render_stack
            .iter()
            .rposition(|record| !self.closing.contains_key(record.key()))
    }

    /// Index of the drawer styled as top.
    ///
    /// A pending `next_top_key` wins; otherwise the topmost non-closing drawer,
    /// or the last rendered drawer when everything is closing.
    pub(crate) fn styled_top_index(&self) -> Option<usize> {
        if let Some(next_top) = self.next_top_key.as_deref() {
            if let Some(index) = self.position(next_top) {
                return Some(index);
            }
        }
        self.effective_top_index()
            .or_else(|| self.render_stack.len().checked_sub(1))
    }

    pub(crate) fn position(&self, key: &str) -> Option<usize> {
        self.render_stack.iter().position(|record| record.key() == key)
    }

    pub(crate) fn clear_animation_marks(&mut self) {
        self.closing.clear();
        self.entering.clear();
        self.next_top_key = None;
        self.bulk_closing_all = false;
    }
}
