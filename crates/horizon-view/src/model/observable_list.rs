//! An observable list that reports every structural change.
//!
//! `ObservableList<T>` is the standard live source for a collection view. Each
//! mutation updates the items under a write lock, releases the lock, and then
//! emits a [`SourceChange`] so that slots may read the list freely.

use parking_lot::RwLock;

use horizon_view_core::Signal;

use super::source::{ItemSource, SourceChange};

/// A thread-safe list emitting [`SourceChange`] notifications.
///
/// # Example
///
/// ```
/// use horizon_view::model::{ObservableList, SourceChange};
///
/// let list = ObservableList::from_vec(vec!["b", "c"]);
/// list.changes().connect(|change| {
///     if let SourceChange::Added { index, items } = change {
///         println!("{} item(s) added at {index}", items.len());
///     }
/// });
///
/// list.insert(0, "a");
/// assert_eq!(list.snapshot(), vec!["a", "b", "c"]);
/// ```
pub struct ObservableList<T> {
    items: RwLock<Vec<T>>,
    changes: Signal<SourceChange<T>>,
}

impl<T: Clone + Send + Sync + 'static> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> ObservableList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Creates a list holding `items`.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            changes: Signal::new(),
        }
    }

    /// Returns the change signal.
    pub fn changes(&self) -> &Signal<SourceChange<T>> {
        &self.changes
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Returns the item at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.read().get(index).cloned()
    }

    /// Returns a copy of all items.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.read().clone()
    }

    /// Returns read-only access to the items.
    pub fn items(&self) -> impl std::ops::Deref<Target = Vec<T>> + '_ {
        self.items.read()
    }

    /// Appends an item to the end of the list.
    pub fn push(&self, item: T) {
        let index = {
            let mut items = self.items.write();
            items.push(item.clone());
            items.len() - 1
        };
        self.changes.emit(SourceChange::Added {
            index,
            items: vec![item],
        });
    }

    /// Inserts an item at the specified index.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert(&self, index: usize, item: T) {
        self.items.write().insert(index, item.clone());
        self.changes.emit(SourceChange::Added {
            index,
            items: vec![item],
        });
    }

    /// Appends several items, reported as one multi-item change.
    pub fn extend<I: IntoIterator<Item = T>>(&self, new_items: I) {
        let new_items: Vec<T> = new_items.into_iter().collect();
        if new_items.is_empty() {
            return;
        }
        let index = {
            let mut items = self.items.write();
            let index = items.len();
            items.extend(new_items.iter().cloned());
            index
        };
        self.changes.emit(SourceChange::Added {
            index,
            items: new_items,
        });
    }

    /// Removes and returns the item at `index`, or `None` if out of range.
    pub fn remove(&self, index: usize) -> Option<T> {
        let removed = {
            let mut items = self.items.write();
            if index >= items.len() {
                return None;
            }
            items.remove(index)
        };
        self.changes.emit(SourceChange::Removed {
            index,
            items: vec![removed.clone()],
        });
        Some(removed)
    }

    /// Replaces the item at `index`, returning the previous value.
    ///
    /// Returns `None` and leaves the list untouched if `index` is out of range.
    pub fn replace(&self, index: usize, item: T) -> Option<T> {
        let old = {
            let mut items = self.items.write();
            let slot = items.get_mut(index)?;
            std::mem::replace(slot, item.clone())
        };
        self.changes.emit(SourceChange::Replaced {
            index,
            old: vec![old.clone()],
            new: vec![item],
        });
        Some(old)
    }

    /// Moves the item at `from` so that it ends up at index `to`.
    ///
    /// Returns `false` if either index is out of range. Moving an item onto
    /// itself succeeds without emitting anything.
    pub fn move_item(&self, from: usize, to: usize) -> bool {
        let moved = {
            let mut items = self.items.write();
            if from >= items.len() || to >= items.len() {
                return false;
            }
            if from == to {
                return true;
            }
            let item = items.remove(from);
            items.insert(to, item.clone());
            item
        };
        self.changes.emit(SourceChange::Moved {
            old_index: from,
            new_index: to,
            items: vec![moved],
        });
        true
    }

    /// Removes all items.
    pub fn clear(&self) {
        self.items.write().clear();
        self.changes.emit(SourceChange::Reset);
    }

    /// Replaces all items.
    pub fn set_items(&self, items: Vec<T>) {
        *self.items.write() = items;
        self.changes.emit(SourceChange::Reset);
    }
}

impl<T: Clone + Send + Sync + 'static> ItemSource<T> for ObservableList<T> {
    fn len(&self) -> usize {
        ObservableList::len(self)
    }

    fn snapshot(&self) -> Vec<T> {
        ObservableList::snapshot(self)
    }

    fn changes(&self) -> Option<&Signal<SourceChange<T>>> {
        Some(&self.changes)
    }
}

impl<T: Clone + Send + Sync + 'static> From<Vec<T>> for ObservableList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableList")
            .field("items", &*self.items.read())
            .field("connections", &self.changes.connection_count())
            .finish()
    }
}

static_assertions::assert_impl_all!(ObservableList<String>: Send, Sync);
