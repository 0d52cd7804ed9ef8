//! Backing sources a collection view projects from.
//!
//! Any ordered collection can back a view through [`ItemSource`]. A source
//! that can report its own structural changes exposes a change signal via
//! [`ItemSource::changes`]; the view subscribes to it and maintains itself
//! incrementally. Sources without one are plain snapshots and only change
//! in the view on an explicit refresh.

use std::fmt;
use std::sync::Arc;

use horizon_view_core::{ConnectionId, Signal};

/// A structural change reported by an observable source.
///
/// Indices refer to the source before the change for removals and to the
/// source after the change for insertions.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceChange<T> {
    /// `items` were inserted starting at `index`.
    Added { index: usize, items: Vec<T> },
    /// `items` were removed starting at `index`.
    Removed { index: usize, items: Vec<T> },
    /// `old` items starting at `index` were replaced by `new`.
    Replaced { index: usize, old: Vec<T>, new: Vec<T> },
    /// `items` moved from `old_index` to `new_index`.
    Moved {
        old_index: usize,
        new_index: usize,
        items: Vec<T>,
    },
    /// The source changed in a way that cannot be described item by item.
    Reset,
}

impl<T> SourceChange<T> {
    /// Returns `true` if the change affects exactly one item.
    ///
    /// Only single-item changes are applied incrementally; everything else
    /// makes the view rebuild.
    pub fn is_single(&self) -> bool {
        match self {
            SourceChange::Added { items, .. }
            | SourceChange::Removed { items, .. }
            | SourceChange::Moved { items, .. } => items.len() == 1,
            SourceChange::Replaced { old, new, .. } => old.len() == 1 && new.len() == 1,
            SourceChange::Reset => false,
        }
    }

    /// Short name of the change kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceChange::Added { .. } => "added",
            SourceChange::Removed { .. } => "removed",
            SourceChange::Replaced { .. } => "replaced",
            SourceChange::Moved { .. } => "moved",
            SourceChange::Reset => "reset",
        }
    }
}

/// An ordered collection that can back a collection view.
///
/// Implementations must be cheap to query for their length and able to hand
/// out a snapshot of their items in order. The optional capabilities default
/// to "absent".
pub trait ItemSource<T>: Send + Sync {
    /// Returns the number of items.
    fn len(&self) -> usize;

    /// Returns `true` if the source holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the items in source order.
    fn snapshot(&self) -> Vec<T>;

    /// Returns the change signal if this source is observable.
    ///
    /// The default returns `None`: the source is treated as a plain snapshot.
    fn changes(&self) -> Option<&Signal<SourceChange<T>>> {
        None
    }

    /// Returns `true` if more data can be fetched.
    ///
    /// Used for lazy loading / incremental data fetching.
    /// The default returns `false`.
    fn can_fetch_more(&self) -> bool {
        false
    }

    /// Fetches more data.
    ///
    /// Called when a consumer needs more data and `can_fetch_more` is true.
    /// Newly fetched items are expected to be reported through [`changes`](Self::changes).
    /// The default does nothing.
    fn fetch_more(&self) {}
}

/// A `Vec` is a plain snapshot source.
impl<T: Clone + Send + Sync> ItemSource<T> for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn snapshot(&self) -> Vec<T> {
        self.clone()
    }
}

/// A live connection to a source's change signal.
///
/// Dropping the subscription disconnects the slot, so the view and the source
/// never keep each other alive through it.
pub(crate) struct SourceSubscription<T: 'static> {
    source: Arc<dyn ItemSource<T>>,
    id: ConnectionId,
}

impl<T: 'static> SourceSubscription<T> {
    /// Connects `slot` to the source's change signal.
    ///
    /// Returns `None` if the source is not observable.
    pub(crate) fn attach<F>(source: Arc<dyn ItemSource<T>>, slot: F) -> Option<Self>
    where
        F: Fn(&SourceChange<T>) + Send + Sync + 'static,
    {
        let id = source.changes()?.connect(slot);
        Some(Self { source, id })
    }
}

impl<T: 'static> Drop for SourceSubscription<T> {
    fn drop(&mut self) {
        if let Some(signal) = self.source.changes() {
            signal.disconnect(self.id);
        }
    }
}

impl<T: 'static> fmt::Debug for SourceSubscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceSubscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
