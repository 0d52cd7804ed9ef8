//! Change feed published by a collection view.

use std::collections::VecDeque;

use horizon_view_core::Signal;
use parking_lot::Mutex;

/// A single mutation of the view sequence.
///
/// Replaying the `Inserted`/`Removed` events in order against a copy of the
/// view reproduces it exactly. After `Reset` the view must be re-read.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewChange<T> {
    /// The view was rebuilt from scratch.
    Reset,
    /// `item` now sits at `index`.
    Inserted { index: usize, item: T },
    /// `item` was removed from `index`.
    Removed { index: usize, item: T },
}

impl<T> ViewChange<T> {
    /// Applies this change to a replica of the view.
    ///
    /// Returns `false` for [`ViewChange::Reset`], in which case the replica
    /// must be reloaded from the view, or if the index does not fit the
    /// replica.
    pub fn apply_to(&self, replica: &mut Vec<T>) -> bool
    where
        T: Clone,
    {
        match self {
            ViewChange::Reset => false,
            ViewChange::Inserted { index, item } => {
                if *index > replica.len() {
                    return false;
                }
                replica.insert(*index, item.clone());
                true
            }
            ViewChange::Removed { index, .. } => {
                if *index >= replica.len() {
                    return false;
                }
                replica.remove(*index);
                true
            }
        }
    }
}

/// Settable properties of a collection view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewProperty {
    /// The backing source was replaced.
    Source,
    /// The filter predicate was set or cleared.
    Filter,
    /// The group description was set or cleared.
    GroupDescription,
    /// Whether the view is grouped changed.
    IsGrouped,
    /// The sort description list was edited.
    SortDescriptions,
    /// The current item changed.
    CurrentItem,
    /// The current position changed.
    CurrentPosition,
}

/// Signals emitted by a collection view.
///
/// Signals are emitted after the view's internal state is consistent and
/// its lock released, so slots may query the view. A slot may also edit the
/// source or the view; the resulting changes are delivered once the current
/// batch has finished.
pub struct ViewSignals<T> {
    /// Emitted for every mutation of the view sequence, in order.
    pub collection_changed: Signal<ViewChange<T>>,

    /// Emitted when a settable property changes.
    pub property_changed: Signal<ViewProperty>,
}

impl<T: 'static> ViewSignals<T> {
    /// Creates a new set of view signals.
    pub fn new() -> Self {
        Self {
            collection_changed: Signal::new(),
            property_changed: Signal::new(),
        }
    }

    pub(crate) fn disconnect_all(&self) {
        self.collection_changed.disconnect_all();
        self.property_changed.disconnect_all();
    }
}

impl<T: 'static> Default for ViewSignals<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A notification queued while the view state is locked.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Notification<T> {
    Collection(ViewChange<T>),
    Property(ViewProperty),
}

impl<T: 'static> ViewSignals<T> {
    fn deliver(&self, notification: Notification<T>) {
        match notification {
            Notification::Collection(change) => self.collection_changed.emit(change),
            Notification::Property(property) => self.property_changed.emit(property),
        }
    }
}

struct QueueState<T> {
    pending: VecDeque<Notification<T>>,
    draining: bool,
}

/// FIFO of notifications awaiting delivery.
///
/// Batches are enqueued in the order the view state changed. Only one caller
/// drains at a time, so a slot that mutates the view appends its batch behind
/// the one being delivered instead of interleaving with it.
pub(crate) struct NotificationQueue<T> {
    inner: Mutex<QueueState<T>>,
}

impl<T: 'static> NotificationQueue<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(QueueState {
                pending: VecDeque::new(),
                draining: false,
            }),
        }
    }

    /// Appends a batch. Call while the view state is still locked.
    pub(crate) fn enqueue(&self, batch: Vec<Notification<T>>) {
        if !batch.is_empty() {
            self.inner.lock().pending.extend(batch);
        }
    }

    /// Delivers pending notifications until the queue is empty.
    ///
    /// Returns immediately when another call is already draining; that call
    /// delivers whatever was enqueued here.
    pub(crate) fn drain(&self, signals: &ViewSignals<T>) {
        {
            let mut inner = self.inner.lock();
            if inner.draining {
                return;
            }
            inner.draining = true;
        }
        let _reset = ResetOnPanic(&self.inner);

        loop {
            let next = {
                let mut inner = self.inner.lock();
                match inner.pending.pop_front() {
                    Some(notification) => notification,
                    None => {
                        inner.draining = false;
                        return;
                    }
                }
            };
            signals.deliver(next);
        }
    }
}

/// Lets a later `drain` resume after a slot panicked mid-delivery.
struct ResetOnPanic<'a, T>(&'a Mutex<QueueState<T>>);

impl<T> Drop for ResetOnPanic<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.lock().draining = false;
        }
    }
}
