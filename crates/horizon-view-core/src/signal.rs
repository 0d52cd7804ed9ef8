//! Observer primitive used for change notification.
//!
//! A [`Signal<Args>`] keeps a table of slots. [`Signal::emit`] calls every slot
//! with a reference to the payload, in the order the slots were connected.
//! Sources publish their structural changes through a signal and collection
//! views publish their change feed the same way.
//!
//! # Re-entrancy
//!
//! The slot table is copied out and its lock released before any slot runs.
//! A slot may therefore connect, disconnect, or emit on the very signal that
//! is calling it; table edits apply from the next emission.
//!
//! # Example
//!
//! ```
//! use horizon_view_core::Signal;
//!
//! let rows_inserted = Signal::<(usize, usize)>::new();
//!
//! let id = rows_inserted.connect(|(first, last)| {
//!     println!("rows {first}..={last} inserted");
//! });
//!
//! rows_inserted.emit((0, 2));
//! assert!(rows_inserted.disconnect(id));
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Handle to one connected slot, returned by [`Signal::connect`].
    ///
    /// Handles stay unique for the signal's lifetime; a handle whose slot was
    /// disconnected never refers to a later slot.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A list of slots invoked with a shared payload on every emission.
///
/// `Signal<Args>` is `Send + Sync`; slots run synchronously on whichever thread
/// calls [`emit`](Self::emit). Use `()` as `Args` for payload-free signals.
pub struct Signal<Args> {
    slots: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Creates a signal with an empty slot table.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Adds `slot` to the end of the slot table.
    ///
    /// ```
    /// use horizon_view_core::Signal;
    ///
    /// let reset = Signal::<()>::new();
    /// let id = reset.connect(|_| println!("reset"));
    /// reset.emit(());
    /// assert_eq!(reset.connection_count(), 1);
    /// reset.disconnect(id);
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.slots.lock().insert(Arc::new(slot))
    }

    /// Removes one slot. Returns `false` if `id` was already disconnected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id).is_some()
    }

    /// Removes every slot.
    pub fn disconnect_all(&self) {
        self.slots.lock().clear();
    }

    /// Returns the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Calls every connected slot with `args`, in connection order.
    #[tracing::instrument(skip_all, target = "horizon_view_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        let slots: Vec<Slot<Args>> = self.slots.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, slot_count = slots.len(), "emit");

        for slot in &slots {
            slot(&args);
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slots.lock().len())
            .finish()
    }
}
