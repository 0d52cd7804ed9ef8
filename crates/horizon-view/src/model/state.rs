//! The view maintainer: materialized view state and its incremental updates.
//!
//! `ViewState` holds no locks and knows nothing about signals. Every operation
//! appends the notifications it produces, in mutation order, to an output
//! queue; the owning view emits them once its lock is released.
//!
//! Each view entry remembers the source index its item came from. Entries are
//! kept ordered by the composite comparator with the source index as the
//! final tie-break, which makes every incremental insert land exactly where a
//! stable sort of the filtered source would have put it.

use std::cmp::Ordering;
use std::sync::Arc;

use horizon_view_core::PerfSpan;
use horizon_view_core::logging::targets;

use super::comparator::CompositeComparator;
use super::group::{CollectionGroup, GroupIndex};
use super::signals::{Notification, ViewChange, ViewProperty};
use super::sort::{GroupDescription, SortDescription};
use super::source::SourceChange;

/// Type alias for a filter predicate.
pub type FilterFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

#[derive(Debug, Clone)]
struct Entry<T> {
    item: T,
    source_index: usize,
}

/// Current item and position, captured to detect cursor changes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Cursor<T> {
    position: Option<usize>,
    item: Option<T>,
}

pub(crate) struct ViewState<T> {
    entries: Vec<Entry<T>>,
    source_len: usize,
    filter: Option<FilterFn<T>>,
    comparer: CompositeComparator<T>,
    groups: GroupIndex<T>,
    current: Option<usize>,
    defer_depth: usize,
    needs_refresh: bool,
}

impl<T: Clone + PartialEq> ViewState<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            source_len: 0,
            filter: None,
            comparer: CompositeComparator::default(),
            groups: GroupIndex::default(),
            current: None,
            defer_depth: 0,
            needs_refresh: false,
        }
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|e| &e.item)
    }

    pub(crate) fn items(&self) -> Vec<T> {
        self.entries.iter().map(|e| e.item.clone()).collect()
    }

    pub(crate) fn index_of(&self, item: &T) -> Option<usize> {
        self.entries.iter().position(|e| e.item == *item)
    }

    pub(crate) fn comparer(&self) -> &CompositeComparator<T> {
        &self.comparer
    }

    pub(crate) fn groups(&self) -> &[CollectionGroup<T>] {
        self.groups.groups()
    }

    pub(crate) fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub(crate) fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    fn passes(&self, item: &T) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter(item))
    }

    // -------------------------------------------------------------------------
    // Rules
    // -------------------------------------------------------------------------

    /// Replaces the filter. The caller decides how the view catches up.
    pub(crate) fn set_filter(&mut self, filter: Option<FilterFn<T>>) {
        self.filter = filter;
    }

    pub(crate) fn set_group(&mut self, group: Option<GroupDescription<T>>) {
        self.comparer.set_group(group);
    }

    pub(crate) fn sorts_mut(&mut self) -> &mut Vec<SortDescription<T>> {
        self.comparer.sorts_mut()
    }

    // -------------------------------------------------------------------------
    // Deferral
    // -------------------------------------------------------------------------

    pub(crate) fn is_deferred(&self) -> bool {
        self.defer_depth > 0
    }

    pub(crate) fn begin_defer(&mut self) {
        self.defer_depth += 1;
    }

    /// Releases one level of deferral.
    ///
    /// Returns `true` when the outermost level was released and changes were
    /// recorded while suspended, in which case the caller must rebuild.
    pub(crate) fn end_defer(&mut self) -> bool {
        if self.defer_depth == 0 {
            tracing::warn!(target: targets::VIEW, "unbalanced defer release ignored");
            return false;
        }
        self.defer_depth -= 1;
        self.defer_depth == 0 && self.needs_refresh
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.needs_refresh = true;
    }

    // -------------------------------------------------------------------------
    // Current item
    // -------------------------------------------------------------------------

    pub(crate) fn current_position(&self) -> Option<usize> {
        self.current
    }

    pub(crate) fn current_item(&self) -> Option<&T> {
        self.current.and_then(|pos| self.get(pos))
    }

    /// Moves the cursor. Positions past the end are clamped to "none".
    pub(crate) fn set_current(&mut self, position: Option<usize>) {
        self.current = position.filter(|&pos| pos < self.entries.len());
    }

    pub(crate) fn cursor(&self) -> Cursor<T> {
        Cursor {
            position: self.current,
            item: self.current_item().cloned(),
        }
    }

    /// Queues property notifications for whatever changed since `before`.
    pub(crate) fn notify_cursor(&self, before: &Cursor<T>, out: &mut Vec<Notification<T>>) {
        let after = self.cursor();
        if after.item != before.item {
            out.push(Notification::Property(ViewProperty::CurrentItem));
        }
        if after.position != before.position {
            out.push(Notification::Property(ViewProperty::CurrentPosition));
        }
    }

    // -------------------------------------------------------------------------
    // Full rebuild
    // -------------------------------------------------------------------------

    /// Recomputes the whole view from a source snapshot.
    pub(crate) fn rebuild(&mut self, snapshot: Vec<T>, out: &mut Vec<Notification<T>>) {
        let _span = PerfSpan::new("rebuild");
        let previous = self.current_item().cloned();

        self.source_len = snapshot.len();
        let mut entries: Vec<Entry<T>> = snapshot
            .into_iter()
            .enumerate()
            .filter(|(_, item)| self.passes(item))
            .map(|(source_index, item)| Entry { item, source_index })
            .collect();
        if !self.comparer.is_unordered() {
            // Stable: ties keep source order.
            entries.sort_by(|a, b| self.comparer.compare(&a.item, &b.item));
        }
        self.entries = entries;

        match self.comparer.group() {
            Some(rule) => self.groups.rebuild(rule, self.entries.iter().map(|e| &e.item)),
            None => self.groups.clear(),
        }

        self.current = match previous {
            Some(item) => self.index_of(&item).or(self.first_position()),
            None => self.first_position(),
        };
        self.needs_refresh = false;

        tracing::debug!(
            target: targets::VIEW,
            source_len = self.source_len,
            view_len = self.entries.len(),
            group_count = self.groups.len(),
            "rebuilt view"
        );
        out.push(Notification::Collection(ViewChange::Reset));
    }

    fn first_position(&self) -> Option<usize> {
        if self.entries.is_empty() { None } else { Some(0) }
    }

    // -------------------------------------------------------------------------
    // Single-item operations
    // -------------------------------------------------------------------------

    /// View index at which an item from `source_index` belongs.
    fn position_for(&self, item: &T, source_index: usize) -> usize {
        self.entries
            .partition_point(|e| match self.comparer.compare(&e.item, item) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => e.source_index < source_index,
            })
    }

    fn find_source_index(&self, source_index: usize) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.source_index == source_index)
    }

    /// Shifts entries at or after `from` one source slot up.
    fn shift_up(&mut self, from: usize) {
        for entry in &mut self.entries {
            if entry.source_index >= from {
                entry.source_index += 1;
            }
        }
    }

    /// Shifts entries after the removed slot `removed` one source slot down.
    fn shift_down(&mut self, removed: usize) {
        for entry in &mut self.entries {
            if entry.source_index > removed {
                entry.source_index -= 1;
            }
        }
    }

    fn insert_entry(
        &mut self,
        item: T,
        source_index: usize,
        out: &mut Vec<Notification<T>>,
    ) -> usize {
        let index = self.position_for(&item, source_index);
        self.entries.insert(
            index,
            Entry {
                item: item.clone(),
                source_index,
            },
        );
        if let Some(rule) = self.comparer.group() {
            self.groups.insert(rule, item.clone(), index);
        }
        if let Some(current) = self.current.as_mut()
            && *current >= index
        {
            *current += 1;
        }

        tracing::trace!(target: targets::VIEW, index, source_index, "inserted item");
        out.push(Notification::Collection(ViewChange::Inserted { index, item }));
        index
    }

    fn remove_entry_at(&mut self, index: usize, out: &mut Vec<Notification<T>>) -> T {
        let Entry { item, source_index } = self.entries.remove(index);
        if let Some(rule) = self.comparer.group()
            && !self.groups.remove(rule, &item, index)
        {
            tracing::warn!(target: targets::VIEW, index, "removed item missing from its group");
        }
        self.current = match self.current {
            Some(current) if current == index => self.first_position(),
            Some(current) if current > index => Some(current - 1),
            other => other,
        };

        tracing::trace!(target: targets::VIEW, index, source_index, "removed item");
        out.push(Notification::Collection(ViewChange::Removed {
            index,
            item: item.clone(),
        }));
        item
    }

    fn source_added(&mut self, index: usize, item: T, out: &mut Vec<Notification<T>>) {
        self.shift_up(index);
        self.source_len += 1;
        if self.passes(&item) {
            self.insert_entry(item, index, out);
        }
    }

    fn source_removed(&mut self, index: usize, out: &mut Vec<Notification<T>>) {
        if let Some(view_index) = self.find_source_index(index) {
            self.remove_entry_at(view_index, out);
        }
        self.shift_down(index);
        self.source_len -= 1;
    }

    fn source_replaced(&mut self, index: usize, item: T, out: &mut Vec<Notification<T>>) {
        if let Some(view_index) = self.find_source_index(index) {
            self.remove_entry_at(view_index, out);
        }
        if self.passes(&item) {
            self.insert_entry(item, index, out);
        }
    }

    fn source_moved(
        &mut self,
        old_index: usize,
        new_index: usize,
        item: T,
        out: &mut Vec<Notification<T>>,
    ) {
        let view_index = self.find_source_index(old_index);
        let was_current = view_index.is_some() && view_index == self.current;

        if let Some(view_index) = view_index {
            self.remove_entry_at(view_index, out);
        }
        self.shift_down(old_index);
        self.shift_up(new_index);

        if self.passes(&item) {
            let index = self.insert_entry(item, new_index, out);
            if was_current {
                self.current = Some(index);
            }
        }
    }

    /// Applies a source change.
    ///
    /// Single-item changes are applied incrementally; anything else, or a
    /// change whose indices do not fit the tracked source, rebuilds from
    /// `snapshot`.
    pub(crate) fn apply_change<F>(
        &mut self,
        change: &SourceChange<T>,
        snapshot: F,
        out: &mut Vec<Notification<T>>,
    ) where
        F: FnOnce() -> Vec<T>,
    {
        if self.is_deferred() {
            self.needs_refresh = true;
            return;
        }
        if !change.is_single() {
            tracing::debug!(
                target: targets::VIEW,
                kind = change.kind(),
                "change not incremental, rebuilding"
            );
            self.rebuild(snapshot(), out);
            return;
        }

        let len = self.source_len;
        match change {
            SourceChange::Added { index, items } if *index <= len => {
                self.source_added(*index, items[0].clone(), out);
            }
            SourceChange::Removed { index, .. } if *index < len => {
                self.source_removed(*index, out);
            }
            SourceChange::Replaced { index, new, .. } if *index < len => {
                self.source_replaced(*index, new[0].clone(), out);
            }
            SourceChange::Moved {
                old_index,
                new_index,
                items,
            } if *old_index < len && *new_index < len => {
                self.source_moved(*old_index, *new_index, items[0].clone(), out);
            }
            _ => {
                tracing::warn!(
                    target: targets::VIEW,
                    kind = change.kind(),
                    source_len = len,
                    "change out of range, rebuilding"
                );
                self.rebuild(snapshot(), out);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Filter re-evaluation
    // -------------------------------------------------------------------------

    /// Re-tests the current filter without a rebuild: removes entries that
    /// now fail, then admits source items that now pass, in source order.
    pub(crate) fn refilter(&mut self, snapshot: &[T], out: &mut Vec<Notification<T>>) {
        if snapshot.len() != self.source_len {
            tracing::warn!(
                target: targets::VIEW,
                snapshot_len = snapshot.len(),
                source_len = self.source_len,
                "source out of sync, rebuilding"
            );
            self.rebuild(snapshot.to_vec(), out);
            return;
        }

        let mut index = 0;
        while index < self.entries.len() {
            if self.passes(&self.entries[index].item) {
                index += 1;
            } else {
                self.remove_entry_at(index, out);
            }
        }

        let mut present = vec![false; snapshot.len()];
        for entry in &self.entries {
            present[entry.source_index] = true;
        }
        for (source_index, item) in snapshot.iter().enumerate() {
            if !present[source_index] && self.passes(item) {
                self.insert_entry(item.clone(), source_index, out);
            }
        }
    }
}
