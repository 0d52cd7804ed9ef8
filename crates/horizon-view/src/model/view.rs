//! Collection view: a live filtered, sorted and grouped projection of a source.
//!
//! [`CollectionView`] subscribes to an observable source and keeps its view
//! consistent with every change, translating single-item source changes into
//! single-item view changes. Rule edits (filter, sort descriptions, group
//! description) rebuild the view, except filter changes on an observable
//! source, which are re-evaluated in place.
//!
//! All notifications are queued while the view's state is locked and emitted
//! after it is released, in the order the view changed.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use horizon_view_core::logging::targets;
use parking_lot::{Mutex, RwLock};

use super::comparator::CompositeComparator;
use super::defer::DeferGuard;
use super::error::{Result, ViewError};
use super::group::CollectionGroup;
use super::signals::{Notification, NotificationQueue, ViewProperty, ViewSignals};
use super::sort::{GroupDescription, SortDescription};
use super::source::{ItemSource, SourceChange, SourceSubscription};
use super::state::{FilterFn, ViewState};

/// Bounds shared by every item type a collection view can hold.
///
/// Items are compared with `PartialEq` to locate them in the view (current
/// item restoration, [`CollectionView::index_of`]).
pub trait ViewItem: Clone + PartialEq + Send + Sync + 'static {}

impl<T: Clone + PartialEq + Send + Sync + 'static> ViewItem for T {}

/// Shared internals of a view, also held by its defer guards.
pub(crate) struct ViewCore<T: ViewItem> {
    state: Mutex<ViewState<T>>,
    source: RwLock<Arc<dyn ItemSource<T>>>,
    subscription: Mutex<Option<SourceSubscription<T>>>,
    signals: ViewSignals<T>,
    notifications: NotificationQueue<T>,
    disposed: AtomicBool,
}

impl<T: ViewItem> ViewCore<T> {
    fn new(source: Arc<dyn ItemSource<T>>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ViewState::new()),
            source: RwLock::new(source),
            subscription: Mutex::new(None),
            signals: ViewSignals::new(),
            notifications: NotificationQueue::new(),
            disposed: AtomicBool::new(false),
        })
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn source(&self) -> Arc<dyn ItemSource<T>> {
        self.source.read().clone()
    }

    fn snapshot(&self) -> Vec<T> {
        self.source().snapshot()
    }

    fn is_observable(&self) -> bool {
        self.source.read().changes().is_some()
    }

    /// Subscribes to the current source, replacing any previous subscription.
    fn attach(self: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let subscription = SourceSubscription::attach(self.source(), move |change| {
            if let Some(core) = weak.upgrade() {
                core.on_source_change(change);
            }
        });
        if subscription.is_none() {
            tracing::debug!(target: targets::SOURCE, "source is not observable");
        }
        let previous = std::mem::replace(&mut *self.subscription.lock(), subscription);
        drop(previous);
    }

    fn detach(&self) {
        let previous = self.subscription.lock().take();
        drop(previous);
    }

    /// Runs `f` on the locked state and queues its notifications (including
    /// cursor changes) before the lock is released, then delivers them.
    ///
    /// A slot that mutates the view during delivery queues its batch behind
    /// the current one; the outermost `update` delivers both.
    fn update<R>(&self, f: impl FnOnce(&mut ViewState<T>, &mut Vec<Notification<T>>) -> R) -> R {
        let result = {
            let mut state = self.state.lock();
            let mut out = Vec::new();
            let before = state.cursor();
            let result = f(&mut *state, &mut out);
            state.notify_cursor(&before, &mut out);
            self.notifications.enqueue(out);
            result
        };
        self.notifications.drain(&self.signals);
        result
    }

    /// Rebuilds now, or records the need to when deferred.
    fn refresh_or_defer(&self, state: &mut ViewState<T>, out: &mut Vec<Notification<T>>) {
        if state.is_deferred() {
            state.mark_dirty();
        } else {
            state.rebuild(self.snapshot(), out);
        }
    }

    fn on_source_change(&self, change: &SourceChange<T>) {
        if self.is_disposed() {
            return;
        }
        tracing::trace!(target: targets::SOURCE, kind = change.kind(), "source changed");
        self.update(|state, out| state.apply_change(change, || self.snapshot(), out));
    }

    pub(crate) fn begin_defer(&self) {
        self.state.lock().begin_defer();
    }

    pub(crate) fn end_defer(&self) {
        self.update(|state, out| {
            if state.end_defer() {
                if self.is_disposed() {
                    tracing::debug!(
                        target: targets::VIEW,
                        "view disposed, skipping deferred rebuild"
                    );
                } else {
                    state.rebuild(self.snapshot(), out);
                }
            }
        });
    }
}

/// A live, filtered, sorted and optionally grouped view over an item source.
///
/// The view is ordered by its [`CompositeComparator`]: the group description
/// first, then each sort description in turn. Items tying under every rule
/// keep their source order.
///
/// # Example
///
/// ```
/// use horizon_view::model::{CollectionView, Key, ObservableList, SortDescription, ViewChange};
/// use std::sync::Arc;
///
/// let source = Arc::new(ObservableList::from_vec(vec![3, 1, 2]));
/// let view = CollectionView::new(source.clone());
/// view.add_sort_description(SortDescription::ascending(|n: &i32| Key::from(*n)));
/// assert_eq!(view.items(), vec![1, 2, 3]);
///
/// view.signals().collection_changed.connect(|change| {
///     if let ViewChange::Inserted { index, item } = change {
///         println!("{item} inserted at {index}");
///     }
/// });
///
/// source.insert(0, 0);
/// assert_eq!(view.items(), vec![0, 1, 2, 3]);
///
/// view.set_filter(|n: &i32| *n > 1);
/// assert_eq!(view.items(), vec![2, 3]);
/// ```
pub struct CollectionView<T: ViewItem> {
    core: Arc<ViewCore<T>>,
}

impl<T: ViewItem> CollectionView<T> {
    /// Creates a view over `source` with no filter, sort or grouping.
    pub fn new<S>(source: Arc<S>) -> Self
    where
        S: ItemSource<T> + 'static,
    {
        let core = ViewCore::new(source);
        core.attach();
        core.update(|state, out| core.refresh_or_defer(state, out));
        Self { core }
    }

    /// Creates a view that is already deferred.
    ///
    /// The view stays empty until the returned guard (and any other defer
    /// guard) is dropped, at which point it is built once with whatever
    /// rules were configured in the meantime.
    pub fn deferred<S>(source: Arc<S>) -> (Self, DeferGuard<T>)
    where
        S: ItemSource<T> + 'static,
    {
        Self::deferred_from(source)
    }

    fn deferred_from(source: Arc<dyn ItemSource<T>>) -> (Self, DeferGuard<T>) {
        let core = ViewCore::new(source);
        core.attach();
        let guard = DeferGuard::enter(core.clone());
        core.state.lock().mark_dirty();
        (Self { core }, guard)
    }

    /// Starts building a view over `source`.
    pub fn builder<S>(source: Arc<S>) -> CollectionViewBuilder<T>
    where
        S: ItemSource<T> + 'static,
    {
        CollectionViewBuilder::new(source)
    }

    /// Returns the view's signals.
    pub fn signals(&self) -> &ViewSignals<T> {
        &self.core.signals
    }

    // -------------------------------------------------------------------------
    // Source
    // -------------------------------------------------------------------------

    /// Returns the backing source.
    pub fn source(&self) -> Arc<dyn ItemSource<T>> {
        self.core.source()
    }

    /// Replaces the backing source and rebuilds.
    ///
    /// Setting the source the view already uses does nothing.
    pub fn set_source<S>(&self, source: Arc<S>)
    where
        S: ItemSource<T> + 'static,
    {
        let source: Arc<dyn ItemSource<T>> = source;
        if Arc::ptr_eq(&source, &self.core.source()) {
            return;
        }

        self.core.detach();
        *self.core.source.write() = source;
        if self.is_disposed() {
            tracing::debug!(
                target: targets::VIEW,
                "source replaced on disposed view, not subscribing"
            );
        } else {
            self.core.attach();
        }
        self.core.update(|state, out| {
            self.core.refresh_or_defer(state, out);
            out.push(Notification::Property(ViewProperty::Source));
        });
    }

    /// Returns `true` if more data can be fetched from the source.
    pub fn can_fetch_more(&self) -> bool {
        self.core.source().can_fetch_more()
    }

    /// Asks the source to fetch more data.
    ///
    /// Fetched items reach the view through the source's change signal.
    pub fn fetch_more(&self) {
        let source = self.core.source();
        if source.can_fetch_more() {
            source.fetch_more();
        }
    }

    // -------------------------------------------------------------------------
    // Filter
    // -------------------------------------------------------------------------

    /// Sets the filter predicate. Only items for which it returns `true` are
    /// part of the view.
    pub fn set_filter<F>(&self, filter: F)
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.apply_filter(Some(Arc::new(filter)));
    }

    /// Clears the filter, admitting every source item.
    pub fn clear_filter(&self) {
        self.apply_filter(None);
    }

    /// Returns `true` if a filter is set.
    pub fn has_filter(&self) -> bool {
        self.core.state.lock().has_filter()
    }

    fn apply_filter(&self, filter: Option<FilterFn<T>>) {
        let core = &self.core;
        core.update(|state, out| {
            if filter.is_none() && !state.has_filter() {
                return;
            }
            state.set_filter(filter);

            if state.is_deferred() {
                state.mark_dirty();
            } else if core.is_observable() {
                state.refilter(&core.snapshot(), out);
            } else {
                state.rebuild(core.snapshot(), out);
            }
            out.push(Notification::Property(ViewProperty::Filter));
        });
    }

    // -------------------------------------------------------------------------
    // Sort descriptions
    // -------------------------------------------------------------------------

    /// Returns the sort descriptions in precedence order.
    pub fn sort_descriptions(&self) -> Vec<SortDescription<T>> {
        self.core.state.lock().comparer().sorts().to_vec()
    }

    /// Appends a sort description with the lowest precedence.
    pub fn add_sort_description(&self, sort: SortDescription<T>) {
        let _ = self.edit_sorts(|sorts| {
            sorts.push(sort);
            Ok(())
        });
    }

    /// Inserts a sort description at `index`.
    pub fn insert_sort_description(&self, index: usize, sort: SortDescription<T>) -> Result<()> {
        self.edit_sorts(|sorts| {
            if index > sorts.len() {
                return Err(ViewError::sort_index(index, sorts.len()));
            }
            sorts.insert(index, sort);
            Ok(())
        })
    }

    /// Removes and returns the sort description at `index`.
    pub fn remove_sort_description(&self, index: usize) -> Result<SortDescription<T>> {
        self.edit_sorts(|sorts| {
            if index >= sorts.len() {
                return Err(ViewError::sort_index(index, sorts.len()));
            }
            Ok(sorts.remove(index))
        })
    }

    /// Replaces the sort description at `index`, returning the previous one.
    pub fn replace_sort_description(
        &self,
        index: usize,
        sort: SortDescription<T>,
    ) -> Result<SortDescription<T>> {
        self.edit_sorts(|sorts| match sorts.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, sort)),
            None => Err(ViewError::sort_index(index, sorts.len())),
        })
    }

    /// Replaces the whole sort list.
    pub fn set_sort_descriptions(&self, sorts: Vec<SortDescription<T>>) {
        let _ = self.edit_sorts(|current| {
            *current = sorts;
            Ok(())
        });
    }

    /// Removes every sort description.
    pub fn clear_sort_descriptions(&self) {
        let _ = self.edit_sorts(|sorts| {
            sorts.clear();
            Ok(())
        });
    }

    /// Applies a structural edit to the sort list. A successful edit notifies
    /// and re-sorts; a failed one leaves the view untouched.
    fn edit_sorts<R>(
        &self,
        edit: impl FnOnce(&mut Vec<SortDescription<T>>) -> Result<R>,
    ) -> Result<R> {
        let core = &self.core;
        core.update(|state, out| {
            let result = edit(state.sorts_mut())?;
            core.refresh_or_defer(state, out);
            out.push(Notification::Property(ViewProperty::SortDescriptions));
            Ok(result)
        })
    }

    // -------------------------------------------------------------------------
    // Grouping
    // -------------------------------------------------------------------------

    /// Returns the group description.
    pub fn group_description(&self) -> Option<GroupDescription<T>> {
        self.core.state.lock().comparer().group().cloned()
    }

    /// Sets or clears the group description and rebuilds.
    ///
    /// Setting the rule the view already uses does nothing.
    pub fn set_group_description(&self, group: Option<GroupDescription<T>>) {
        let core = &self.core;
        core.update(|state, out| {
            let was_grouped = state.comparer().group().is_some();
            let unchanged = match (state.comparer().group(), &group) {
                (Some(current), Some(new)) => current.same_rule(new),
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                return;
            }

            let is_grouped = group.is_some();
            state.set_group(group);
            core.refresh_or_defer(state, out);
            out.push(Notification::Property(ViewProperty::GroupDescription));
            if was_grouped != is_grouped {
                out.push(Notification::Property(ViewProperty::IsGrouped));
            }
        });
    }

    /// Returns `true` if a group description is set.
    pub fn is_grouped(&self) -> bool {
        self.core.state.lock().comparer().group().is_some()
    }

    /// Returns a copy of the groups, in group order.
    ///
    /// Empty when no group description is set.
    pub fn groups(&self) -> Vec<CollectionGroup<T>> {
        self.core.state.lock().groups().to_vec()
    }

    /// Returns the number of groups.
    pub fn group_count(&self) -> usize {
        self.core.state.lock().group_count()
    }

    // -------------------------------------------------------------------------
    // Refresh and deferral
    // -------------------------------------------------------------------------

    /// Rebuilds the view from the source.
    ///
    /// While deferred, the rebuild happens when the deferral ends.
    pub fn refresh(&self) {
        self.core.update(|state, out| self.core.refresh_or_defer(state, out));
    }

    /// Defers refresh until the returned guard is dropped.
    pub fn defer_refresh(&self) -> DeferGuard<T> {
        DeferGuard::enter(self.core.clone())
    }

    /// Returns `true` while at least one defer guard is alive.
    pub fn is_refresh_deferred(&self) -> bool {
        self.core.state.lock().is_deferred()
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    /// Returns the number of items in the view.
    pub fn len(&self) -> usize {
        self.core.state.lock().len()
    }

    /// Returns `true` if the view is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the item at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.core.state.lock().get(index).cloned()
    }

    /// Returns a copy of the view in order.
    pub fn items(&self) -> Vec<T> {
        self.core.state.lock().items()
    }

    /// Returns the view index of the first item equal to `item`.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.core.state.lock().index_of(item)
    }

    /// Returns `true` if the view holds an item equal to `item`.
    pub fn contains(&self, item: &T) -> bool {
        self.index_of(item).is_some()
    }

    // -------------------------------------------------------------------------
    // Comparator
    // -------------------------------------------------------------------------

    /// Compares two items with the view's current ordering.
    pub fn compare(&self, a: &T, b: &T) -> std::cmp::Ordering {
        self.core.state.lock().comparer().compare(a, b)
    }

    /// Returns a copy of the view's current comparator.
    ///
    /// The copy does not follow later rule edits.
    pub fn comparer(&self) -> CompositeComparator<T> {
        self.core.state.lock().comparer().clone()
    }

    // -------------------------------------------------------------------------
    // Current item
    // -------------------------------------------------------------------------

    /// Returns the current item.
    pub fn current_item(&self) -> Option<T> {
        self.core.state.lock().current_item().cloned()
    }

    /// Returns the position of the current item.
    pub fn current_position(&self) -> Option<usize> {
        self.core.state.lock().current_position()
    }

    /// Makes `item` current. Returns `false` if it is not in the view.
    pub fn move_current_to(&self, item: &T) -> bool {
        self.core.update(|state, _| match state.index_of(item) {
            Some(index) => {
                state.set_current(Some(index));
                true
            }
            None => false,
        })
    }

    /// Makes the item at `position` current.
    pub fn move_current_to_position(&self, position: usize) -> Result<()> {
        self.core.update(|state, _| {
            if position >= state.len() {
                return Err(ViewError::position(position, state.len()));
            }
            state.set_current(Some(position));
            Ok(())
        })
    }

    /// Makes the first item current. Returns `false` if the view is empty.
    pub fn move_current_to_first(&self) -> bool {
        self.core.update(|state, _| {
            if state.len() == 0 {
                return false;
            }
            state.set_current(Some(0));
            true
        })
    }

    /// Makes the last item current. Returns `false` if the view is empty.
    pub fn move_current_to_last(&self) -> bool {
        self.core.update(|state, _| match state.len().checked_sub(1) {
            Some(last) => {
                state.set_current(Some(last));
                true
            }
            None => false,
        })
    }

    /// Advances the cursor. With no current item, moves to the first one.
    ///
    /// Returns `false` if there is no next item.
    pub fn move_current_to_next(&self) -> bool {
        self.core.update(|state, _| {
            let next = state.current_position().map_or(0, |pos| pos + 1);
            if next >= state.len() {
                return false;
            }
            state.set_current(Some(next));
            true
        })
    }

    /// Moves the cursor back. Returns `false` if there is no previous item.
    pub fn move_current_to_previous(&self) -> bool {
        self.core.update(|state, _| match state.current_position() {
            Some(pos) if pos > 0 => {
                state.set_current(Some(pos - 1));
                true
            }
            _ => false,
        })
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Detaches the view from its source and disconnects its own signals.
    ///
    /// Disposal is terminal and idempotent. The view keeps its last contents
    /// but no longer follows the source.
    pub fn dispose(&self) {
        if self.core.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.core.detach();
        self.core.signals.disconnect_all();
        tracing::debug!(target: targets::VIEW, "disposed view");
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }
}

impl<T: ViewItem> Drop for CollectionView<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<T: ViewItem + fmt::Debug> fmt::Debug for CollectionView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.core.state.lock();
        f.debug_struct("CollectionView")
            .field("items", &state.items())
            .field("comparer", state.comparer())
            .field("has_filter", &state.has_filter())
            .field("current_position", &state.current_position())
            .field("deferred", &state.is_deferred())
            .finish_non_exhaustive()
    }
}

/// Builder pattern for creating collection views.
///
/// The view is built exactly once, with every configured rule applied.
pub struct CollectionViewBuilder<T: ViewItem> {
    source: Arc<dyn ItemSource<T>>,
    filter: Option<FilterFn<T>>,
    sorts: Vec<SortDescription<T>>,
    group: Option<GroupDescription<T>>,
}

impl<T: ViewItem> CollectionViewBuilder<T> {
    /// Creates a new builder with the given source.
    pub fn new<S>(source: Arc<S>) -> Self
    where
        S: ItemSource<T> + 'static,
    {
        let source: Arc<dyn ItemSource<T>> = source;
        Self {
            source,
            filter: None,
            sorts: Vec::new(),
            group: None,
        }
    }

    /// Sets the filter predicate.
    pub fn filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(f));
        self
    }

    /// Appends a sort description.
    pub fn sort(mut self, sort: SortDescription<T>) -> Self {
        self.sorts.push(sort);
        self
    }

    /// Sets the group description.
    pub fn group(mut self, group: GroupDescription<T>) -> Self {
        self.group = Some(group);
        self
    }

    /// Builds the view.
    pub fn build(self) -> CollectionView<T> {
        let (view, guard) = CollectionView::deferred_from(self.source);
        {
            let mut state = view.core.state.lock();
            state.set_filter(self.filter);
            *state.sorts_mut() = self.sorts;
            state.set_group(self.group);
        }
        drop(guard);
        view
    }
}

impl<T: ViewItem> fmt::Debug for CollectionViewBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionViewBuilder")
            .field("has_filter", &self.filter.is_some())
            .field("sorts", &self.sorts)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}


static_assertions::assert_impl_all!(CollectionView<String>: Send, Sync);
