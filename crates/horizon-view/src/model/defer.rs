//! Scoped suspension of view maintenance.

use std::fmt;
use std::sync::Arc;

use super::view::{ViewCore, ViewItem};

/// Keeps a collection view's refresh deferred while alive.
///
/// Guards nest: the view stays deferred until every guard is dropped. While
/// deferred, source changes, rule edits and refresh requests are only
/// recorded. Dropping the last guard runs a single rebuild if anything was
/// recorded, and nothing otherwise.
///
/// The guard keeps the view's internals alive, so it may outlive the
/// [`CollectionView`](super::CollectionView) that created it.
///
/// # Example
///
/// ```
/// use horizon_view::model::{CollectionView, Key, ObservableList, SortDescription};
/// use std::sync::Arc;
///
/// let source = Arc::new(ObservableList::from_vec(vec![3, 1, 2]));
/// let view = CollectionView::new(source.clone());
///
/// {
///     let _guard = view.defer_refresh();
///     view.add_sort_description(SortDescription::ascending(|n: &i32| Key::from(*n)));
///     source.push(0);
///     // Nothing applied yet.
///     assert_eq!(view.items(), vec![3, 1, 2]);
/// }
///
/// assert_eq!(view.items(), vec![0, 1, 2, 3]);
/// ```
#[must_use = "the view is only deferred while the guard is alive"]
pub struct DeferGuard<T: ViewItem> {
    core: Arc<ViewCore<T>>,
}

impl<T: ViewItem> DeferGuard<T> {
    /// Enters one level of deferral on `core`.
    pub(crate) fn enter(core: Arc<ViewCore<T>>) -> Self {
        core.begin_defer();
        Self { core }
    }
}

impl<T: ViewItem> Drop for DeferGuard<T> {
    fn drop(&mut self) {
        self.core.end_defer();
    }
}

impl<T: ViewItem> fmt::Debug for DeferGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferGuard").finish_non_exhaustive()
    }
}
