//! Tests for collection view maintenance through the public API.

use std::sync::Arc;

use horizon_view::prelude::*;
use horizon_view::model::FilterFn;
use parking_lot::Mutex;

fn by_value() -> SortDescription<i32> {
    SortDescription::ascending(|n: &i32| Key::from(*n))
}

fn parity(direction: SortDirection) -> SortDescription<i32> {
    SortDescription::new(
        |n: &i32| Key::from(if n % 2 == 0 { "even" } else { "odd" }),
        direction,
    )
}

fn record<T: Clone + PartialEq + Send + Sync + 'static>(
    view: &CollectionView<T>,
) -> Arc<Mutex<Vec<ViewChange<T>>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let log_clone = log.clone();
    view.signals()
        .collection_changed
        .connect(move |change| log_clone.lock().push(change.clone()));
    log
}

fn record_properties<T: Clone + PartialEq + Send + Sync + 'static>(
    view: &CollectionView<T>,
) -> Arc<Mutex<Vec<ViewProperty>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let log_clone = log.clone();
    view.signals()
        .property_changed
        .connect(move |property| log_clone.lock().push(*property));
    log
}

#[test]
fn test_insert_then_narrowing_filter() {
    let source = Arc::new(ObservableList::from_vec(vec![3, 1, 2]));
    let view = CollectionView::new(source.clone());
    view.add_sort_description(by_value());
    assert_eq!(view.items(), vec![1, 2, 3]);

    let log = record(&view);
    source.insert(0, 0);
    assert_eq!(view.items(), vec![0, 1, 2, 3]);
    assert_eq!(*log.lock(), vec![ViewChange::Inserted { index: 0, item: 0 }]);

    log.lock().clear();
    view.set_filter(|n: &i32| *n > 1);
    assert_eq!(view.items(), vec![2, 3]);
    assert_eq!(
        *log.lock(),
        vec![
            ViewChange::Removed { index: 0, item: 0 },
            ViewChange::Removed { index: 0, item: 1 },
        ]
    );
}

#[test]
fn test_parity_groups_ascending() {
    let source = Arc::new(ObservableList::from_vec(vec![1, 2, 3, 4]));
    let view = CollectionView::builder(source)
        .group(parity(SortDirection::Ascending))
        .build();

    let groups = view.groups();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].key().as_str(), Some("even"));
    assert_eq!(groups[0].items(), &[2, 4]);
    assert_eq!(groups[1].key().as_str(), Some("odd"));
    assert_eq!(groups[1].items(), &[1, 3]);
    assert_eq!(view.items(), vec![2, 4, 1, 3]);
}

#[test]
fn test_parity_groups_descending() {
    let source = Arc::new(ObservableList::from_vec(vec![1, 2, 3, 4]));
    let view = CollectionView::builder(source)
        .group(parity(SortDirection::Descending))
        .build();

    let keys: Vec<_> = view
        .groups()
        .iter()
        .map(|g| g.key().to_string())
        .collect();
    assert_eq!(keys, vec!["odd", "even"]);
    assert_eq!(view.groups()[0].items(), &[1, 3]);
    assert_eq!(view.items(), vec![1, 3, 2, 4]);
}

#[test]
fn test_groups_track_source_mutations() {
    let source = Arc::new(ObservableList::from_vec(vec![1, 3]));
    let view = CollectionView::builder(source.clone())
        .group(parity(SortDirection::Ascending))
        .sort(by_value())
        .build();
    assert_eq!(view.group_count(), 1);

    source.push(4);
    source.push(2);
    let groups: Vec<Vec<i32>> = view.groups().into_iter().map(|g| g.into_items()).collect();
    assert_eq!(groups, vec![vec![2, 4], vec![1, 3]]);

    source.remove(0);
    source.remove(0);
    let groups: Vec<Vec<i32>> = view.groups().into_iter().map(|g| g.into_items()).collect();
    assert_eq!(groups, vec![vec![2, 4]]);
}

#[test]
fn test_change_feed_replays_view() {
    let source = Arc::new(ObservableList::from_vec(vec![5, 9, 1, 7]));
    let view = CollectionView::builder(source.clone())
        .filter(|n: &i32| n % 3 != 0)
        .sort(SortDescription::descending(|n: &i32| Key::from(*n)))
        .build();

    let replica = Arc::new(Mutex::new(view.items()));
    let replica_clone = replica.clone();
    view.signals().collection_changed.connect(move |change| {
        assert!(change.apply_to(&mut replica_clone.lock()), "unexpected reset");
    });

    source.push(4);
    source.insert(1, 6);
    source.remove(0);
    source.replace(2, 10);
    source.move_item(0, 3);
    source.push(3);
    source.remove(source.len() - 1);

    assert_eq!(*replica.lock(), view.items());
    assert_eq!(view.items(), vec![10, 7, 4]);
}

#[test]
fn test_slot_editing_source_keeps_feed_ordered() {
    let source = Arc::new(ObservableList::from_vec(vec![0, 1, 2, 3]));
    let view = CollectionView::builder(source.clone()).sort(by_value()).build();

    let replica = Arc::new(Mutex::new(view.items()));
    let replica_clone = replica.clone();
    view.signals().collection_changed.connect(move |change| {
        assert!(change.apply_to(&mut replica_clone.lock()), "unexpected reset");
    });
    let log = record(&view);

    let pushed = Arc::new(Mutex::new(false));
    let source_clone = source.clone();
    view.signals().collection_changed.connect(move |_| {
        let mut pushed = pushed.lock();
        if !*pushed {
            *pushed = true;
            drop(pushed);
            source_clone.push(100);
        }
    });

    view.set_filter(|n: &i32| *n > 1);

    assert_eq!(view.items(), vec![2, 3, 100]);
    assert_eq!(*replica.lock(), view.items());
    assert_eq!(
        *log.lock(),
        vec![
            ViewChange::Removed { index: 0, item: 0 },
            ViewChange::Removed { index: 0, item: 1 },
            ViewChange::Inserted { index: 2, item: 100 },
        ]
    );
}

#[test]
fn test_multi_item_change_resets() {
    let source = Arc::new(ObservableList::from_vec(vec![2]));
    let view = CollectionView::new(source.clone());
    view.add_sort_description(by_value());
    let log = record(&view);

    source.extend(vec![3, 1]);
    assert_eq!(view.items(), vec![1, 2, 3]);
    assert_eq!(*log.lock(), vec![ViewChange::Reset]);

    source.clear();
    assert!(view.is_empty());
    assert_eq!(log.lock().len(), 2);
}

#[test]
fn test_deferral_emits_single_reset() {
    let source = Arc::new(ObservableList::from_vec(vec![4, 8, 15, 16]));
    let view = CollectionView::new(source.clone());
    let log = record(&view);

    {
        let _outer = view.defer_refresh();
        {
            let _inner = view.defer_refresh();
            source.push(23);
            source.remove(0);
            view.add_sort_description(SortDescription::descending(|n: &i32| Key::from(*n)));
            view.set_filter(|n: &i32| *n > 10);
            assert!(view.is_refresh_deferred());
        }
        source.push(42);
        assert!(view.is_refresh_deferred());
        assert_eq!(view.items(), vec![4, 8, 15, 16]);
        assert!(log.lock().is_empty());
    }

    assert!(!view.is_refresh_deferred());
    assert_eq!(*log.lock(), vec![ViewChange::Reset]);
    assert_eq!(view.items(), vec![42, 23, 16, 15]);
}

#[test]
fn test_clean_deferral_does_not_rebuild() {
    let source = Arc::new(ObservableList::from_vec(vec![1, 2]));
    let view = CollectionView::new(source);
    let log = record(&view);

    drop(view.defer_refresh());
    assert!(log.lock().is_empty());
}

#[test]
fn test_deferred_factory_builds_once() {
    let source = Arc::new(ObservableList::from_vec(vec![3, 1, 2]));
    let (view, guard) = CollectionView::deferred(source.clone());
    let log = record(&view);

    assert!(view.is_empty());
    view.add_sort_description(by_value());
    view.set_group_description(Some(parity(SortDirection::Ascending)));
    source.push(4);
    assert!(log.lock().is_empty());

    drop(guard);
    assert_eq!(*log.lock(), vec![ViewChange::Reset]);
    assert_eq!(view.items(), vec![2, 4, 1, 3]);
}

#[test]
fn test_guard_outlives_view() {
    let source = Arc::new(ObservableList::from_vec(vec![1]));
    let view = CollectionView::new(source.clone());
    let guard = view.defer_refresh();
    source.push(2);

    drop(view);
    assert_eq!(source.changes().connection_count(), 0);
    drop(guard);
}

#[test]
fn test_current_item_survives_rebuild() {
    let source = Arc::new(ObservableList::from_vec(vec![10, 30, 20]));
    let view = CollectionView::new(source.clone());
    assert!(view.move_current_to(&30));
    assert_eq!(view.current_position(), Some(1));

    let props = record_properties(&view);
    view.add_sort_description(by_value());
    assert_eq!(view.current_item(), Some(30));
    assert_eq!(view.current_position(), Some(2));
    assert!(props.lock().contains(&ViewProperty::CurrentPosition));
    assert!(!props.lock().contains(&ViewProperty::CurrentItem));

    source.set_items(vec![30, 5]);
    assert_eq!(view.current_item(), Some(30));
    assert_eq!(view.current_position(), Some(1));

    // Current item gone: fall back to the first item.
    source.set_items(vec![7, 6]);
    assert_eq!(view.current_item(), Some(6));
    assert_eq!(view.current_position(), Some(0));

    source.clear();
    assert_eq!(view.current_item(), None);
    assert_eq!(view.current_position(), None);
}

#[test]
fn test_current_follows_source_move() {
    let source = Arc::new(ObservableList::from_vec(vec!["a", "b", "c"]));
    let view = CollectionView::new(source.clone());
    assert!(view.move_current_to(&"a"));

    source.move_item(0, 2);
    assert_eq!(view.items(), vec!["b", "c", "a"]);
    assert_eq!(view.current_item(), Some("a"));
    assert_eq!(view.current_position(), Some(2));
}

#[test]
fn test_property_notifications() {
    let source = Arc::new(ObservableList::from_vec(vec![1, 2, 3]));
    let view = CollectionView::new(source);
    let props = record_properties(&view);

    view.set_filter(|n: &i32| *n > 0);
    view.set_group_description(Some(parity(SortDirection::Ascending)));
    view.set_source(Arc::new(ObservableList::from_vec(vec![9])));
    view.set_group_description(None);

    let props: Vec<_> = props
        .lock()
        .iter()
        .copied()
        .filter(|p| !matches!(p, ViewProperty::CurrentItem | ViewProperty::CurrentPosition))
        .collect();
    assert_eq!(
        props,
        vec![
            ViewProperty::Filter,
            ViewProperty::GroupDescription,
            ViewProperty::IsGrouped,
            ViewProperty::Source,
            ViewProperty::GroupDescription,
            ViewProperty::IsGrouped,
        ]
    );
}

#[test]
fn test_dispose_unsubscribes() {
    let source = Arc::new(ObservableList::from_vec(vec![1, 2]));
    let view = CollectionView::new(source.clone());
    let log = record(&view);
    assert_eq!(source.changes().connection_count(), 1);

    view.dispose();
    assert!(view.is_disposed());
    assert_eq!(source.changes().connection_count(), 0);
    assert_eq!(view.signals().collection_changed.connection_count(), 0);

    source.push(3);
    assert_eq!(view.items(), vec![1, 2]);
    assert!(log.lock().is_empty());
}

#[test]
fn test_view_as_comparator() {
    let source = Arc::new(ObservableList::from_vec(vec![5, 2, 8, 1]));
    let view = CollectionView::builder(source)
        .group(parity(SortDirection::Ascending))
        .sort(SortDescription::descending(|n: &i32| Key::from(*n)))
        .build();

    let mut sorted = vec![5, 2, 8, 1];
    sorted.sort_by(|a, b| view.compare(a, b));
    assert_eq!(sorted, view.items());
    assert_eq!(sorted, vec![8, 2, 5, 1]);
}

/// A source that loads its items in pages.
struct PagedSource {
    loaded: ObservableList<i32>,
    pages: Mutex<Vec<Vec<i32>>>,
}

impl ItemSource<i32> for PagedSource {
    fn len(&self) -> usize {
        self.loaded.len()
    }

    fn snapshot(&self) -> Vec<i32> {
        self.loaded.snapshot()
    }

    fn changes(&self) -> Option<&Signal<SourceChange<i32>>> {
        Some(self.loaded.changes())
    }

    fn can_fetch_more(&self) -> bool {
        !self.pages.lock().is_empty()
    }

    fn fetch_more(&self) {
        let page = self.pages.lock().pop();
        for item in page.into_iter().flatten() {
            self.loaded.push(item);
        }
    }
}

#[test]
fn test_fetch_more_passes_through() {
    let source = Arc::new(PagedSource {
        loaded: ObservableList::from_vec(vec![1, 2]),
        pages: Mutex::new(vec![vec![6], vec![4, 3]]),
    });
    let view = CollectionView::new(source.clone());
    view.add_sort_description(by_value());
    let log = record(&view);

    assert!(view.can_fetch_more());
    view.fetch_more();
    assert_eq!(view.items(), vec![1, 2, 3, 4]);
    view.fetch_more();
    assert_eq!(view.items(), vec![1, 2, 3, 4, 6]);
    assert!(!view.can_fetch_more());
    view.fetch_more();

    assert_eq!(log.lock().len(), 3);
    assert!(log.lock().iter().all(|c| matches!(c, ViewChange::Inserted { .. })));
}

#[test]
fn test_snapshot_source_ignores_fetch() {
    let view = CollectionView::new(Arc::new(vec![1, 2, 3]));
    assert!(!view.can_fetch_more());
    view.fetch_more();
    assert_eq!(view.len(), 3);
}

#[test]
fn test_filter_type_alias_is_shareable() {
    let even: FilterFn<i32> = Arc::new(|n: &i32| n % 2 == 0);
    let source = Arc::new(ObservableList::from_vec(vec![1, 2, 3, 4]));
    let view = CollectionView::new(source);

    let shared = even.clone();
    view.set_filter(move |n| shared(n));
    assert_eq!(view.items(), vec![2, 4]);
    assert!(even(&8));
}
