//! Sort and group rules.
//!
//! A [`SortDescription`] is an immutable rule made of a key extractor, a key
//! comparator and a [`SortDirection`]. Group descriptions have exactly the same
//! shape; the view applies the group rule ahead of every sort rule.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::key::Key;

/// Type alias for a key extraction function.
pub type KeyFn<T> = Arc<dyn Fn(&T) -> Key + Send + Sync>;

/// Type alias for a key comparison function.
pub type KeyCompareFn = Arc<dyn Fn(&Key, &Key) -> Ordering + Send + Sync>;

/// Direction in which a rule orders keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Smallest key first.
    #[default]
    Ascending,
    /// Largest key first.
    Descending,
}

impl SortDirection {
    /// Applies this direction to a comparison result.
    #[inline]
    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }

    /// Returns the opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// An immutable ordering rule over items of type `T`.
///
/// Cloning a description is cheap; clones share the same extractor and
/// comparator and are considered the same rule by [`same_rule`](Self::same_rule).
///
/// # Example
///
/// ```
/// use horizon_view::model::{Key, SortDescription, SortDirection};
/// use std::cmp::Ordering;
///
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// let by_age = SortDescription::descending(|p: &Person| Key::from(p.age)).named("age");
///
/// let alice = Person { name: "Alice".into(), age: 30 };
/// let bob = Person { name: "Bob".into(), age: 25 };
/// assert_eq!(by_age.compare_items(&alice, &bob), Ordering::Less);
/// assert_eq!(by_age.direction(), SortDirection::Descending);
/// ```
pub struct SortDescription<T> {
    name: Option<Arc<str>>,
    key_of: KeyFn<T>,
    compare: KeyCompareFn,
    direction: SortDirection,
}

/// A grouping rule.
///
/// Groups are ordered by their key using the rule's comparator and direction,
/// and the group rule takes precedence over every sort description.
pub type GroupDescription<T> = SortDescription<T>;

impl<T> SortDescription<T> {
    /// Creates a rule comparing extracted keys with [`Key::compare`].
    pub fn new<K>(key_of: K, direction: SortDirection) -> Self
    where
        K: Fn(&T) -> Key + Send + Sync + 'static,
    {
        Self::with_comparer(key_of, |a: &Key, b: &Key| a.compare(b), direction)
    }

    /// Creates a rule with a custom key comparator.
    pub fn with_comparer<K, C>(key_of: K, compare: C, direction: SortDirection) -> Self
    where
        K: Fn(&T) -> Key + Send + Sync + 'static,
        C: Fn(&Key, &Key) -> Ordering + Send + Sync + 'static,
    {
        Self {
            name: None,
            key_of: Arc::new(key_of),
            compare: Arc::new(compare),
            direction,
        }
    }

    /// Creates an ascending rule using the default key order.
    pub fn ascending<K>(key_of: K) -> Self
    where
        K: Fn(&T) -> Key + Send + Sync + 'static,
    {
        Self::new(key_of, SortDirection::Ascending)
    }

    /// Creates a descending rule using the default key order.
    pub fn descending<K>(key_of: K) -> Self
    where
        K: Fn(&T) -> Key + Send + Sync + 'static,
    {
        Self::new(key_of, SortDirection::Descending)
    }

    /// Attaches a descriptive name (used in logs and `Debug` output).
    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns a copy of this rule with the given direction.
    pub fn with_direction(&self, direction: SortDirection) -> Self {
        Self {
            direction,
            ..self.clone()
        }
    }

    /// Returns the rule's name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the rule's direction.
    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Extracts the key of an item.
    pub fn key_of(&self, item: &T) -> Key {
        (self.key_of)(item)
    }

    /// Compares two keys, applying the rule's direction.
    pub fn compare_keys(&self, a: &Key, b: &Key) -> Ordering {
        self.direction.apply((self.compare)(a, b))
    }

    /// Compares two items by their extracted keys, applying the rule's direction.
    pub fn compare_items(&self, a: &T, b: &T) -> Ordering {
        self.compare_keys(&self.key_of(a), &self.key_of(b))
    }

    /// Returns `true` if both descriptions are the same rule: they share the
    /// same extractor and comparator and have the same direction.
    pub fn same_rule(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.key_of, &other.key_of)
            && Arc::ptr_eq(&self.compare, &other.compare)
            && self.direction == other.direction
    }
}

impl<T> Clone for SortDescription<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            key_of: self.key_of.clone(),
            compare: self.compare.clone(),
            direction: self.direction,
        }
    }
}

impl<T> fmt::Debug for SortDescription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortDescription")
            .field("name", &self.name)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}
