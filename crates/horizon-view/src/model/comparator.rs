//! The composite comparator: group rule first, then the sort chain.

use std::cmp::Ordering;
use std::fmt;

use super::sort::{GroupDescription, SortDescription};

/// Combines an optional group rule with an ordered chain of sort rules into a
/// single order over items.
///
/// Comparison extracts and compares the group keys first; a non-equal result
/// wins outright. Otherwise each sort description is consulted in declared
/// order and the first non-equal result wins. Items tying under every rule
/// compare `Equal`.
///
/// # Example
///
/// ```
/// use horizon_view::model::{CompositeComparator, Key, SortDescription};
/// use std::cmp::Ordering;
///
/// let cmp = CompositeComparator::new(
///     Some(SortDescription::ascending(|n: &i32| Key::from(n % 2))),
///     vec![SortDescription::descending(|n: &i32| Key::from(*n))],
/// );
///
/// // Even numbers first, larger first inside each parity.
/// assert_eq!(cmp.compare(&4, &2), Ordering::Less);
/// assert_eq!(cmp.compare(&9, &2), Ordering::Greater);
/// ```
pub struct CompositeComparator<T> {
    group: Option<GroupDescription<T>>,
    sorts: Vec<SortDescription<T>>,
}

impl<T> CompositeComparator<T> {
    /// Creates a comparator from a group rule and a sort chain.
    pub fn new(group: Option<GroupDescription<T>>, sorts: Vec<SortDescription<T>>) -> Self {
        Self { group, sorts }
    }

    /// Returns the group rule.
    pub fn group(&self) -> Option<&GroupDescription<T>> {
        self.group.as_ref()
    }

    /// Returns the sort chain in precedence order.
    pub fn sorts(&self) -> &[SortDescription<T>] {
        &self.sorts
    }

    /// Returns `true` if neither a group rule nor any sort rule is set, in
    /// which case every pair of items compares `Equal`.
    pub fn is_unordered(&self) -> bool {
        self.group.is_none() && self.sorts.is_empty()
    }

    pub(crate) fn set_group(&mut self, group: Option<GroupDescription<T>>) {
        self.group = group;
    }

    pub(crate) fn sorts_mut(&mut self) -> &mut Vec<SortDescription<T>> {
        &mut self.sorts
    }

    /// Compares two items.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        if let Some(group) = &self.group {
            let ord = group.compare_items(a, b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        for sort in &self.sorts {
            let ord = sort.compare_items(a, b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl<T> Clone for CompositeComparator<T> {
    fn clone(&self) -> Self {
        Self {
            group: self.group.clone(),
            sorts: self.sorts.clone(),
        }
    }
}

impl<T> Default for CompositeComparator<T> {
    fn default() -> Self {
        Self {
            group: None,
            sorts: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for CompositeComparator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeComparator")
            .field("group", &self.group)
            .field("sorts", &self.sorts)
            .finish()
    }
}
