//! Group index: the view partitioned into buckets sharing a group key.

use super::key::Key;
use super::sort::GroupDescription;

/// One bucket of the view: every view item whose group key compares equal to
/// [`key`](Self::key), in view order.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionGroup<T> {
    key: Key,
    items: Vec<T>,
}

impl<T> CollectionGroup<T> {
    fn new(key: Key, first: T) -> Self {
        Self {
            key,
            items: vec![first],
        }
    }

    /// Returns the group key.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Returns the members in view order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the group has no members.
    ///
    /// Groups held by a view are never empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the group, returning its members.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Sorted sequence of groups, kept in group-key order by binary-search
/// insertion.
///
/// The index relies on the view being ordered by a comparator that applies
/// the same group rule first, so that the members of one group occupy a
/// contiguous run of the view and a group's first member sits at the sum of
/// the lengths of all groups before it.
#[derive(Debug, Clone)]
pub(crate) struct GroupIndex<T> {
    groups: Vec<CollectionGroup<T>>,
}

impl<T> Default for GroupIndex<T> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<T: Clone + PartialEq> GroupIndex<T> {
    pub(crate) fn groups(&self) -> &[CollectionGroup<T>] {
        &self.groups
    }

    pub(crate) fn len(&self) -> usize {
        self.groups.len()
    }

    pub(crate) fn clear(&mut self) {
        self.groups.clear();
    }

    /// Rebuilds every group from the view, which must already be in order.
    pub(crate) fn rebuild<'a, I>(&mut self, rule: &GroupDescription<T>, view: I)
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        self.groups.clear();
        for item in view {
            let key = rule.key_of(item);
            match self.find(rule, &key) {
                Ok(pos) => self.groups[pos].items.push(item.clone()),
                Err(pos) => self.groups.insert(pos, CollectionGroup::new(key, item.clone())),
            }
        }
    }

    /// Binary search for the group with `key`.
    fn find(&self, rule: &GroupDescription<T>, key: &Key) -> Result<usize, usize> {
        self.groups
            .binary_search_by(|group| rule.compare_keys(&group.key, key))
    }

    /// View index of the first member of the group at `pos`.
    fn offset_of(&self, pos: usize) -> usize {
        self.groups[..pos].iter().map(CollectionGroup::len).sum()
    }

    /// Records that `item` was inserted into the view at `view_index`.
    pub(crate) fn insert(&mut self, rule: &GroupDescription<T>, item: T, view_index: usize) {
        let key = rule.key_of(&item);
        match self.find(rule, &key) {
            Ok(pos) => {
                let offset = self.offset_of(pos);
                let group = &mut self.groups[pos];
                let member = view_index.saturating_sub(offset).min(group.items.len());
                group.items.insert(member, item);
            }
            Err(pos) => self.groups.insert(pos, CollectionGroup::new(key, item)),
        }
    }

    /// Records that `item` was removed from the view at `view_index`.
    ///
    /// Returns `false` if the item could not be located.
    pub(crate) fn remove(
        &mut self,
        rule: &GroupDescription<T>,
        item: &T,
        view_index: usize,
    ) -> bool {
        let key = rule.key_of(item);
        let Ok(pos) = self.find(rule, &key) else {
            return false;
        };

        let offset = self.offset_of(pos);
        let group = &mut self.groups[pos];
        let member = match view_index.checked_sub(offset) {
            Some(idx) if group.items.get(idx) == Some(item) => idx,
            _ => match group.items.iter().position(|member| member == item) {
                Some(idx) => idx,
                None => return false,
            },
        };

        group.items.remove(member);
        if group.items.is_empty() {
            self.groups.remove(pos);
        }
        true
    }
}
