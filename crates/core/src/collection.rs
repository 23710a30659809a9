//! Insertion-ordered entity collection with an id index.

use std::collections::HashMap;

use crate::entity::Entity;

/// Entities kept in insertion order, indexed by id.
///
/// Duplicate ids are allowed. The index points at the *first* entity with a
/// given id, so `find` and `remove_first` behave like a linear scan that stops
/// at the first match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedItems<T: Entity> {
    items: Vec<T>,
    index: HashMap<T::Id, usize>,
}

impl<T: Entity> Default for IndexedItems<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Entity> IndexedItems<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.index.contains_key(&id)
    }

    pub fn find(&self, id: T::Id) -> Option<&T> {
        self.index.get(&id).map(|&pos| &self.items[pos])
    }

    pub fn find_mut(&mut self, id: T::Id) -> Option<&mut T> {
        match self.index.get(&id) {
            Some(&pos) => Some(&mut self.items[pos]),
            None => None,
        }
    }

    /// Position of the first entity with `id`.
    pub fn position(&self, id: T::Id) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Entity at `pos` in insertion order, regardless of duplicates before it.
    pub fn get(&self, pos: usize) -> Option<&T> {
        self.items.get(pos)
    }

    /// Callers must not change the entity's id.
    pub fn get_mut(&mut self, pos: usize) -> Option<&mut T> {
        self.items.get_mut(pos)
    }

    /// Appends at the end; an existing entry with the same id keeps precedence.
    pub fn push(&mut self, item: T) {
        let pos = self.items.len();
        self.index.entry(item.id()).or_insert(pos);
        self.items.push(item);
    }

    /// Removes the first entity with `id`, returning it.
    pub fn remove_first(&mut self, id: T::Id) -> Option<T> {
        let pos = self.index.get(&id).copied()?;
        let removed = self.items.remove(pos);
        self.reindex();
        Some(removed)
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (pos, item) in self.items.iter().enumerate() {
            self.index.entry(item.id()).or_insert(pos);
        }
    }
}

impl<'a, T: Entity> IntoIterator for &'a IndexedItems<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Row {
        id: u64,
        label: &'static str,
    }

    impl Entity for Row {
        type Id = u64;

        fn id(&self) -> u64 {
            self.id
        }
    }

    fn row(id: u64, label: &'static str) -> Row {
        Row { id, label }
    }

    #[test]
    fn find_returns_first_match() {
        let mut items = IndexedItems::new();
        items.push(row(1, "a"));
        items.push(row(2, "b"));
        items.push(row(1, "c"));

        assert_eq!(items.len(), 3);
        assert_eq!(items.find(1).map(|r| r.label), Some("a"));
        assert_eq!(items.find(3), None);
    }

    #[test]
    fn remove_first_exposes_next_duplicate() {
        let mut items = IndexedItems::new();
        items.push(row(1, "a"));
        items.push(row(2, "b"));
        items.push(row(1, "c"));

        assert_eq!(items.remove_first(1).map(|r| r.label), Some("a"));
        assert_eq!(items.find(1).map(|r| r.label), Some("c"));
        assert_eq!(items.find(2).map(|r| r.label), Some("b"));
        assert_eq!(
            items.iter().map(|r| r.label).collect::<Vec<_>>(),
            vec!["b", "c"]
        );

        assert_eq!(items.remove_first(1).map(|r| r.label), Some("c"));
        assert!(items.remove_first(1).is_none());
        assert!(!items.contains(1));
    }

    #[test]
    fn find_mut_edits_in_place() {
        let mut items = IndexedItems::new();
        items.push(row(5, "x"));
        if let Some(r) = items.find_mut(5) {
            r.label = "y";
        }
        assert_eq!(items.as_slice(), &[row(5, "y")]);
    }

    #[test]
    fn positional_access_reaches_shadowed_duplicates() {
        let mut items = IndexedItems::new();
        items.push(row(7, "first"));
        items.push(row(7, "second"));

        assert_eq!(items.position(7), Some(0));
        assert_eq!(items.get(1).map(|r| r.label), Some("second"));
        if let Some(r) = items.get_mut(1) {
            r.label = "edited";
        }
        assert_eq!(items.find(7).map(|r| r.label), Some("first"));
        assert_eq!(items.get(1).map(|r| r.label), Some("edited"));
        assert!(items.get(2).is_none());
    }
}
