//! # Selection Tracker
//!
//! The set of item ids currently selected in the dashboard (for bulk
//! actions).
//!
//! Selection is a plain set: selecting twice or deselecting something that
//! is not selected changes nothing and is never an error. Keeping the set
//! consistent with the catalog is the store's job: it only
//! selects ids that exist and prunes deleted ids in the same commit that
//! deletes them.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::EntityId;

/// Currently selected item ids, iterated in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selection {
    ids: BTreeSet<EntityId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id`. Returns true if it was not selected before.
    pub fn select(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    /// Removes `id`. Returns true if it was selected.
    pub fn deselect(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    /// Flips `id` and returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.deselect(id) {
            false
        } else {
            self.select(id)
        }
    }

    /// Set union with `ids`. Returns how many were newly selected.
    pub fn select_many<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter()
            .filter(|id| self.select(id.as_ref()))
            .count()
    }

    pub fn deselect_all(&mut self) {
        self.ids.clear();
    }

    /// Keeps only the ids for which `keep` returns true.
    ///
    /// Returns how many ids were dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.ids.len();
        self.ids.retain(|id| keep(id));
        before - self.ids.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.ids.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_is_idempotent() {
        let mut once = Selection::new();
        once.select("a");

        let mut twice = Selection::new();
        assert!(twice.select("a"));
        assert!(!twice.select("a"));

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn test_deselect_absent_is_noop() {
        let mut selection = Selection::new();
        assert!(!selection.deselect("a"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle() {
        let mut selection = Selection::new();
        assert!(selection.toggle("a"));
        assert!(selection.contains("a"));
        assert!(!selection.toggle("a"));
        assert!(!selection.contains("a"));
    }

    #[test]
    fn test_select_many_is_union() {
        let mut selection = Selection::new();
        selection.select("a");

        let added = selection.select_many(["a", "b", "b", "c"]);
        assert_eq!(added, 2);
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_retain_reports_dropped() {
        let mut selection = Selection::new();
        selection.select_many(["a", "b", "c"]);

        let dropped = selection.retain(|id| id != "b");
        assert_eq!(dropped, 1);
        assert!(!selection.contains("b"));

        selection.deselect_all();
        assert!(selection.is_empty());
    }
}
