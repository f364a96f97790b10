//! Local mirror of one remote collection.
//!
//! The list is loaded once per view activation and afterwards patched with
//! each successful mutation response instead of being refetched. Records
//! are keyed by id, never by position.

use bazaar_core::{EntityFields, Record};

/// Ordered, id-keyed cache of a collection.
#[derive(Debug, Clone)]
pub struct ListState<F: EntityFields> {
    items: Vec<Record<F>>,
}

impl<F: EntityFields> Default for ListState<F> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<F: EntityFields> ListState<F> {
    /// Empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with a freshly fetched collection.
    ///
    /// A later record with an id already seen replaces the earlier one at
    /// the earlier position, so the list never holds duplicate ids.
    pub fn replace_all(&mut self, records: Vec<Record<F>>) {
        self.items.clear();
        for record in records {
            if let Some(existing) = self.items.iter_mut().find(|r| r.id == record.id) {
                tracing::warn!(collection = F::COLLECTION, id = %record.id, "Duplicate id in listing");
                *existing = record;
            } else {
                self.items.push(record);
            }
        }
    }

    /// Apply a successful create: append the server's record.
    pub fn apply_created(&mut self, record: Record<F>) {
        if let Some(existing) = self.items.iter_mut().find(|r| r.id == record.id) {
            *existing = record;
        } else {
            self.items.push(record);
        }
    }

    /// Apply a successful update: replace the record with the same id in place.
    ///
    /// Returns `false` if no record with that id is listed.
    pub fn apply_updated(&mut self, record: Record<F>) -> bool {
        match self.items.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                *existing = record;
                true
            }
            None => false,
        }
    }

    /// Apply a successful delete: drop the record with that id.
    ///
    /// Returns `false` if no record with that id was listed.
    pub fn apply_removed(&mut self, id: &F::Id) -> bool {
        let before = self.items.len();
        self.items.retain(|r| &r.id != id);
        self.items.len() != before
    }

    /// Records in display order.
    #[must_use]
    pub fn items(&self) -> &[Record<F>] {
        &self.items
    }

    /// Stable rendering keys, in display order.
    pub fn keys(&self) -> impl Iterator<Item = &F::Id> {
        self.items.iter().map(|r| &r.id)
    }

    /// Look up a record by id.
    #[must_use]
    pub fn get(&self, id: &F::Id) -> Option<&Record<F>> {
        self.items.iter().find(|r| &r.id == id)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use bazaar_core::{CategoryFields, CategoryId};

    use super::*;

    fn category(id: i64, name: &str) -> Record<CategoryFields> {
        Record::new(
            CategoryId::from(id),
            CategoryFields {
                name: name.to_owned(),
                image: String::new(),
            },
        )
    }

    fn names(list: &ListState<CategoryFields>) -> Vec<&str> {
        list.items().iter().map(|r| r.fields.name.as_str()).collect()
    }

    #[test]
    fn test_starts_empty() {
        let list = ListState::<CategoryFields>::new();
        assert!(list.is_empty());
    }

    #[test]
    fn test_create_appends_one_record() {
        let mut list = ListState::new();
        list.replace_all(vec![category(1, "A")]);
        list.apply_created(category(2, "B"));
        assert_eq!(names(&list), ["A", "B"]);
        assert_eq!(list.get(&CategoryId::from(2)).map(|r| r.fields.name.as_str()), Some("B"));
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut list = ListState::new();
        list.replace_all(vec![category(1, "A"), category(2, "B"), category(3, "C")]);
        assert!(list.apply_updated(category(2, "B2")));
        assert_eq!(names(&list), ["A", "B2", "C"]);
    }

    #[test]
    fn test_update_single_record_scenario() {
        let mut list = ListState::new();
        list.replace_all(vec![category(1, "A")]);
        list.apply_updated(category(1, "B"));
        assert_eq!(list.items(), [category(1, "B")]);
    }

    #[test]
    fn test_update_unknown_id_changes_nothing() {
        let mut list = ListState::new();
        list.replace_all(vec![category(1, "A")]);
        assert!(!list.apply_updated(category(5, "E")));
        assert_eq!(names(&list), ["A"]);
    }

    #[test]
    fn test_remove_keeps_others_in_order() {
        let mut list = ListState::new();
        list.replace_all(vec![category(1, "A"), category(2, "B"), category(3, "C")]);
        assert!(list.apply_removed(&CategoryId::from(2)));
        assert_eq!(names(&list), ["A", "C"]);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut list = ListState::new();
        list.replace_all(vec![category(1, "A")]);
        assert!(!list.apply_removed(&CategoryId::from(2)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_no_duplicate_ids() {
        let mut list = ListState::new();
        list.replace_all(vec![category(1, "A"), category(1, "A again")]);
        list.apply_created(category(2, "B"));
        list.apply_created(category(2, "B again"));
        assert_eq!(names(&list), ["A again", "B again"]);
        let keys: Vec<String> = list.keys().map(ToString::to_string).collect();
        assert_eq!(keys, ["1", "2"]);
    }
}
