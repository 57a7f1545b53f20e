use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

/// An extraction target with its own pattern and accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Email,
    Phone,
    StudentId,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Email, Category::Phone, Category::StudentId];

    pub fn label(self) -> &'static str {
        match self {
            Category::Email => "email",
            Category::Phone => "phone number",
            Category::StudentId => "student ID",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Category::Email => "emails",
            Category::Phone => "phone numbers",
            Category::StudentId => "student IDs",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of merging one page's matches into a session set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Merge {
    /// Unique matches on the page.
    pub found: usize,
    /// Matches not seen before in this session, sorted.
    pub new_items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    items: HashSet<String>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the page-local set and reports what was new.
    pub fn absorb(&mut self, page: HashSet<String>) -> Merge {
        let found = page.len();
        let mut new_items: Vec<String> = page
            .into_iter()
            .filter(|item| !self.items.contains(item))
            .collect();
        new_items.sort();
        self.items.extend(new_items.iter().cloned());
        Merge { found, new_items }
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn sorted(&self) -> Vec<&str> {
        let mut items: Vec<&str> = self.iter().collect();
        items.sort_unstable();
        items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<S: Into<String>> FromIterator<S> for ResultSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ResultSet {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Before/after counts reported by a manual dedupe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DedupeCount {
    pub category: Category,
    pub before: usize,
    pub after: usize,
}

/// Everything collected during one session, one set per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    emails: ResultSet,
    phones: ResultSet,
    student_ids: ResultSet,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, category: Category) -> &ResultSet {
        match category {
            Category::Email => &self.emails,
            Category::Phone => &self.phones,
            Category::StudentId => &self.student_ids,
        }
    }

    fn set_mut(&mut self, category: Category) -> &mut ResultSet {
        match category {
            Category::Email => &mut self.emails,
            Category::Phone => &mut self.phones,
            Category::StudentId => &mut self.student_ids,
        }
    }

    pub fn record(&mut self, category: Category, page: HashSet<String>) -> Merge {
        self.set_mut(category).absorb(page)
    }

    /// Re-interns every set and reports the counts. The sets are already
    /// unique, so `before == after` always holds.
    pub fn manual_dedupe(&mut self) -> Vec<DedupeCount> {
        Category::ALL
            .iter()
            .map(|&category| {
                let set = self.set_mut(category);
                let before = set.len();
                *set = set.iter().map(str::to_string).collect();
                DedupeCount {
                    category,
                    before,
                    after: set.len(),
                }
            })
            .collect()
    }

    pub fn clear(&mut self) {
        for category in Category::ALL {
            self.set_mut(category).clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|&c| self.set(c).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_second_identical_merge_reports_nothing_new() {
        let mut state = SessionState::new();
        let first = state.record(Category::Email, page(&["a@x.com", "b@x.com"]));
        assert_eq!(first.found, 2);
        assert_eq!(first.new_items, vec!["a@x.com", "b@x.com"]);

        let second = state.record(Category::Email, page(&["a@x.com", "b@x.com"]));
        assert_eq!(second.found, 2);
        assert!(second.new_items.is_empty());
        assert_eq!(state.set(Category::Email).len(), 2);
    }

    #[test]
    fn test_partial_overlap() {
        let mut state = SessionState::new();
        state.record(Category::Phone, page(&["13812345678"]));
        let merge = state.record(Category::Phone, page(&["13812345678", "13900000000"]));
        assert_eq!(merge.found, 2);
        assert_eq!(merge.new_items, vec!["13900000000"]);
        assert_eq!(state.set(Category::Phone).len(), 2);
    }

    #[test]
    fn test_categories_are_independent() {
        let mut state = SessionState::new();
        state.record(Category::StudentId, page(&["2023010203"]));
        let merge = state.record(Category::Phone, page(&["2023010203"]));
        assert_eq!(merge.new_items.len(), 1);
        assert!(state.set(Category::Email).is_empty());
    }

    #[test]
    fn test_manual_dedupe_is_idempotent() {
        let mut state = SessionState::new();
        state.record(Category::Email, page(&["a@x.com", "b@x.com"]));
        let snapshot = state.clone();

        let counts = state.manual_dedupe();
        assert_eq!(counts.len(), 3);
        assert!(counts.iter().all(|c| c.before == c.after));
        assert_eq!(counts[0].after, 2);
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut state = SessionState::new();
        state.record(Category::Email, page(&["a@x.com"]));
        state.record(Category::StudentId, page(&["123456"]));
        assert!(!state.is_empty());
        state.clear();
        assert!(state.is_empty());
    }

    #[test]
    fn test_sorted_is_lexicographic() {
        let set: ResultSet = ["b", "c", "a"].into_iter().collect();
        assert_eq!(set.sorted(), vec!["a", "b", "c"]);
    }
}
