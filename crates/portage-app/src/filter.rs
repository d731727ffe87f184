// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::rows::DisplayRow;

/// The full row cache plus the filtered view the table renders from.
///
/// Filtering is a case-insensitive substring match against the space-joined
/// visible columns; an empty needle makes the filtered view identical to
/// the full cache. Deletes go through [`FilterSet::retain`] so both caches
/// stay consistent.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    all: Vec<DisplayRow>,
    filter_text: String,
    filtered: Vec<DisplayRow>,
}

impl FilterSet {
    pub fn new(rows: Vec<DisplayRow>) -> Self {
        Self {
            filtered: rows.clone(),
            all: rows,
            filter_text: String::new(),
        }
    }

    pub fn all(&self) -> &[DisplayRow] {
        &self.all
    }

    pub fn filtered(&self) -> &[DisplayRow] {
        &self.filtered
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    /// Starts a fresh filter pass with an empty needle.
    pub fn begin(&mut self) {
        self.filter_text.clear();
        self.apply();
    }

    pub fn push_char(&mut self, c: char) {
        self.filter_text.push(c);
        self.apply();
    }

    pub fn pop_char(&mut self) {
        if self.filter_text.pop().is_some() {
            self.apply();
        }
    }

    /// Abandons the filter; the filtered view shows every surviving row.
    pub fn clear(&mut self) {
        self.filter_text.clear();
        self.filtered = self.all.clone();
    }

    /// Removes rows from both caches, keeping those the predicate accepts.
    pub fn retain(&mut self, keep: impl Fn(&DisplayRow) -> bool) {
        self.all.retain(&keep);
        self.filtered.retain(&keep);
    }

    fn apply(&mut self) {
        if self.filter_text.is_empty() {
            self.filtered = self.all.clone();
            return;
        }
        let needle = self.filter_text.to_lowercase();
        self.filtered = self
            .all
            .iter()
            .filter(|row| row.filter_text().contains(&needle))
            .cloned()
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::FilterSet;
    use crate::rows::DisplayRow;

    fn rows() -> Vec<DisplayRow> {
        [
            vec!["db", "local", "5432"],
            vec!["web", "remote", "8080"],
            vec!["socks", "dynamic", "1080"],
            vec!["db-replica", "local", "5433"],
        ]
        .into_iter()
        .map(|cells| DisplayRow::plain(cells.into_iter().map(str::to_owned).collect()))
        .collect()
    }

    fn names(set: &FilterSet) -> Vec<&str> {
        set.filtered()
            .iter()
            .map(|row| row.columns[0].as_str())
            .collect()
    }

    #[test]
    fn empty_filter_is_identity() {
        let set = FilterSet::new(rows());
        assert_eq!(set.filtered(), set.all());
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let mut set = FilterSet::new(rows());
        set.begin();
        for c in "DB".chars() {
            set.push_char(c);
        }
        assert_eq!(names(&set), vec!["db", "db-replica"]);
    }

    #[test]
    fn narrowing_then_backspace_widens_again() {
        let mut set = FilterSet::new(rows());
        set.begin();
        set.push_char('d');
        set.push_char('b');
        assert_eq!(names(&set), vec!["db", "db-replica"]);

        set.push_char('x');
        assert!(set.filtered().is_empty());

        set.pop_char();
        assert_eq!(names(&set), vec!["db", "db-replica"]);
    }

    #[test]
    fn filtered_view_preserves_full_cache_order() {
        let mut set = FilterSet::new(rows());
        set.begin();
        for c in "local".chars() {
            set.push_char(c);
        }
        assert_eq!(names(&set), vec!["db", "db-replica"]);
    }

    #[test]
    fn clear_restores_all_surviving_rows() {
        let mut set = FilterSet::new(rows());
        set.begin();
        set.push_char('d');
        set.retain(|row| row.columns[0] != "db");
        set.clear();
        assert_eq!(names(&set), vec!["web", "socks", "db-replica"]);
    }

    #[test]
    fn retain_keeps_both_caches_consistent() {
        let mut set = FilterSet::new(rows());
        set.begin();
        set.push_char('d');
        set.retain(|row| row.columns[0] != "db-replica");

        assert!(set.all().iter().all(|row| row.columns[0] != "db-replica"));
        for row in set.filtered() {
            assert!(set.all().contains(row));
        }
    }

    #[test]
    fn filter_matches_any_column() {
        let mut set = FilterSet::new(rows());
        set.begin();
        for c in "1080".chars() {
            set.push_char(c);
        }
        assert_eq!(names(&set), vec!["socks"]);
    }
}
