//! Collection view controller: stage filter + pagination over one record kind.
//!
//! Every transition re-derives the view from owned state, so the view model
//! returned by [`CollectionView::view`] is always consistent with the
//! current filter, page and backing collection.

use serde::Serialize;

use crate::record::{Record, RecordKind};

/// Records shown per page.
pub const PAGE_SIZE: usize = 9;

/// Label of the "no filter" option.
pub const ALL_LABEL: &str = "All";

/// Selected stage filter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "stage", rename_all = "lowercase")]
pub enum StageFilter {
    #[default]
    All,
    Stage(String),
}

impl StageFilter {
    /// Parse a dropdown value; `"All"` means no filter.
    pub fn parse(value: &str) -> Self {
        if value == ALL_LABEL {
            StageFilter::All
        } else {
            StageFilter::Stage(value.to_string())
        }
    }

    pub fn matches(&self, kind: RecordKind, record: &Record) -> bool {
        match self {
            StageFilter::All => true,
            StageFilter::Stage(stage) => record.stage(kind) == Some(stage.as_str()),
        }
    }

    /// Value to send to the gateway, if any.
    pub fn as_stage(&self) -> Option<&str> {
        match self {
            StageFilter::All => None,
            StageFilter::Stage(stage) => Some(stage),
        }
    }
}

/// Dropdown options for a kind: `"All"` followed by its vocabulary.
pub fn filter_options(kind: RecordKind) -> Vec<&'static str> {
    std::iter::once(ALL_LABEL)
        .chain(kind.stages().iter().copied())
        .collect()
}

/// Number of pages for `count` records; never less than one.
pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE).max(1)
}

/// Derived, render-ready state of one collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionViewModel {
    pub kind: RecordKind,
    pub filter: StageFilter,
    pub filtered_count: usize,
    pub page: usize,
    pub total_pages: usize,
    pub page_slice: Vec<Record>,
    pub has_prev: bool,
    pub has_next: bool,
    /// The paginator is hidden when everything fits on one page.
    pub show_paginator: bool,
}

/// Owned filter/pagination state for one record kind.
#[derive(Debug, Clone)]
pub struct CollectionView {
    kind: RecordKind,
    all: Vec<Record>,
    filter: StageFilter,
    page: usize,
    /// Indices into `all` that pass the filter.
    filtered: Vec<usize>,
}

impl CollectionView {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            all: Vec::new(),
            filter: StageFilter::All,
            page: 1,
            filtered: Vec::new(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn filter(&self) -> &StageFilter {
        &self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn records(&self) -> &[Record] {
        &self.all
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered.len())
    }

    /// Replace the filter and go back to page 1.
    pub fn set_filter(&mut self, filter: StageFilter) {
        self.filter = filter;
        self.page = 1;
        self.derive();
    }

    /// Move to page `n`. Out-of-range requests are rejected and leave the
    /// page unchanged; returns whether the page was applied.
    pub fn set_page(&mut self, n: usize) -> bool {
        if n < 1 || n > self.total_pages() {
            log::debug!(
                "{}: rejecting page {} (valid 1..={})",
                self.kind,
                n,
                self.total_pages()
            );
            return false;
        }
        self.page = n;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.page > 1 && self.set_page(self.page - 1)
    }

    /// Replace the backing collection, keeping filter and page.
    ///
    /// The page is clamped back into range if the new collection is shorter.
    pub fn reload(&mut self, records: Vec<Record>) {
        self.all = records;
        self.derive();
    }

    /// Find a record in the full collection by id.
    pub fn find(&self, id: &str) -> Option<&Record> {
        self.all.iter().find(|r| r.id() == Some(id))
    }

    fn derive(&mut self) {
        let kind = self.kind;
        let filter = &self.filter;
        self.filtered = self
            .all
            .iter()
            .enumerate()
            .filter(|(_, r)| filter.matches(kind, r))
            .map(|(i, _)| i)
            .collect();
        self.page = self.page.clamp(1, self.total_pages());
    }

    /// Produce a fresh view model from the current state.
    pub fn view(&self) -> CollectionViewModel {
        let total_pages = self.total_pages();
        let start = (self.page - 1) * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.filtered.len());
        let page_slice = self.filtered[start.min(end)..end]
            .iter()
            .map(|&i| self.all[i].clone())
            .collect();

        CollectionViewModel {
            kind: self.kind,
            filter: self.filter.clone(),
            filtered_count: self.filtered.len(),
            page: self.page,
            total_pages,
            page_slice,
            has_prev: self.page > 1,
            has_next: self.page < total_pages,
            show_paginator: total_pages > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leads(stages: &[&str]) -> Vec<Record> {
        stages
            .iter()
            .enumerate()
            .map(|(i, stage)| {
                let id = format!("L{i}");
                Record::from_pairs([("sys_id", id.as_str()), ("stage", *stage)])
            })
            .collect()
    }

    fn view_with(stages: &[&str]) -> CollectionView {
        let mut view = CollectionView::new(RecordKind::Lead);
        view.reload(leads(stages));
        view
    }

    #[test]
    fn test_ten_new_leads_span_two_pages() {
        let mut view = view_with(&["New"; 10]);
        view.set_filter(StageFilter::parse("New"));

        let first = view.view();
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.page_slice.len(), 9);
        assert!(first.show_paginator);

        assert!(view.set_page(2));
        let second = view.view();
        assert_eq!(second.page_slice.len(), 1);
        assert_eq!(second.page_slice[0].id(), Some("L9"));
        assert!(second.has_prev && !second.has_next);
    }

    #[test]
    fn test_filtered_count_matches_stage() {
        let view = {
            let mut v = view_with(&["New", "Qualified", "New", "Contacted", "Qualified", "Odd"]);
            v.set_filter(StageFilter::parse("Qualified"));
            v
        };
        assert_eq!(view.filtered_count(), 2);

        let mut all = view.clone();
        all.set_filter(StageFilter::All);
        assert_eq!(all.filtered_count(), 6);
    }

    #[test]
    fn test_page_slices_partition_filtered_list() {
        for count in [0usize, 1, 8, 9, 10, 18, 19, 27, 100] {
            let mut view = view_with(&vec!["New"; count]);
            let pages = view.total_pages();
            assert_eq!(pages, std::cmp::max(1, count.div_ceil(PAGE_SIZE)));

            for page in 1..=pages {
                assert!(view.set_page(page));
                let len = view.view().page_slice.len();
                if page < pages {
                    assert_eq!(len, PAGE_SIZE);
                } else {
                    assert_eq!(len, count - (pages - 1) * PAGE_SIZE);
                }
            }
        }
    }

    #[test]
    fn test_empty_collection_has_one_empty_page() {
        let view = CollectionView::new(RecordKind::Quote);
        let vm = view.view();

        assert_eq!(vm.total_pages, 1);
        assert_eq!(vm.page, 1);
        assert!(vm.page_slice.is_empty());
        assert!(!vm.show_paginator);
    }

    #[test]
    fn test_set_filter_is_idempotent_and_resets_page() {
        let mut stages = vec!["Qualified"; 12];
        stages.extend(["New"; 20]);
        let mut view = view_with(&stages);
        assert!(view.set_page(3));

        view.set_filter(StageFilter::parse("Qualified"));
        let once = view.view();
        view.set_filter(StageFilter::parse("Qualified"));
        let twice = view.view();

        assert_eq!(once, twice);
        assert_eq!(twice.page, 1);
    }

    #[test]
    fn test_set_page_rejects_out_of_range() {
        let mut view = view_with(&["New"; 10]);

        assert!(!view.set_page(0));
        assert!(!view.set_page(3));
        assert_eq!(view.page(), 1);

        assert!(view.next_page());
        assert!(!view.next_page());
        assert_eq!(view.page(), 2);
        assert!(view.prev_page());
        assert!(!view.prev_page());
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn test_reload_reapplies_filter_to_new_collection() {
        let mut view = view_with(&["New", "Qualified"]);
        view.set_filter(StageFilter::parse("Qualified"));

        view.reload(leads(&["Qualified", "Qualified", "New", "Qualified"]));

        let vm = view.view();
        assert_eq!(vm.filter, StageFilter::Stage("Qualified".to_string()));
        assert_eq!(vm.filtered_count, 3);
        assert!(vm
            .page_slice
            .iter()
            .all(|r| r.stage(RecordKind::Lead) == Some("Qualified")));
    }

    #[test]
    fn test_reload_keeps_page_when_still_valid() {
        let mut view = view_with(&["New"; 30]);
        assert!(view.set_page(3));

        view.reload(leads(&["New"; 25]));
        assert_eq!(view.page(), 3);
    }

    #[test]
    fn test_reload_reclamps_page() {
        let mut view = view_with(&["New"; 30]);
        assert!(view.set_page(3));

        view.reload(leads(&["New"; 4]));

        let vm = view.view();
        assert_eq!(vm.page, 1);
        assert_eq!(vm.total_pages, 1);
        assert_eq!(vm.page_slice.len(), 4);
    }

    #[test]
    fn test_unknown_stage_only_matches_all() {
        let mut view = view_with(&["Mystery"]);
        for stage in RecordKind::Lead.stages() {
            view.set_filter(StageFilter::parse(stage));
            assert_eq!(view.filtered_count(), 0);
        }
        view.set_filter(StageFilter::All);
        assert_eq!(view.filtered_count(), 1);
    }

    #[test]
    fn test_filter_options_lead_with_all() {
        assert_eq!(
            filter_options(RecordKind::Lead),
            vec!["All", "New", "Contacted", "Nurturing", "Qualified", "Disqualified"]
        );
    }
}
