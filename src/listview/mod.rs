//! Search, sort and paginate over a fully loaded collection.
//!
//! Every listing in the back-office (admin panels and public pages alike)
//! reduces its in-memory collection to one visible page with [`list_view`].
//! The pipeline is pure: it never mutates the collection and never fails,
//! malformed values are coerced instead of rejected.

mod sort;

pub use sort::*;

use serde::Serialize;
use serde_json::{Map, Value};

/// One row of domain data (a car, a banner, an enquiry, ...).
pub type Record = Map<String, Value>;

/// Page size used when a resource does not configure one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Transient search/sort/page selection of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search_term: String,
    pub sort_key: SortKey,
    /// 1-based, kept within `[1, total_pages]` by its owner.
    pub current_page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            sort_key: SortKey::Unsorted,
            current_page: 1,
        }
    }
}

/// Inputs of one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct ListQuery<'a> {
    pub search_term: &'a str,
    pub search_fields: &'a [&'a str],
    pub sort: &'a SortKey,
    pub page: usize,
    pub page_size: usize,
}

impl<'a> ListQuery<'a> {
    /// Build a query from a view state and a resource's search fields.
    pub fn from_view(view: &'a ViewState, search_fields: &'a [&'a str], page_size: usize) -> Self {
        Self {
            search_term: &view.search_term,
            search_fields,
            sort: &view.sort_key,
            page: view.current_page,
            page_size,
        }
    }
}

/// The visible slice of a collection plus pagination metadata.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<'a> {
    pub page_items: Vec<&'a Record>,
    pub total_pages: usize,
    /// Number of records that passed the search filter.
    pub total_count: usize,
    pub effective_page: usize,
}

/// Coerce a field value to the text searched by [`matches`].
///
/// Missing and null values become the empty string, strings are taken as-is
/// and everything else uses its JSON rendering.
pub fn search_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Whether `record` matches `term` on at least one of `search_fields`.
///
/// Matching is a case-insensitive substring test. An empty term matches
/// every record.
pub fn matches(record: &Record, term: &str, search_fields: &[&str]) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    matches_lowercase(record, &needle, search_fields)
}

fn matches_lowercase(record: &Record, needle: &str, search_fields: &[&str]) -> bool {
    search_fields.iter().any(|field| {
        search_text(record.get(*field))
            .to_lowercase()
            .contains(needle)
    })
}

/// Keep the records matching `term`, preserving their order.
pub fn filter<'a>(records: &'a [Record], term: &str, search_fields: &[&str]) -> Vec<&'a Record> {
    if term.is_empty() {
        return records.iter().collect();
    }
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| matches_lowercase(record, &needle, search_fields))
        .collect()
}

/// Number of pages needed for `count` items, never less than one.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Clamp a requested page into `[1, total_pages]`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Run the full filter → sort → paginate pipeline.
pub fn list_view<'a>(records: &'a [Record], query: &ListQuery<'_>) -> ListPage<'a> {
    let mut filtered = filter(records, query.search_term, query.search_fields);
    query.sort.sort(&mut filtered);

    let page_size = query.page_size.max(1);
    let total_count = filtered.len();
    let total_pages = total_pages(total_count, page_size);
    let effective_page = clamp_page(query.page, total_pages);

    let page_items = filtered
        .into_iter()
        .skip((effective_page - 1) * page_size)
        .take(page_size)
        .collect();

    ListPage {
        page_items,
        total_pages,
        total_count,
        effective_page,
    }
}
