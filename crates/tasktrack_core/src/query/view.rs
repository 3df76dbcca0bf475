//! Query engine: filter, search and sort a task snapshot.
//!
//! # Responsibility
//! - Compute the visible task list from (collection, search, status, sort).
//!
//! # Invariants
//! - `view` is pure: identical inputs always give identical output.
//! - Sorting is stable; ties keep storage order.
//! - Missing or unparseable due dates sort after every dated task.

use crate::model::task::{Task, TaskStatus, TaskValidationError};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Status filter applied before search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    /// Sentinel label that disables status filtering.
    pub const ALL_LABEL: &'static str = "All";

    /// Parses `All` or an exact status label.
    pub fn parse(value: &str) -> Result<Self, TaskValidationError> {
        if value == Self::ALL_LABEL {
            return Ok(Self::All);
        }
        TaskStatus::parse(value).map(Self::Only)
    }

    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl Display for StatusFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(Self::ALL_LABEL),
            Self::Only(status) => f.write_str(status.label()),
        }
    }
}

/// Ordering of the visible list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// `due_asc`: earliest due date first.
    DueAsc,
    /// `title_asc`: alphabetical, case and accent insensitive.
    TitleAsc,
    /// `created_desc`: newest first.
    #[default]
    CreatedDesc,
}

impl SortKey {
    /// Parses a sort key. Unknown keys fall back to `created_desc`.
    pub fn parse(value: &str) -> Self {
        match value {
            "due_asc" => Self::DueAsc,
            "title_asc" => Self::TitleAsc,
            _ => Self::CreatedDesc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DueAsc => "due_asc",
            Self::TitleAsc => "title_asc",
            Self::CreatedDesc => "created_desc",
        }
    }
}

/// Current view parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    /// Case-insensitive substring matched against title, description and
    /// comma-joined tags. Empty matches everything.
    pub search_text: String,
    pub status_filter: StatusFilter,
    pub sort_key: SortKey,
}

impl ViewQuery {
    pub fn new(
        search_text: impl Into<String>,
        status_filter: StatusFilter,
        sort_key: SortKey,
    ) -> Self {
        Self {
            search_text: search_text.into(),
            status_filter,
            sort_key,
        }
    }
}

/// Returns the filtered and sorted tasks as an owned snapshot.
pub fn view(tasks: &[Task], query: &ViewQuery) -> Vec<Task> {
    let needle = query.search_text.to_lowercase();
    let mut visible: Vec<Task> = tasks
        .iter()
        .filter(|task| query.status_filter.matches(task.status))
        .filter(|task| matches_search(task, &needle))
        .cloned()
        .collect();

    sort_tasks(&mut visible, query.sort_key);
    visible
}

/// Stable in-place sort by the given key.
pub fn sort_tasks(tasks: &mut [Task], key: SortKey) {
    match key {
        SortKey::DueAsc => tasks.sort_by_cached_key(|task| DueKey(task.due_date_value())),
        SortKey::TitleAsc => tasks.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortKey::CreatedDesc => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

/// Locale-style title comparison.
///
/// Base letters decide first, then accents (unaccented first), then case
/// (lowercase first), so `apple < Apple < Äpple < banana`.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| accent_key(a).cmp(&accent_key(b)))
        .then_with(|| case_key(a).cmp(case_key(b)))
}

fn collation_key(value: &str) -> String {
    value
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}

fn accent_key(value: &str) -> String {
    value.nfd().flat_map(char::to_lowercase).collect()
}

fn case_key(value: &str) -> impl Iterator<Item = (bool, char)> + '_ {
    value.nfd().map(|ch| (ch.is_uppercase(), ch))
}

fn matches_search(task: &Task, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    task.title.to_lowercase().contains(needle)
        || task.description.to_lowercase().contains(needle)
        || task.tags.join(",").to_lowercase().contains(needle)
}

/// Due date sort key with undated tasks last.
#[derive(PartialEq, Eq)]
struct DueKey(Option<chrono::NaiveDate>);

impl Ord for DueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl PartialOrd for DueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::{compare_titles, SortKey, StatusFilter};
    use crate::model::task::TaskStatus;
    use std::cmp::Ordering;

    #[test]
    fn compare_titles_ignores_case_and_accents() {
        assert_eq!(compare_titles("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_titles("Écrire", "Exporter"), Ordering::Less);
        assert_eq!(compare_titles("zebra", "Éclair"), Ordering::Greater);
    }

    #[test]
    fn compare_titles_breaks_ties_lowercase_first() {
        assert_eq!(compare_titles("apple", "Apple"), Ordering::Less);
        assert_eq!(compare_titles("Apple", "apple"), Ordering::Greater);
        assert_eq!(compare_titles("Apple", "Äpple"), Ordering::Less);
        assert_eq!(compare_titles("resume", "résumé"), Ordering::Less);
        assert_eq!(compare_titles("Task", "Task"), Ordering::Equal);
    }

    #[test]
    fn sort_key_falls_back_to_created_desc() {
        assert_eq!(SortKey::parse("due_asc"), SortKey::DueAsc);
        assert_eq!(SortKey::parse("title_asc"), SortKey::TitleAsc);
        assert_eq!(SortKey::parse("whatever"), SortKey::CreatedDesc);
    }

    #[test]
    fn status_filter_parses_sentinel_and_labels() {
        assert_eq!(StatusFilter::parse("All").unwrap(), StatusFilter::All);
        assert_eq!(
            StatusFilter::parse("Done").unwrap(),
            StatusFilter::Only(TaskStatus::Done)
        );
        assert!(StatusFilter::parse("all").is_err());
    }
}
