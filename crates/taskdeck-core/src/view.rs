//! Derived view engine.
//!
//! Pure, synchronous projection of the raw task list into what the
//! presentation layer actually renders: searched, filtered, sorted.
//! Cheap enough to recompute on every input change; no memoization.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskStatus};

/// Status filter for the task view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusFilter {
    /// Keep every task regardless of status.
    #[default]
    All,
    Todo,
    InProgress,
    Done,
}

impl StatusFilter {
    /// Whether a task with the given status passes this filter.
    pub fn matches(&self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Todo => status == TaskStatus::Todo,
            Self::InProgress => status == TaskStatus::InProgress,
            Self::Done => status == TaskStatus::Done,
        }
    }
}

impl From<TaskStatus> for StatusFilter {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Todo => Self::Todo,
            TaskStatus::InProgress => Self::InProgress,
            TaskStatus::Done => Self::Done,
        }
    }
}

/// Sort order for the task view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Newest first. This is the order snapshots already arrive in.
    #[default]
    CreatedDesc,
    /// Earliest due date first; tasks without one last.
    DueDateAsc,
    /// Latest due date first; tasks without one last.
    DueDateDesc,
}

/// Transient, UI-local view parameters. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewParams {
    /// Case-insensitive substring matched against title or description.
    /// Empty matches everything.
    pub search_query: String,
    pub status_filter: StatusFilter,
    pub sort_key: SortKey,
}

/// Computes the derived view: search, then filter, then sort.
///
/// Deterministic and side-effect free. The sort is stable, so tasks
/// that compare equal keep their relative input order (which is
/// `createdAt`-descending as delivered by the subscription).
pub fn project(tasks: &[Task], params: &ViewParams) -> Vec<Task> {
    let query = params.search_query.to_lowercase();

    let mut result: Vec<Task> = tasks
        .iter()
        .filter(|task| matches_query(task, &query))
        .filter(|task| params.status_filter.matches(task.status))
        .cloned()
        .collect();

    match params.sort_key {
        SortKey::CreatedDesc => {
            result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        SortKey::DueDateAsc => {
            result.sort_by(|a, b| compare_due_dates(a, b, Direction::Asc));
        }
        SortKey::DueDateDesc => {
            result.sort_by(|a, b| compare_due_dates(a, b, Direction::Desc));
        }
    }

    result
}

#[derive(Clone, Copy)]
enum Direction {
    Asc,
    Desc,
}

fn matches_query(task: &Task, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    task.title.to_lowercase().contains(query)
        || task
            .description
            .as_ref()
            .is_some_and(|description| description.to_lowercase().contains(query))
}

/// Due-date order in the given direction. A task with no due date
/// sorts after every task that has one, regardless of direction.
fn compare_due_dates(a: &Task, b: &Task, direction: Direction) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => match direction {
            Direction::Asc => x.cmp(&y),
            Direction::Desc => y.cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
