//! Completion summary over the full task collection.

use crate::model::task::{Task, TaskStatus};

/// Status counts and completion percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub done: usize,
    pub in_progress: usize,
    pub pending: usize,
    /// `round(done / total * 100)`, half rounded up; `0` for an empty list.
    pub completion_percent: u8,
}

/// Counts tasks per status. Pass the whole collection, not a filtered view.
pub fn summarize(tasks: &[Task]) -> Summary {
    let mut summary = Summary {
        total: tasks.len(),
        ..Summary::default()
    };

    for task in tasks {
        match task.status {
            TaskStatus::Done => summary.done += 1,
            TaskStatus::InProgress => summary.in_progress += 1,
            TaskStatus::Pending => summary.pending += 1,
        }
    }

    summary.completion_percent = completion_percent(summary.done, summary.total);
    summary
}

fn completion_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // done <= total, so the result is within 0..=100.
    ((done * 200 + total) / (total * 2)) as u8
}
