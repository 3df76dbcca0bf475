mod common;

use common::task;
use tasktrack_core::{summarize, Summary, TaskStatus};

#[test]
fn summarize_counts_statuses_and_percent() {
    let tasks = vec![
        task("a", TaskStatus::Done, 0),
        task("b", TaskStatus::Done, 1),
        task("c", TaskStatus::Pending, 2),
        task("d", TaskStatus::InProgress, 3),
    ];

    assert_eq!(
        summarize(&tasks),
        Summary {
            total: 4,
            done: 2,
            in_progress: 1,
            pending: 1,
            completion_percent: 50,
        }
    );
}

#[test]
fn summarize_empty_collection_is_zero() {
    assert_eq!(summarize(&[]), Summary::default());
}

#[test]
fn summarize_rounds_to_nearest_percent() {
    let tasks = vec![
        task("a", TaskStatus::Done, 0),
        task("b", TaskStatus::Done, 1),
        task("c", TaskStatus::Pending, 2),
    ];
    assert_eq!(summarize(&tasks).completion_percent, 67);
}
