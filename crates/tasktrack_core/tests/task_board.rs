mod common;

use common::{titles, MemoryStore};
use std::collections::VecDeque;
use tasktrack_core::{
    BoardFrame, BoardRenderer, ConfirmPrompt, Notice, NoticeLevel, RepoError, SortKey,
    StatusFilter, TaskBoard, TaskInput, TaskRepository, TaskStatus,
};
use uuid::Uuid;

#[derive(Default)]
struct RecordingRenderer {
    frames: Vec<BoardFrame>,
    notices: Vec<Notice>,
}

impl BoardRenderer for RecordingRenderer {
    fn render(&mut self, frame: &BoardFrame) {
        self.frames.push(frame.clone());
    }

    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}

/// Answers prompts from a script, then declines.
struct ScriptedPrompt {
    answers: VecDeque<bool>,
}

impl ConfirmPrompt for ScriptedPrompt {
    fn confirm(&mut self, _message: &str) -> bool {
        self.answers.pop_front().unwrap_or(false)
    }
}

fn board_with<'a>(
    store: &'a MemoryStore,
    answers: &[bool],
) -> TaskBoard<&'a MemoryStore, RecordingRenderer, ScriptedPrompt> {
    TaskBoard::new(
        TaskRepository::open(store),
        RecordingRenderer::default(),
        ScriptedPrompt {
            answers: answers.iter().copied().collect(),
        },
    )
}

#[test]
fn submit_new_task_renders_updated_frame() {
    let store = MemoryStore::default();
    let mut board = board_with(&store, &[]);

    let created = board
        .on_submit_new_task(TaskInput::new("Fix API Bug").with_tag_field("api"))
        .unwrap();

    let frame = board.renderer().frames.last().unwrap();
    assert_eq!(frame.tasks, vec![created]);
    assert_eq!(frame.summary.total, 1);
    assert_eq!(frame.summary.pending, 1);
    assert!(board.renderer().notices.is_empty());
}

#[test]
fn blank_title_shows_inline_error_and_skips_render() {
    let store = MemoryStore::default();
    let mut board = board_with(&store, &[]);

    let err = board.on_submit_new_task(TaskInput::new("  ")).unwrap_err();

    assert!(matches!(err, RepoError::Validation(_)));
    assert!(board.renderer().frames.is_empty());
    let notice = &board.renderer().notices[0];
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "Title is required!");
}

#[test]
fn edit_and_status_change_flow_through_repository() {
    let store = MemoryStore::default();
    let mut board = board_with(&store, &[]);
    let created = board.on_submit_new_task(TaskInput::new("draft")).unwrap();

    let mut edit = created.to_input();
    edit.title = "final".to_string();
    board.on_submit_edit_task(created.id, edit).unwrap();
    board.on_status_change(created.id, "Done").unwrap();

    let task = board.repository().get(created.id).unwrap();
    assert_eq!(task.title, "final");
    assert_eq!(task.status, TaskStatus::Done);
    assert_eq!(task.created_at, created.created_at);
    assert_eq!(
        board.renderer().frames.last().unwrap().summary.completion_percent,
        100
    );

    let err = board.on_status_change(created.id, "Archived").unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(
        board.renderer().notices.last().unwrap().level,
        NoticeLevel::Error
    );
}

#[test]
fn delete_requires_confirmation() {
    let store = MemoryStore::default();
    let mut board = board_with(&store, &[false, true, true]);
    let created = board.on_submit_new_task(TaskInput::new("doomed")).unwrap();

    assert_eq!(board.on_delete_request(created.id).unwrap(), None);
    assert_eq!(board.repository().len(), 1);

    let removed = board.on_delete_request(created.id).unwrap();
    assert_eq!(removed.map(|task| task.id), Some(created.id));
    assert!(board.repository().is_empty());

    let err = board.on_delete_request(created.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
    assert_eq!(
        board.renderer().notices.last().unwrap().level,
        NoticeLevel::Info
    );
}

#[test]
fn clear_all_requires_confirmation() {
    let store = MemoryStore::default();
    let mut board = board_with(&store, &[false, true]);
    board.on_submit_new_task(TaskInput::new("a")).unwrap();
    board.on_submit_new_task(TaskInput::new("b")).unwrap();

    assert!(!board.on_clear_all_request().unwrap());
    assert_eq!(board.repository().len(), 2);

    assert!(board.on_clear_all_request().unwrap());
    assert!(board.repository().is_empty());
    assert!(store.saved.borrow().is_empty());
}

#[test]
fn import_sample_replaces_collection_with_two_seed_tasks() {
    let store = MemoryStore::default();
    let mut board = board_with(&store, &[]);
    board.on_submit_new_task(TaskInput::new("old")).unwrap();

    board.on_import_sample().unwrap();

    let tasks = board.repository().list();
    assert_eq!(tasks.len(), 2);
    assert_eq!(titles(tasks), vec!["Fix API Bug", "Design Login"]);
    assert_ne!(tasks[0].id, tasks[1].id);
    assert_eq!(tasks[1].status, TaskStatus::InProgress);
}

#[test]
fn view_controls_recompute_without_touching_summary_scope() {
    let store = MemoryStore::default();
    let mut board = board_with(&store, &[]);
    board.on_import_sample().unwrap();

    board.on_search_changed("api");
    let frame = board.renderer().frames.last().unwrap();
    assert_eq!(titles(&frame.tasks), vec!["Fix API Bug"]);
    assert_eq!(frame.summary.total, 2);

    board.on_search_changed("");
    board.on_sort_changed("due_asc");
    let frame = board.renderer().frames.last().unwrap();
    assert_eq!(titles(&frame.tasks), vec!["Design Login", "Fix API Bug"]);
    assert_eq!(frame.query.sort_key, SortKey::DueAsc);

    board.on_filter_changed("Pending").unwrap();
    let frame = board.renderer().frames.last().unwrap();
    assert_eq!(titles(&frame.tasks), vec!["Fix API Bug"]);
    assert_eq!(frame.summary.in_progress, 1);

    assert!(board.on_filter_changed("pending").is_err());
    assert_eq!(
        board.query().status_filter,
        StatusFilter::Only(TaskStatus::Pending)
    );
}

#[test]
fn storage_failure_surfaces_warning_and_keeps_state() {
    let store = MemoryStore::default();
    let mut board = board_with(&store, &[]);
    let kept = board.on_submit_new_task(TaskInput::new("kept")).unwrap();
    store.fail_writes.set(true);

    let err = board.on_submit_new_task(TaskInput::new("lost")).unwrap_err();

    assert!(matches!(err, RepoError::Storage(_)));
    assert_eq!(board.repository().list(), &[kept]);
    let notice = board.renderer().notices.last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert!(notice.message.starts_with("Could not save changes"));
}

#[test]
fn unknown_id_is_a_no_op_notice() {
    let store = MemoryStore::default();
    let mut board = board_with(&store, &[]);

    let err = board
        .on_submit_edit_task(Uuid::new_v4(), TaskInput::new("x"))
        .unwrap_err();

    assert!(matches!(err, RepoError::NotFound(_)));
    assert_eq!(board.renderer().notices[0].level, NoticeLevel::Info);
}
