//! Task board use-case service.
//!
//! # Responsibility
//! - Receive front-end actions (submit, edit, status, delete, clear,
//!   import, search/filter/sort changes) and route them to the repository.
//! - Recompute the view and summary after each action and hand them to
//!   the injected renderer.
//! - Turn repository errors into user-facing notices.
//!
//! # Invariants
//! - Destructive actions (delete, clear) run only after confirmation.
//! - The summary always covers the whole collection, never the view.

use crate::analytics::{summarize, Summary};
use crate::model::task::{Task, TaskId, TaskInput, TaskRecord, TaskStatus, TaskValidationError};
use crate::query::view::{view, SortKey, StatusFilter, ViewQuery};
use crate::repo::task_repo::{RepoError, RepoResult, TaskRepository};
use crate::store::task_store::TaskStore;
use log::debug;

const CONFIRM_DELETE: &str = "Delete this task?";
const CONFIRM_CLEAR: &str = "Clear all tasks?";

/// Everything a front end needs to draw the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardFrame {
    /// Visible tasks after search, filter and sort.
    pub tasks: Vec<Task>,
    /// Counts over the full collection.
    pub summary: Summary,
    /// Parameters that produced `tasks`.
    pub query: ViewQuery,
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Nothing happened, e.g. the task was already gone.
    Info,
    /// Input rejected; shown inline next to the form.
    Error,
    /// Storage failed; changes were not kept.
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn from_repo_error(err: &RepoError) -> Self {
        match err {
            RepoError::Validation(inner) => Self::from_validation_error(inner),
            RepoError::NotFound(_) => Self {
                level: NoticeLevel::Info,
                message: "That task no longer exists; nothing was changed.".to_string(),
            },
            RepoError::Storage(inner) => Self {
                level: NoticeLevel::Warning,
                message: format!("Could not save changes: {inner}"),
            },
        }
    }

    fn from_validation_error(err: &TaskValidationError) -> Self {
        let message = match err {
            TaskValidationError::EmptyTitle => "Title is required!".to_string(),
            other => other.to_string(),
        };
        Self {
            level: NoticeLevel::Error,
            message,
        }
    }
}

/// Rendering collaborator implemented by the front end.
pub trait BoardRenderer {
    fn render(&mut self, frame: &BoardFrame);
    fn notify(&mut self, notice: &Notice);
}

/// Confirmation collaborator for destructive actions.
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

/// Front-end facing controller over one repository.
pub struct TaskBoard<S: TaskStore, R: BoardRenderer, C: ConfirmPrompt> {
    repo: TaskRepository<S>,
    query: ViewQuery,
    renderer: R,
    prompt: C,
}

impl<S: TaskStore, R: BoardRenderer, C: ConfirmPrompt> TaskBoard<S, R, C> {
    pub fn new(repo: TaskRepository<S>, renderer: R, prompt: C) -> Self {
        Self {
            repo,
            query: ViewQuery::default(),
            renderer,
            prompt,
        }
    }

    pub fn repository(&self) -> &TaskRepository<S> {
        &self.repo
    }

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Computes the current frame without rendering it.
    pub fn frame(&self) -> BoardFrame {
        BoardFrame {
            tasks: view(self.repo.list(), &self.query),
            summary: summarize(self.repo.list()),
            query: self.query.clone(),
        }
    }

    /// Re-renders the current frame.
    pub fn refresh(&mut self) {
        let frame = self.frame();
        debug!(
            "event=board_render module=service status=ok visible={} total={}",
            frame.tasks.len(),
            frame.summary.total
        );
        self.renderer.render(&frame);
    }

    pub fn on_submit_new_task(&mut self, input: TaskInput) -> RepoResult<Task> {
        let result = self.repo.add(input);
        self.settle(result)
    }

    pub fn on_submit_edit_task(&mut self, id: TaskId, input: TaskInput) -> RepoResult<Task> {
        let result = self.repo.update(id, input);
        self.settle(result)
    }

    /// Applies a status chosen from the status picker.
    pub fn on_status_change(&mut self, id: TaskId, new_status: &str) -> RepoResult<Task> {
        let result = self.repo.set_status_label(id, new_status);
        self.settle(result)
    }

    /// Removes a task after confirmation. Returns `Ok(None)` when declined.
    pub fn on_delete_request(&mut self, id: TaskId) -> RepoResult<Option<Task>> {
        if !self.prompt.confirm(CONFIRM_DELETE) {
            debug!("event=board_delete module=service status=declined task_id={id}");
            return Ok(None);
        }
        let result = self.repo.remove(id);
        self.settle(result).map(Some)
    }

    /// Clears every task after confirmation. Returns `Ok(false)` when declined.
    pub fn on_clear_all_request(&mut self) -> RepoResult<bool> {
        if !self.prompt.confirm(CONFIRM_CLEAR) {
            debug!("event=board_clear module=service status=declined");
            return Ok(false);
        }
        let result = self.repo.clear();
        self.settle(result).map(|()| true)
    }

    /// Replaces the collection with the fixed seed dataset.
    pub fn on_import_sample(&mut self) -> RepoResult<()> {
        let result = self.repo.replace_all(sample_tasks());
        self.settle(result)
    }

    pub fn on_search_changed(&mut self, text: impl Into<String>) {
        self.query.search_text = text.into();
        self.refresh();
    }

    /// Applies `All` or a status label. Unknown labels keep the old filter.
    pub fn on_filter_changed(&mut self, status: &str) -> Result<(), TaskValidationError> {
        match StatusFilter::parse(status) {
            Ok(filter) => {
                self.query.status_filter = filter;
                self.refresh();
                Ok(())
            }
            Err(err) => {
                self.renderer.notify(&Notice::from_validation_error(&err));
                Err(err)
            }
        }
    }

    pub fn on_sort_changed(&mut self, key: &str) {
        self.query.sort_key = SortKey::parse(key);
        self.refresh();
    }

    fn settle<T>(&mut self, result: RepoResult<T>) -> RepoResult<T> {
        match &result {
            Ok(_) => self.refresh(),
            Err(err) => self.renderer.notify(&Notice::from_repo_error(err)),
        }
        result
    }
}

/// Fixed two-item seed dataset used by "import sample".
pub fn sample_tasks() -> Vec<TaskRecord> {
    vec![
        TaskRecord::new(TaskInput {
            title: "Fix API Bug".to_string(),
            description: "Resolve the 500 error returned by the tasks endpoint".to_string(),
            due_date: Some("2025-10-10".to_string()),
            assignee: Some("Alex".to_string()),
            tags: vec!["backend".to_string(), "api".to_string()],
            status: TaskStatus::Pending,
        }),
        TaskRecord::new(TaskInput {
            title: "Design Login".to_string(),
            description: "Create responsive login page mockups".to_string(),
            due_date: Some("2025-10-05".to_string()),
            assignee: Some("Sam".to_string()),
            tags: vec!["design".to_string(), "ui".to_string()],
            status: TaskStatus::InProgress,
        }),
    ]
}
