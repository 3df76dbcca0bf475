//! Core logic for the task tracker.
//! This crate is the single source of truth for task invariants.

pub mod analytics;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod store;

pub use analytics::{summarize, Summary};
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{
    normalize_tags, split_tag_field, Task, TaskId, TaskInput, TaskRecord, TaskStatus,
    TaskValidationError,
};
pub use query::view::{view, SortKey, StatusFilter, ViewQuery};
pub use repo::task_repo::{RepoError, RepoResult, TaskRepository};
pub use service::board::{
    sample_tasks, BoardFrame, BoardRenderer, ConfirmPrompt, Notice, NoticeLevel, TaskBoard,
};
pub use store::task_store::{SqliteTaskStore, StoreError, StoreResult, TaskStore, TASKS_KEY};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
