//! Task repository.
//!
//! # Responsibility
//! - Own the live task collection exclusively.
//! - Provide create/update/status/remove/clear/import operations.
//! - Keep memory and durable store consistent on every write.
//!
//! # Invariants
//! - Ids are unique across the live collection and generated fresh.
//! - `created_at` is set once on create and preserved on update.
//! - Storage order is creation order; imports keep record order.

use crate::model::task::{
    generate_id, now_utc, Task, TaskId, TaskInput, TaskRecord, TaskStatus, TaskValidationError,
};
use crate::store::task_store::{StoreError, TaskStore};
use log::{error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository operation failure.
#[derive(Debug)]
pub enum RepoError {
    /// Input rejected; collection unchanged.
    Validation(TaskValidationError),
    /// Referenced id is not in the live collection.
    NotFound(TaskId),
    /// Persist failed; collection rolled back.
    Storage(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}

/// How to undo one in-memory mutation when the persist step fails.
enum Undo {
    Pop,
    Restore(usize, Task),
    Reinsert(usize, Task),
    Replace(Vec<Task>),
}

/// In-memory task collection backed by a durable [`TaskStore`].
pub struct TaskRepository<S: TaskStore> {
    store: S,
    tasks: Vec<Task>,
}

impl<S: TaskStore> TaskRepository<S> {
    /// Loads the stored collection and takes ownership of the store.
    pub fn open(store: S) -> Self {
        let tasks = store.load();
        info!(
            "event=repo_open module=repo status=ok count={}",
            tasks.len()
        );
        Self { store, tasks }
    }

    /// Read-only snapshot of the live collection in storage order.
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up one task by id.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Validates and appends a new task with a fresh id and `created_at`.
    pub fn add(&mut self, input: TaskInput) -> RepoResult<Task> {
        let input = self.validated("add", input)?;
        let task = Task::from_input(self.fresh_id(), input, now_utc());

        self.tasks.push(task.clone());
        self.commit("add", Undo::Pop)?;

        info!(
            "event=task_add module=repo status=ok task_id={} count={}",
            task.id,
            self.tasks.len()
        );
        Ok(task)
    }

    /// Replaces all mutable fields of an existing task.
    pub fn update(&mut self, id: TaskId, input: TaskInput) -> RepoResult<Task> {
        let index = self.position("update", id)?;
        let input = self.validated("update", input)?;

        let previous = self.tasks[index].clone();
        self.tasks[index].apply(input);
        self.commit("update", Undo::Restore(index, previous))?;

        info!("event=task_update module=repo status=ok task_id={id}");
        Ok(self.tasks[index].clone())
    }

    /// Changes only the status of an existing task.
    pub fn set_status(&mut self, id: TaskId, status: TaskStatus) -> RepoResult<Task> {
        let index = self.position("set_status", id)?;

        let previous = self.tasks[index].clone();
        self.tasks[index].status = status;
        self.commit("set_status", Undo::Restore(index, previous))?;

        info!("event=task_set_status module=repo status=ok task_id={id} task_status={status}");
        Ok(self.tasks[index].clone())
    }

    /// Like [`set_status`](Self::set_status) but takes the raw status label.
    ///
    /// Fails with `NotFound` before the label is checked.
    pub fn set_status_label(&mut self, id: TaskId, label: &str) -> RepoResult<Task> {
        self.position("set_status", id)?;
        let status = TaskStatus::parse(label).map_err(|err| {
            warn!("event=task_set_status module=repo status=rejected task_id={id} error={err}");
            RepoError::from(err)
        })?;
        self.set_status(id, status)
    }

    /// Removes a task. A second removal of the same id is `NotFound`.
    pub fn remove(&mut self, id: TaskId) -> RepoResult<Task> {
        let index = self.position("remove", id)?;

        let removed = self.tasks.remove(index);
        self.commit("remove", Undo::Reinsert(index, removed.clone()))?;

        info!(
            "event=task_remove module=repo status=ok task_id={id} count={}",
            self.tasks.len()
        );
        Ok(removed)
    }

    /// Empties the collection.
    pub fn clear(&mut self) -> RepoResult<()> {
        let previous = std::mem::take(&mut self.tasks);
        let removed = previous.len();
        self.commit("clear", Undo::Replace(previous))?;

        info!("event=task_clear module=repo status=ok removed={removed}");
        Ok(())
    }

    /// Overwrites the whole collection with imported records.
    ///
    /// All records are validated before anything changes. Records without
    /// an id, with a nil id, or repeating an earlier record's id get a fresh
    /// one; records without `created_at` get the import time.
    pub fn replace_all(&mut self, records: Vec<TaskRecord>) -> RepoResult<()> {
        let imported_at = now_utc();
        let mut seen = HashSet::with_capacity(records.len());
        let mut next = Vec::with_capacity(records.len());

        for record in records {
            let (id, created_at, input) = record.into_parts();
            let input = self.validated("replace_all", input)?;
            let id = match id {
                Some(id) if !id.is_nil() && seen.insert(id) => id,
                _ => {
                    let id = generate_id(|candidate| seen.contains(&candidate));
                    seen.insert(id);
                    id
                }
            };
            next.push(Task::from_input(
                id,
                input,
                created_at.unwrap_or(imported_at),
            ));
        }

        let previous = std::mem::replace(&mut self.tasks, next);
        self.commit("replace_all", Undo::Replace(previous))?;

        info!(
            "event=task_replace_all module=repo status=ok count={}",
            self.tasks.len()
        );
        Ok(())
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn validated(&self, op: &str, input: TaskInput) -> RepoResult<TaskInput> {
        input.normalize().map_err(|err| {
            warn!("event=task_{op} module=repo status=rejected error={err}");
            RepoError::Validation(err)
        })
    }

    fn position(&self, op: &str, id: TaskId) -> RepoResult<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| {
                warn!("event=task_{op} module=repo status=not_found task_id={id}");
                RepoError::NotFound(id)
            })
    }

    fn fresh_id(&self) -> TaskId {
        generate_id(|candidate| self.tasks.iter().any(|task| task.id == candidate))
    }

    fn commit(&mut self, op: &str, undo: Undo) -> RepoResult<()> {
        let err = match self.store.save(&self.tasks) {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        match undo {
            Undo::Pop => {
                self.tasks.pop();
            }
            Undo::Restore(index, task) => self.tasks[index] = task,
            Undo::Reinsert(index, task) => self.tasks.insert(index, task),
            Undo::Replace(tasks) => self.tasks = tasks,
        }

        error!(
            "event=task_{op} module=repo status=error error_code=storage_failed rolled_back=true error={err}"
        );
        Err(RepoError::Storage(err))
    }
}
