#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::{Cell, RefCell};
use tasktrack_core::{StoreError, StoreResult, Task, TaskStatus, TaskStore};
use uuid::Uuid;

/// In-memory store that can be told to fail writes.
#[derive(Default)]
pub struct MemoryStore {
    pub saved: RefCell<Vec<Task>>,
    pub saves: Cell<usize>,
    pub fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            saved: RefCell::new(tasks),
            ..Self::default()
        }
    }
}

impl TaskStore for MemoryStore {
    fn load(&self) -> Vec<Task> {
        self.saved.borrow().clone()
    }

    fn save(&self, tasks: &[Task]) -> StoreResult<()> {
        if self.fail_writes.get() {
            return Err(StoreError::QuotaExceeded { size: 1, limit: 0 });
        }
        *self.saved.borrow_mut() = tasks.to_vec();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

/// Store that accepts every write without keeping it.
pub struct NullStore;

impl TaskStore for NullStore {
    fn load(&self) -> Vec<Task> {
        Vec::new()
    }

    fn save(&self, _tasks: &[Task]) -> StoreResult<()> {
        Ok(())
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap()
}

/// Builds a task created `minutes` after [`base_time`].
pub fn task(title: &str, status: TaskStatus, minutes: i64) -> Task {
    Task {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: String::new(),
        due_date: None,
        assignee: None,
        tags: Vec::new(),
        status,
        created_at: base_time() + Duration::minutes(minutes),
    }
}

pub fn titles(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.title.as_str()).collect()
}
