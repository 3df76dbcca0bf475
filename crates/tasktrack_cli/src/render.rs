//! Plain-text renderer and stdin confirmation prompt.

use std::io::{self, BufRead, Write};
use tasktrack_core::{
    BoardFrame, BoardRenderer, ConfirmPrompt, Notice, NoticeLevel, Summary, Task,
};

/// Keeps the latest frame so a command prints once, after all handlers ran.
#[derive(Debug, Default)]
pub struct TextRenderer {
    frame: Option<BoardFrame>,
}

impl TextRenderer {
    pub fn print_tasks(&self) {
        let Some(frame) = &self.frame else {
            return;
        };
        if frame.tasks.is_empty() {
            println!("No tasks match.");
        }
        for task in &frame.tasks {
            println!("{}", format_task(task));
        }
        println!();
        println!("{}", format_summary(&frame.summary));
    }

    pub fn print_summary(&self) {
        if let Some(frame) = &self.frame {
            println!("{}", format_summary(&frame.summary));
        }
    }
}

impl BoardRenderer for TextRenderer {
    fn render(&mut self, frame: &BoardFrame) {
        self.frame = Some(frame.clone());
    }

    fn notify(&mut self, notice: &Notice) {
        let prefix = match notice.level {
            NoticeLevel::Info => "note",
            NoticeLevel::Error => "error",
            NoticeLevel::Warning => "warning",
        };
        eprintln!("{prefix}: {}", notice.message);
    }
}

/// Asks on stdin unless `assume_yes` is set.
pub struct StdinPrompt {
    pub assume_yes: bool,
}

impl ConfirmPrompt for StdinPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{message} [y/N] ");
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

pub fn format_task(task: &Task) -> String {
    let description = if task.description.is_empty() {
        "No description"
    } else {
        task.description.as_str()
    };
    let mut out = format!(
        "[{}] {}  ({})\n    {}\n    Due: {} | {}",
        task.status,
        task.title,
        task.id,
        description,
        task.due_date.as_deref().unwrap_or("No due date"),
        task.assignee.as_deref().unwrap_or("Unassigned"),
    );
    if !task.tags.is_empty() {
        out.push_str(&format!("\n    Tags: {}", task.tags.join(", ")));
    }
    out
}

pub fn format_summary(summary: &Summary) -> String {
    format!(
        "Total: {} | Done: {} | In Progress: {} | Pending: {} | {}% complete",
        summary.total,
        summary.done,
        summary.in_progress,
        summary.pending,
        summary.completion_percent
    )
}
