//! Command line front end for the task tracker.
//!
//! Each invocation opens the store, runs one board action, prints the
//! resulting view and exits. Failures already reported as notices exit
//! with status 1.

mod render;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use render::{format_task, StdinPrompt, TextRenderer};
use std::path::PathBuf;
use std::process::ExitCode;
use tasktrack_core::db::open_db;
use tasktrack_core::{
    core_version, init_logging, split_tag_field, AppConfig, RepoResult, SqliteTaskStore,
    TaskBoard, TaskId, TaskInput, TaskRepository, TaskStatus,
};

type Board<'conn> = TaskBoard<SqliteTaskStore<'conn>, TextRenderer, StdinPrompt>;

#[derive(Parser, Debug)]
#[command(name = "tasktrack", version, about = "Local task tracker")]
struct Cli {
    /// Database file (overrides TASKTRACK_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error (overrides TASKTRACK_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute log directory (overrides TASKTRACK_LOG_DIR)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Answer yes to confirmation prompts
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a task
    Add {
        title: String,
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Edit a task; omitted fields keep their current value
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Change the status of a task
    Status { id: String, status: String },

    /// Delete a task
    Rm { id: String },

    /// Delete every task
    Clear,

    /// Replace all tasks with the sample dataset
    ImportSample,

    /// Show tasks
    List {
        /// Match title, description or tags (case-insensitive)
        #[arg(long, default_value = "")]
        search: String,

        /// All | Pending | "In Progress" | Done
        #[arg(long, default_value = "All")]
        status: String,

        /// created_desc | due_asc | title_asc
        #[arg(long, default_value = "created_desc")]
        sort: String,
    },

    /// Show completion counts
    Summary,

    /// Print the core library version
    Version,
}

#[derive(Args, Debug, Default)]
struct FieldArgs {
    #[arg(long)]
    description: Option<String>,

    /// Due date, YYYY-MM-DD (empty to clear)
    #[arg(long)]
    due: Option<String>,

    #[arg(long)]
    assignee: Option<String>,

    /// Comma-separated tags
    #[arg(long)]
    tags: Option<String>,

    /// Pending | "In Progress" | Done
    #[arg(long, value_parser = parse_status)]
    status: Option<TaskStatus>,
}

impl FieldArgs {
    fn apply_to(self, mut input: TaskInput) -> TaskInput {
        if let Some(description) = self.description {
            input.description = description;
        }
        if let Some(due) = self.due {
            input.due_date = Some(due);
        }
        if let Some(assignee) = self.assignee {
            input.assignee = Some(assignee);
        }
        if let Some(tags) = self.tags {
            input.tags = split_tag_field(&tags);
        }
        if let Some(status) = self.status {
            input.status = status;
        }
        input
    }
}

fn parse_status(value: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(value).map_err(|err| err.to_string())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("invalid environment configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(dir) = cli.log_dir {
        config.log_dir = dir;
    }

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let repo = TaskRepository::open(SqliteTaskStore::new(&conn));
    let mut board = TaskBoard::new(
        repo,
        TextRenderer::default(),
        StdinPrompt {
            assume_yes: cli.yes,
        },
    );

    run(&mut board, cli.command)
}

fn run(board: &mut Board<'_>, command: Command) -> Result<ExitCode> {
    match command {
        Command::Add { title, fields } => {
            let input = fields.apply_to(TaskInput::new(title));
            report(board.on_submit_new_task(input), |task| {
                println!("Added\n{}", format_task(&task));
            })
        }
        Command::Edit { id, title, fields } => {
            let id = resolve_id(board, &id)?;
            let mut input = board
                .repository()
                .get(id)
                .map(|task| task.to_input())
                .unwrap_or_default();
            if let Some(title) = title {
                input.title = title;
            }
            report(board.on_submit_edit_task(id, fields.apply_to(input)), |task| {
                println!("Updated\n{}", format_task(&task));
            })
        }
        Command::Status { id, status } => {
            let id = resolve_id(board, &id)?;
            report(board.on_status_change(id, &status), |task| {
                println!("{} is now {}", task.title, task.status);
            })
        }
        Command::Rm { id } => {
            let id = resolve_id(board, &id)?;
            report(board.on_delete_request(id), |removed| {
                if let Some(task) = removed {
                    println!("Deleted {}", task.title);
                }
            })
        }
        Command::Clear => report(board.on_clear_all_request(), |cleared| {
            if cleared {
                println!("All tasks cleared.");
            }
        }),
        Command::ImportSample => report(board.on_import_sample(), |()| {
            println!("Sample tasks imported. Run `tasktrack list` to see them.");
        }),
        Command::List {
            search,
            status,
            sort,
        } => {
            board.on_sort_changed(&sort);
            board.on_search_changed(search);
            if board.on_filter_changed(&status).is_err() {
                return Ok(ExitCode::FAILURE);
            }
            board.renderer().print_tasks();
            Ok(ExitCode::SUCCESS)
        }
        Command::Summary => {
            board.refresh();
            board.renderer().print_summary();
            Ok(ExitCode::SUCCESS)
        }
        Command::Version => {
            println!("tasktrack_core {}", core_version());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Errors were already shown as notices; only the exit status is left.
fn report<T>(result: RepoResult<T>, on_ok: impl FnOnce(T)) -> Result<ExitCode> {
    match result {
        Ok(value) => {
            on_ok(value);
            Ok(ExitCode::SUCCESS)
        }
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

/// Accepts a full id or a unique prefix of one.
fn resolve_id(board: &Board<'_>, raw: &str) -> Result<TaskId> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<TaskId>() {
        return Ok(id);
    }

    let prefix = raw.to_ascii_lowercase();
    let mut matches = board
        .repository()
        .list()
        .iter()
        .filter(|task| task.id.to_string().starts_with(&prefix))
        .map(|task| task.id);

    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id),
        (Some(_), Some(_)) => bail!("task id prefix `{raw}` is ambiguous"),
        (None, _) => bail!("no task id starts with `{raw}`"),
    }
}
