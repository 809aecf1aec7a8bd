use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

pub mod menu;
pub mod note;
pub mod pomodoro;
pub mod stats;
pub mod task;
pub mod ui;
pub mod user;

pub use menu::run_menu;
pub use note::run_notes;
pub use pomodoro::run_pomodoro;
pub use stats::run_stats;
pub use task::run_tasks;
pub use user::run_user;

use crate::config::Config;
use crate::notify::Notifier;
use crate::store::{RecordStore, SqliteStore};
use crate::user::{UserContext, UserHandle};
use crate::cli::ui::ConsoleNotifier;

#[derive(Parser)]
#[command(name = "dayplan")]
#[command(about = "Daily notes, tasks and a pomodoro timer for the command line")]
#[command(version)]
pub struct Cli {
    /// Act as this user instead of the configured one
    #[arg(short, long, global = true)]
    pub user: Option<String>,
    /// Database file (default: config dir, or DAYPLAN_DB)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show today's notes, or write one
    Notes(NotesArgs),
    /// List and manage tasks
    Tasks(TasksArgs),
    /// Run a pomodoro countdown
    Pomodoro(PomodoroArgs),
    /// Pomodoro sessions completed today
    Stats,
    /// Show or set the default user name
    User(UserArgs),
}

#[derive(Args)]
pub struct NotesArgs {
    /// "morning" or "evening"
    pub kind: Option<String>,
    /// Note text; prompts with the current note when omitted
    pub text: Option<String>,
}

#[derive(Args)]
pub struct TasksArgs {
    #[command(subcommand)]
    pub command: Option<TaskCommands>,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List tasks, newest first
    List,
    /// Browse tasks interactively
    Browse,
    /// Add a task
    Add {
        /// What needs doing
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
        /// Estimated minutes
        #[arg(short, long, default_value = "30")]
        minutes: String,
    },
    /// Mark a task as done
    Done {
        /// Task id or unique prefix
        id: String,
    },
    /// Mark a task as not done
    Undo {
        /// Task id or unique prefix
        id: String,
    },
    /// Delete a task
    Rm {
        /// Task id or unique prefix
        id: String,
    },
}

#[derive(Args)]
pub struct PomodoroArgs {
    /// Session length in minutes (5-60, steps of 5)
    #[arg(short, long)]
    pub minutes: Option<u32>,
}

#[derive(Args)]
pub struct UserArgs {
    /// New default user name
    pub name: Option<String>,
}

/// Everything a command needs: the store, the active user and a notifier
pub struct App {
    store: Arc<SqliteStore>,
    users: UserHandle,
    notifier: Arc<dyn Notifier>,
    pub config: Config,
}

impl App {
    pub fn new(store: SqliteStore, config: Config) -> Self {
        Self {
            store: Arc::new(store),
            users: UserHandle::new(&config.user_name),
            notifier: Arc::new(ConsoleNotifier),
            config,
        }
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        self.store.clone()
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        self.notifier.clone()
    }

    pub fn user(&self) -> UserContext {
        self.users.subscribe()
    }

    /// Switch the active user; mounted panels refetch on their next refresh
    pub fn switch_user(&mut self, name: &str) {
        self.config.user_name = name.to_string();
        self.users.set(name);
    }
}
