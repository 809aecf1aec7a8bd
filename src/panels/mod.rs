//! The three productivity panels.
//!
//! Each panel owns its view state, talks to a [`RecordStore`](crate::store::RecordStore)
//! and reports through a [`Notifier`](crate::notify::Notifier). Store and input
//! failures are caught inside the panel, notified, and summarised as an
//! [`Outcome`]; they never propagate to the caller.

pub mod notes;
pub mod pomodoro;
pub mod tasks;

pub use notes::{DayKey, NotesPanel};
pub use pomodoro::{format_clock, DurationControl, PomodoroTimer, TimerEvent, TimerState};
pub use tasks::{TaskForm, TaskList};

/// What a user action ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The store accepted the change and local state was updated
    Applied,
    /// Nothing to do (e.g. saving an empty note)
    Unchanged,
    /// Input was invalid; the store was not called
    Rejected,
    /// The store call failed
    Failed,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Notification texts
pub mod messages {
    pub const NOTES_FETCH_FAILED: &str = "Failed to fetch notes";
    pub const NOTE_SAVED: &str = "Note saved successfully";
    pub const NOTE_SAVE_FAILED: &str = "Failed to save note";

    pub const TASKS_FETCH_FAILED: &str = "Failed to fetch tasks";
    pub const TASK_ADDED: &str = "Task added successfully";
    pub const TASK_ADD_FAILED: &str = "Failed to add task";
    pub const TASK_UPDATE_FAILED: &str = "Failed to update task";
    pub const TASK_DELETED: &str = "Task deleted successfully";
    pub const TASK_DELETE_FAILED: &str = "Failed to delete task";

    pub const SESSION_COMPLETE: &str = "Pomodoro session completed!";
    pub const SESSION_SAVE_FAILED: &str = "Failed to save session";
}
