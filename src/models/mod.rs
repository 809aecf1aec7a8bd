mod note;
mod session;
mod task;

pub use note::{NewNote, Note, NoteKind};
pub use session::PomodoroSession;
pub use task::{format_duration, NewTask, Task};
