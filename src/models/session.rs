use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A finished pomodoro. Written once, when the countdown reaches zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroSession {
    pub owner: String,
    pub duration_seconds: u32,
    pub completed_at: DateTime<Utc>,
}

impl PomodoroSession {
    pub fn completed_now(owner: &str, minutes: u32) -> Self {
        Self {
            owner: owner.to_string(),
            duration_seconds: minutes * 60,
            completed_at: Utc::now(),
        }
    }
}
