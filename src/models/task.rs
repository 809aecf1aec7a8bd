use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A timed to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub owner: String,
    pub description: String,
    pub completed: bool,
    pub estimated_minutes: u32,
    /// Set to the creation time; not editable
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn duration_label(&self) -> String {
        format_duration(self.estimated_minutes)
    }

    /// Creation date as shown in the list, e.g. "Mar 9, 2025"
    pub fn created_label(&self) -> String {
        self.created_at
            .with_timezone(&chrono::Local)
            .format("%b %-d, %Y")
            .to_string()
    }
}

/// Insert payload; the store fills in `id` and `created_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub owner: String,
    pub description: String,
    pub completed: bool,
    pub estimated_minutes: u32,
    pub due_date: DateTime<Utc>,
}

impl NewTask {
    pub fn new(owner: &str, description: &str, estimated_minutes: u32) -> Self {
        Self {
            owner: owner.to_string(),
            description: description.trim().to_string(),
            completed: false,
            estimated_minutes,
            due_date: Utc::now(),
        }
    }
}

/// "45m", "1h", "1h 30m"
pub fn format_duration(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    let hours = minutes / 60;
    let rest = minutes % 60;
    if rest > 0 {
        format!("{}h {}m", hours, rest)
    } else {
        format!("{}h", hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(60), "1h");
        assert_eq!(format_duration(90), "1h 30m");
        assert_eq!(format_duration(1), "1m");
        assert_eq!(format_duration(125), "2h 5m");
    }

    #[test]
    fn test_new_task_defaults() {
        let before = Utc::now();
        let task = NewTask::new("ada", "  Write report ", 45);
        assert_eq!(task.description, "Write report");
        assert!(!task.completed);
        assert_eq!(task.estimated_minutes, 45);
        assert!(task.due_date >= before);
    }

    #[test]
    fn test_task_deserializes_store_record() {
        let json = serde_json::json!({
            "id": "6f1c1f4e-3f0e-4a8e-9a53-0c5e1e7b2d11",
            "owner": "ada",
            "description": "Write report",
            "completed": true,
            "estimated_minutes": 45,
            "due_date": null,
            "created_at": "2025-03-09T08:00:00.000000Z"
        });
        let task: Task = serde_json::from_value(json).unwrap();
        assert!(task.completed);
        assert!(task.due_date.is_none());
        assert_eq!(task.duration_label(), "45m");
    }
}
