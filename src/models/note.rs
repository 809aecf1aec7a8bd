use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which of the two daily reflections a note belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Morning,
    Evening,
}

impl NoteKind {
    pub const ALL: [NoteKind; 2] = [NoteKind::Morning, NoteKind::Evening];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Evening => "evening",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "morning" | "am" => Some(Self::Morning),
            "evening" | "pm" => Some(Self::Evening),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Morning => "Morning Reflection",
            Self::Evening => "Evening Reflection",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Morning => "What are your goals for today?",
            Self::Evening => "How was your day? What did you accomplish?",
        }
    }
}

impl std::fmt::Display for NoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub owner: String,
    pub content: String,
    pub kind: NoteKind,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; the store fills in `id` and `created_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNote {
    pub owner: String,
    pub content: String,
    pub kind: NoteKind,
}

impl NewNote {
    pub fn new(owner: &str, kind: NoteKind, content: String) -> Self {
        Self {
            owner: owner.to_string(),
            content,
            kind,
        }
    }
}
