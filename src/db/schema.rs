pub const SCHEMA_VERSION: i32 = 2;

/// V1: the three record collections.
///
/// Timestamps are RFC 3339 UTC strings with a fixed microsecond precision,
/// so range filters and ORDER BY compare them lexically.
pub const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS notes (
    id TEXT PRIMARY KEY,
    owner TEXT NOT NULL,
    content TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('morning', 'evening')),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_notes_owner_created ON notes(owner, created_at);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    owner TEXT NOT NULL,
    description TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    estimated_minutes INTEGER NOT NULL,
    due_date TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_owner_created ON tasks(owner, created_at);

CREATE TABLE IF NOT EXISTS pomodoro_sessions (
    id TEXT PRIMARY KEY,
    owner TEXT NOT NULL,
    duration_seconds INTEGER NOT NULL,
    completed_at TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_owner_completed ON pomodoro_sessions(owner, completed_at);
"#;

/// V2: key/value settings (default user, timer length)
pub const MIGRATION_V2: &str = r#"
CREATE TABLE IF NOT EXISTS app_settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;
