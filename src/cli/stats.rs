//! Today's completed pomodoro sessions

use anyhow::Result;
use chrono::Local;

use crate::cli::App;
use crate::models::PomodoroSession;
use crate::panels::notes::day_window;
use crate::store::{from_record, Collection, Filter, Order, RecordStore};

/// Execute the stats command
pub async fn run_stats(app: &App) -> Result<()> {
    let sessions = todays_sessions(app).await?;
    let summary = Summary::of(&sessions);

    println!("{}", Local::now().format("%A, %B %-d"));
    println!("{}", summary.line());
    for session in &sessions {
        println!(
            "  {}  {} min",
            session.completed_at.with_timezone(&Local).format("%H:%M"),
            session.duration_seconds / 60
        );
    }
    Ok(())
}

async fn todays_sessions(app: &App) -> Result<Vec<PomodoroSession>> {
    let (start, end) = day_window(Local::now().date_naive());
    let filter = Filter::new()
        .eq("owner", app.user().owner_name())
        .between("completed_at", start, end);
    let records = app
        .store()
        .query(
            Collection::PomodoroSessions,
            &filter,
            Some(&Order::asc("completed_at")),
        )
        .await?;
    let sessions = records
        .into_iter()
        .map(from_record::<PomodoroSession>)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sessions)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Summary {
    count: usize,
    minutes: u32,
}

impl Summary {
    fn of(sessions: &[PomodoroSession]) -> Self {
        Self {
            count: sessions.len(),
            minutes: sessions.iter().map(|s| s.duration_seconds / 60).sum(),
        }
    }

    fn line(&self) -> String {
        match self.count {
            0 => "No sessions yet.".to_string(),
            1 => format!("1 session, {} min", self.minutes),
            n => format!("{} sessions, {} min", n, self.minutes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let sessions = vec![
            PomodoroSession::completed_now("ada", 25),
            PomodoroSession::completed_now("ada", 50),
        ];
        let summary = Summary::of(&sessions);
        assert_eq!(summary, Summary { count: 2, minutes: 75 });
        assert_eq!(summary.line(), "2 sessions, 75 min");

        assert_eq!(Summary::of(&sessions[..1]).line(), "1 session, 25 min");
        assert_eq!(Summary::of(&[]).line(), "No sessions yet.");
    }
}
