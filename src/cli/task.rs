//! Task list UI for dayplan
//!
//! Line commands (`tasks add`, `tasks done`, ...) plus an interactive list
//! reachable from the main menu or `tasks browse`.

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    style::{Attribute, SetAttribute},
    ExecutableCommand,
};
use inquire::Text;
use std::io::{self, IsTerminal, Write};
use uuid::Uuid;

use crate::cli::ui::{
    clear_screen, confirm, minimal_render_config, term_size, truncate, RawModeGuard, StatusBar,
};
use crate::cli::{App, TaskCommands, TasksArgs};
use crate::models::Task;
use crate::panels::tasks::DEFAULT_MINUTES;
use crate::panels::TaskList;

/// Execute the tasks command
pub async fn run_tasks(app: &App, args: TasksArgs) -> Result<()> {
    let mut list = TaskList::mount(app.store(), app.notifier(), app.user()).await;

    match args.command.unwrap_or(TaskCommands::List) {
        TaskCommands::List => print_tasks(&list),
        TaskCommands::Browse => {
            if !io::stdin().is_terminal() {
                return Err(anyhow!("Browsing tasks requires a terminal. Use `dayplan tasks list`."));
            }
            task_screen(&mut list).await?;
        }
        TaskCommands::Add {
            description,
            minutes,
        } => {
            list.set_description(description.join(" "));
            list.set_minutes(minutes);
            list.add().await;
        }
        TaskCommands::Done { id } => {
            let id = resolve(&list, &id)?;
            list.toggle(id, true).await;
        }
        TaskCommands::Undo { id } => {
            let id = resolve(&list, &id)?;
            list.toggle(id, false).await;
        }
        TaskCommands::Rm { id } => {
            let id = resolve(&list, &id)?;
            list.remove(id).await;
        }
    }
    Ok(())
}

fn resolve(list: &TaskList, identifier: &str) -> Result<Uuid> {
    list.find(identifier)
        .map(|t| t.id)
        .ok_or_else(|| anyhow!("No task matches \"{}\".", identifier))
}

/// Print the list, newest first, with short ids for the line commands
pub fn print_tasks(list: &TaskList) {
    if list.tasks().is_empty() {
        println!("No tasks.");
        return;
    }
    println!("TASKS ({} pending)", list.pending_count());
    let layout = TaskLayout::default();
    for task in list.tasks() {
        println!("{}  {}", format_row(task, &layout), short_id(task.id));
    }
}

fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

/// Column layout for task display
struct TaskLayout {
    check_width: usize,
    title_width: usize,
    duration_width: usize,
}

impl Default for TaskLayout {
    fn default() -> Self {
        let (term_width, _) = term_size();
        TaskLayout {
            check_width: 3,
            title_width: if term_width >= 80 { 40 } else { 26 },
            duration_width: 8,
        }
    }
}

fn format_row(task: &Task, layout: &TaskLayout) -> String {
    let checkbox = if task.completed { "[x]" } else { "[ ]" };
    format!(
        "{:<check$}  {:<title$}  {:<duration$}  {}",
        checkbox,
        truncate(&task.description, layout.title_width),
        task.duration_label(),
        task.created_label(),
        check = layout.check_width,
        title = layout.title_width,
        duration = layout.duration_width
    )
}

/// Interactive task list with keyboard navigation
pub async fn task_screen(list: &mut TaskList) -> Result<()> {
    let mut selected_idx: usize = 0;

    loop {
        let count = list.tasks().len();
        if count == 0 {
            selected_idx = 0;
        } else if selected_idx >= count {
            selected_idx = count - 1;
        }

        clear_screen()?;
        let mut stdout = io::stdout();
        println!("TASKS ({} pending)\n", list.pending_count());

        if list.is_loading() {
            println!("  Loading...\n");
        } else if count == 0 {
            println!("  No tasks. Press [n] to add one.\n");
        } else {
            let layout = TaskLayout::default();
            for (idx, task) in list.tasks().iter().enumerate() {
                let line = format_row(task, &layout);
                if idx == selected_idx {
                    stdout.execute(SetAttribute(Attribute::Reverse))?;
                    print!("{}", line);
                    stdout.execute(SetAttribute(Attribute::Reset))?;
                    println!();
                } else {
                    println!("{}", line);
                }
            }
        }

        println!();
        let status = StatusBar::new()
            .counter(if count == 0 { 0 } else { selected_idx + 1 }, count)
            .action("n", "ew")
            .action("c", "heck")
            .action("d", "el")
            .action("↑/↓", "")
            .action("q", "uit")
            .render();
        println!("{}", status);
        stdout.flush()?;

        let code = {
            let _guard = RawModeGuard::new()?;
            match event::read()? {
                Event::Key(KeyEvent {
                    code, modifiers, ..
                }) => {
                    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }
                    code
                }
                _ => continue,
            }
        };

        let selected = list.tasks().get(selected_idx).map(|t| (t.id, t.completed));
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Up | KeyCode::Char('k') => {
                selected_idx = selected_idx.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if count > 0 && selected_idx < count - 1 {
                    selected_idx += 1;
                }
            }
            KeyCode::Char('n') => {
                if task_add_prompt(list).await? {
                    selected_idx = 0;
                }
            }
            KeyCode::Char('c') | KeyCode::Char(' ') => {
                if let Some((id, completed)) = selected {
                    list.toggle(id, !completed).await;
                }
            }
            KeyCode::Char('d') => {
                if let Some((id, _)) = selected {
                    let description = list
                        .tasks()
                        .get(selected_idx)
                        .map(|t| t.description.clone())
                        .unwrap_or_default();
                    let _ = clear_screen();
                    if confirm(&format!("Delete \"{}\"?", description))? {
                        list.remove(id).await;
                    }
                }
            }
            _ => {}
        }
    }
}

/// Prompt for a new task. Returns true when one was added.
pub async fn task_add_prompt(list: &mut TaskList) -> Result<bool> {
    let _ = clear_screen();

    let description = Text::new("task:")
        .with_render_config(minimal_render_config())
        .with_initial_value(&list.form().description)
        .prompt_skippable()?;
    let Some(description) = description else {
        return Ok(false);
    };

    let minutes = Text::new("minutes:")
        .with_render_config(minimal_render_config())
        .with_default(DEFAULT_MINUTES)
        .with_initial_value(&list.form().minutes)
        .prompt_skippable()?;
    let Some(minutes) = minutes else {
        return Ok(false);
    };

    list.set_description(description);
    list.set_minutes(minutes);
    let added = list.add().await.is_applied();
    if !added {
        wait_for_key()?;
    }
    Ok(added)
}

/// Leave a rejected or failed add on screen until a key is pressed
fn wait_for_key() -> Result<()> {
    println!("[any key]");
    let _guard = RawModeGuard::new()?;
    loop {
        if let Event::Key(_) = event::read()? {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(description: &str, completed: bool) -> Task {
        Task {
            id: Uuid::new_v4(),
            owner: "ada".into(),
            description: description.into(),
            completed,
            estimated_minutes: 90,
            due_date: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_row_checkbox() {
        let layout = TaskLayout {
            check_width: 3,
            title_width: 12,
            duration_width: 8,
        };
        let open = format_row(&task("Write report", false), &layout);
        assert!(open.starts_with("[ ]  Write report"));
        assert!(open.contains("1h 30m"));

        let done = format_row(&task("Write report", true), &layout);
        assert!(done.starts_with("[x]"));
    }

    #[test]
    fn test_format_row_truncates_description() {
        let layout = TaskLayout {
            check_width: 3,
            title_width: 8,
            duration_width: 8,
        };
        let row = format_row(&task("A very long description", false), &layout);
        assert!(row.contains("A very …"));
    }

    #[test]
    fn test_short_id() {
        let id = Uuid::parse_str("6f1c1f4e-0000-4000-8000-000000000000").unwrap();
        assert_eq!(short_id(id), "6f1c1f4e");
    }
}
