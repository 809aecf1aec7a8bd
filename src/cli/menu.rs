//! Main menu for dayplan
//!
//! Uses inquire for clean, reliable terminal interaction. The notes and task
//! panels stay mounted across visits and refetch when the user is switched.

use anyhow::{anyhow, Result};
use inquire::{Select, Text};
use std::io::{self, IsTerminal};

use crate::cli::note::notes_screen;
use crate::cli::pomodoro::pomodoro_screen;
use crate::cli::task::task_screen;
use crate::cli::ui::{clear_screen, minimal_render_config};
use crate::cli::{run_stats, App};
use crate::panels::{NotesPanel, TaskList};

/// Menu options with type-safe variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuOption {
    Notes,
    Tasks,
    Pomodoro,
    Stats,
    SwitchUser,
    Quit,
}

impl MenuOption {
    const ALL: &'static [MenuOption] = &[
        MenuOption::Notes,
        MenuOption::Tasks,
        MenuOption::Pomodoro,
        MenuOption::Stats,
        MenuOption::SwitchUser,
        MenuOption::Quit,
    ];

    fn label(self) -> &'static str {
        match self {
            MenuOption::Notes => "Notes",
            MenuOption::Tasks => "Tasks",
            MenuOption::Pomodoro => "Pomodoro",
            MenuOption::Stats => "Stats",
            MenuOption::SwitchUser => "Switch User",
            MenuOption::Quit => "Quit",
        }
    }

    fn from_label(s: &str) -> Option<MenuOption> {
        MenuOption::ALL.iter().find(|opt| opt.label() == s).copied()
    }
}

/// Run the interactive main menu
pub async fn run_menu(app: &mut App) -> Result<()> {
    if !io::stdin().is_terminal() {
        return Err(anyhow!(
            "Interactive menu requires a terminal. Use subcommands for non-interactive use:\n  \
            dayplan notes\n  \
            dayplan tasks\n  \
            dayplan stats\n  \
            Run 'dayplan --help' for all options."
        ));
    }

    let mut notes = NotesPanel::mount(app.store(), app.notifier(), app.user()).await;
    let mut tasks = TaskList::mount(app.store(), app.notifier(), app.user()).await;
    let menu_labels: Vec<&str> = MenuOption::ALL.iter().map(|opt| opt.label()).collect();

    loop {
        let _ = clear_screen();

        let title = format!("dayplan ({})", app.config.user_name);
        let selection = Select::new(&title, menu_labels.clone())
            .with_render_config(minimal_render_config())
            .with_page_size(menu_labels.len())
            .with_vim_mode(true)
            .prompt_skippable();

        // Ctrl+C or a terminal problem: leave quietly
        let Ok(Some(choice_label)) = selection else {
            return Ok(());
        };
        let Some(choice) = MenuOption::from_label(choice_label) else {
            continue;
        };

        let _ = clear_screen();
        let result = match choice {
            MenuOption::Quit => return Ok(()),
            MenuOption::Notes => {
                notes.refresh_if_user_changed().await;
                notes_screen(&mut notes).await
            }
            MenuOption::Tasks => {
                tasks.refresh_if_user_changed().await;
                task_screen(&mut tasks).await
            }
            MenuOption::Pomodoro => {
                let minutes = app.config.pomodoro_minutes;
                pomodoro_screen(app, minutes).await
            }
            MenuOption::Stats => run_stats(app).await.map(|_| wait_for_continue()),
            MenuOption::SwitchUser => switch_user(app),
        };

        if let Err(e) = result {
            eprintln!("\nError: {}", e);
            wait_for_continue();
        }
    }
}

/// Change the active user for this session only
fn switch_user(app: &mut App) -> Result<()> {
    let name = Text::new("user:")
        .with_render_config(minimal_render_config())
        .with_initial_value(&app.config.user_name)
        .prompt_skippable()?;
    if let Some(name) = name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        app.switch_user(name);
    }
    Ok(())
}

/// Wait for user to press enter to continue
fn wait_for_continue() {
    println!();
    let _ = Text::new("[enter]")
        .with_render_config(minimal_render_config())
        .prompt_skippable();
}
