//! Morning and evening notes from the command line

use anyhow::{anyhow, Result};
use chrono::Local;
use inquire::{Select, Text};

use crate::cli::ui::{clear_screen, minimal_render_config};
use crate::cli::{App, NotesArgs};
use crate::models::NoteKind;
use crate::panels::NotesPanel;

/// Execute the notes command
pub async fn run_notes(app: &App, args: NotesArgs) -> Result<()> {
    let mut panel = NotesPanel::mount(app.store(), app.notifier(), app.user()).await;

    let Some(kind) = args.kind else {
        print_notes(&panel);
        return Ok(());
    };
    let kind = NoteKind::parse(&kind)
        .ok_or_else(|| anyhow!("Unknown note \"{}\". Use morning or evening.", kind))?;

    match args.text {
        Some(text) => {
            panel.set_text(kind, text);
            panel.save(kind).await;
        }
        None => edit_note(&mut panel, kind).await?,
    }
    Ok(())
}

/// Print both of today's notes
pub fn print_notes(panel: &NotesPanel) {
    println!("{}\n", Local::now().format("%A, %B %-d"));
    for kind in NoteKind::ALL {
        println!("{}", kind.title().to_uppercase());
        let text = panel.text(kind);
        if text.trim().is_empty() {
            println!("  ({})", kind.placeholder());
        } else {
            for line in text.lines() {
                println!("  {}", line);
            }
        }
        println!();
    }
}

/// Prompt for a note, seeded with the current buffer, and save it
async fn edit_note(panel: &mut NotesPanel, kind: NoteKind) -> Result<()> {
    let current = panel.text(kind).to_string();
    let label = format!("{}:", kind.as_str());
    let mut prompt = Text::new(&label)
        .with_render_config(minimal_render_config())
        .with_placeholder(kind.placeholder());
    if !current.is_empty() {
        prompt = prompt.with_initial_value(&current);
    }

    let Some(text) = prompt.prompt_skippable()? else {
        return Ok(());
    };
    if text == current && panel.current_note(kind).is_some() {
        return Ok(());
    }

    panel.set_text(kind, text);
    panel.save(kind).await;
    Ok(())
}

/// Notes screen for the main menu
pub async fn notes_screen(panel: &mut NotesPanel) -> Result<()> {
    loop {
        let _ = clear_screen();
        print_notes(panel);

        let options: Vec<String> = NoteKind::ALL
            .iter()
            .map(|kind| format!("Write {}", kind.as_str()))
            .chain(std::iter::once("Back".to_string()))
            .collect();

        let selection = Select::new("", options)
            .with_render_config(minimal_render_config())
            .with_vim_mode(true)
            .prompt_skippable()?;

        let kind = match selection.as_deref() {
            Some("Write morning") => NoteKind::Morning,
            Some("Write evening") => NoteKind::Evening,
            _ => return Ok(()),
        };
        edit_note(panel, kind).await?;
    }
}
