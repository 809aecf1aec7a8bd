//! Full-screen pomodoro countdown

use anyhow::{anyhow, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::cli::ui::{clear_screen, RawModeGuard, StatusBar};
use crate::cli::{App, PomodoroArgs};
use crate::notify::{BufferedNotifier, Notice};
use crate::panels::{DurationControl, PomodoroTimer, TimerEvent, TimerState};

const KEY_POLL: Duration = Duration::from_millis(100);

/// What a key press asks the timer to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Toggle,
    Reset,
    Longer,
    Shorter,
    Quit,
}

fn action_for(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Toggle),
        KeyCode::Char('r') => Some(Action::Reset),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => Some(Action::Longer),
        KeyCode::Char('-') | KeyCode::Left => Some(Action::Shorter),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// Execute the pomodoro command
pub async fn run_pomodoro(app: &App, args: PomodoroArgs) -> Result<()> {
    let minutes = args.minutes.unwrap_or(app.config.pomodoro_minutes);
    pomodoro_screen(app, minutes).await
}

/// Run the timer until the user quits
pub async fn pomodoro_screen(app: &App, minutes: u32) -> Result<()> {
    if !io::stdout().is_terminal() || !io::stdin().is_terminal() {
        return Err(anyhow!("The pomodoro timer requires a terminal."));
    }

    let notices = Arc::new(BufferedNotifier::new());
    let mut timer = PomodoroTimer::new(app.store(), notices.clone(), app.user());
    timer.set_duration(minutes);

    let owner = app.config.user_name.clone();
    let mut last_notice: Option<Notice> = None;

    let _guard = RawModeGuard::new()?;
    let mut keys = spawn_key_reader();
    render(&owner, &timer.state(), last_notice.as_ref())?;

    loop {
        tokio::select! {
            tick = timer.next_tick() => {
                if let Some(TimerEvent::Completed { .. }) = timer.on_tick(tick).await {
                    print!("\x07");
                }
            }
            key = keys.recv() => {
                let Some(key) = key else { break };
                match action_for(key) {
                    Some(Action::Quit) => break,
                    Some(Action::Toggle) => timer.toggle(),
                    Some(Action::Reset) => timer.reset(),
                    Some(Action::Longer) if timer.duration_control_enabled() => {
                        let next = DurationControl::step_up(timer.state().configured_minutes);
                        timer.set_duration(next);
                    }
                    Some(Action::Shorter) if timer.duration_control_enabled() => {
                        let next = DurationControl::step_down(timer.state().configured_minutes);
                        timer.set_duration(next);
                    }
                    _ => continue,
                }
            }
        }

        if let Some(notice) = notices.drain().pop() {
            last_notice = Some(notice);
        }
        render(&owner, &timer.state(), last_notice.as_ref())?;
    }

    clear_screen()?;
    Ok(())
}

/// Forward key presses from a blocking reader thread.
///
/// The thread exits once the receiver is dropped.
fn spawn_key_reader() -> mpsc::UnboundedReceiver<KeyEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || loop {
        if tx.is_closed() {
            break;
        }
        match event::poll(KEY_POLL) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => {
                    if tx.send(key).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "key reader stopped");
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(error = %e, "key reader stopped");
                break;
            }
        }
    });
    rx
}

fn screen_lines(owner: &str, state: &TimerState, notice: Option<&Notice>) -> Vec<String> {
    let phase = if state.running {
        "running"
    } else if state.remaining_seconds == 0 {
        "done"
    } else {
        "paused"
    };
    let duration = if state.running {
        format!("{} min (locked)", state.configured_minutes)
    } else {
        format!("{} min", state.configured_minutes)
    };

    let toggle_label = if state.running { "pause" } else { "start" };
    let mut bar = StatusBar::new().action("space", toggle_label).action("r", "eset");
    if !state.running {
        bar = bar.action("+/-", "duration");
    }
    let bar = bar.action("q", "uit").render();

    let notice = match notice {
        Some(n) if n.is_error() => format!("Error: {}", n.message()),
        Some(n) => n.message().to_string(),
        None => String::new(),
    };

    vec![
        format!("POMODORO  {}", owner),
        String::new(),
        format!("    {}", state.clock()),
        String::new(),
        format!("{}  {}", duration, phase),
        notice,
        String::new(),
        bar,
    ]
}

fn render(owner: &str, state: &TimerState, notice: Option<&Notice>) -> Result<()> {
    clear_screen()?;
    let mut stdout = io::stdout();
    // Raw mode: no implicit carriage return
    for line in screen_lines(owner, state, notice) {
        write!(stdout, "{}\r\n", line)?;
    }
    stdout.flush()?;
    Ok(())
}
