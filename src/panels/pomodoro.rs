//! Single-session countdown.
//!
//! The tick source is a tokio task held in a one-element slot. Every change
//! to `running` or to the remaining time re-arms the slot: the old task is
//! aborted and the generation counter bumped, so ticks already queued by an
//! aborted source are discarded instead of double counting.
//!
//! Drive the timer by awaiting [`PomodoroTimer::next_tick`] (cancel safe,
//! usable in `select!`) and handing the result to
//! [`PomodoroTimer::on_tick`], or call [`PomodoroTimer::advance`] for both.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::messages::{SESSION_COMPLETE, SESSION_SAVE_FAILED};
use crate::models::PomodoroSession;
use crate::notify::Notifier;
use crate::store::{to_record, Collection, RecordStore};
use crate::user::UserContext;

pub const DEFAULT_MINUTES: u32 = 25;
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// The duration slider: 5 to 60 minutes in steps of 5
pub struct DurationControl;

impl DurationControl {
    pub const MIN: u32 = 5;
    pub const MAX: u32 = 60;
    pub const STEP: u32 = 5;

    /// Nearest value the control can show
    pub fn snap(minutes: u32) -> u32 {
        let clamped = minutes.clamp(Self::MIN, Self::MAX);
        ((clamped + Self::STEP / 2) / Self::STEP * Self::STEP).clamp(Self::MIN, Self::MAX)
    }

    pub fn step_up(minutes: u32) -> u32 {
        (Self::snap(minutes) + Self::STEP).min(Self::MAX)
    }

    pub fn step_down(minutes: u32) -> u32 {
        Self::snap(minutes).saturating_sub(Self::STEP).max(Self::MIN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub remaining_seconds: u32,
    pub configured_minutes: u32,
    pub running: bool,
}

impl TimerState {
    fn new(minutes: u32) -> Self {
        Self {
            remaining_seconds: minutes * 60,
            configured_minutes: minutes,
            running: false,
        }
    }

    pub fn clock(&self) -> String {
        format_clock(self.remaining_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick { remaining_seconds: u32 },
    /// The countdown reached zero and the timer stopped
    Completed { persisted: bool },
}

/// One tick from a particular arming of the tick source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    generation: u64,
}

pub struct PomodoroTimer {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    user: UserContext,
    state: TimerState,
    period: Duration,
    generation: u64,
    ticks_tx: mpsc::UnboundedSender<Tick>,
    ticks_rx: mpsc::UnboundedReceiver<Tick>,
    ticker: Option<JoinHandle<()>>,
}

impl PomodoroTimer {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>, user: UserContext) -> Self {
        Self::with_period(store, notifier, user, TICK_PERIOD)
    }

    pub fn with_period(
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        user: UserContext,
        period: Duration,
    ) -> Self {
        let (ticks_tx, ticks_rx) = mpsc::unbounded_channel();
        Self {
            store,
            notifier,
            user,
            state: TimerState::new(DEFAULT_MINUTES),
            period,
            generation: 0,
            ticks_tx,
            ticks_rx,
            ticker: None,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// The duration control is disabled while counting down
    pub fn duration_control_enabled(&self) -> bool {
        !self.state.running
    }

    /// Whether a tick source is currently armed
    pub fn is_armed(&self) -> bool {
        self.ticker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start or pause. Must be called inside a tokio runtime.
    pub fn toggle(&mut self) {
        self.state.running = !self.state.running;
        tracing::debug!(running = self.state.running, remaining = self.state.remaining_seconds, "timer toggled");
        self.rearm();
    }

    pub fn reset(&mut self) {
        self.state.running = false;
        self.state.remaining_seconds = self.state.configured_minutes * 60;
        self.rearm();
    }

    /// Set the session length and restart the countdown from it.
    ///
    /// Callers gate this on [`duration_control_enabled`](Self::duration_control_enabled).
    pub fn set_duration(&mut self, minutes: u32) {
        let minutes = DurationControl::snap(minutes);
        self.state.configured_minutes = minutes;
        self.state.remaining_seconds = minutes * 60;
        self.rearm();
    }

    fn rearm(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);

        if !self.state.running || self.state.remaining_seconds == 0 {
            return;
        }

        let tx = self.ticks_tx.clone();
        let tick = Tick {
            generation: self.generation,
        };
        let period = self.period;
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(tick).is_err() {
                    break;
                }
            }
        }));
    }

    /// Wait for the next tick of the current arming.
    ///
    /// Pending forever while idle. Resolves immediately when started at zero,
    /// which re-triggers completion.
    pub async fn next_tick(&mut self) -> Tick {
        loop {
            if self.state.running && self.state.remaining_seconds == 0 {
                return Tick {
                    generation: self.generation,
                };
            }
            match self.ticks_rx.recv().await {
                Some(tick) if tick.generation == self.generation => return tick,
                Some(_) => continue,
                // We hold a sender, so the channel never closes
                None => return std::future::pending().await,
            }
        }
    }

    /// Apply a tick: decrement, and complete the session at zero
    pub async fn on_tick(&mut self, tick: Tick) -> Option<TimerEvent> {
        if tick.generation != self.generation || !self.state.running {
            return None;
        }

        if self.state.remaining_seconds > 0 {
            self.state.remaining_seconds -= 1;
            if self.state.remaining_seconds > 0 {
                return Some(TimerEvent::Tick {
                    remaining_seconds: self.state.remaining_seconds,
                });
            }
        }

        Some(self.complete().await)
    }

    /// `next_tick` followed by `on_tick`. Not cancel safe once a tick arrived.
    pub async fn advance(&mut self) -> Option<TimerEvent> {
        let tick = self.next_tick().await;
        self.on_tick(tick).await
    }

    async fn complete(&mut self) -> TimerEvent {
        self.state.running = false;
        self.rearm();
        self.notifier.success(SESSION_COMPLETE);

        let session =
            PomodoroSession::completed_now(&self.user.owner_name(), self.state.configured_minutes);
        let result = match to_record(&session) {
            Ok(record) => self
                .store
                .insert(Collection::PomodoroSessions, record)
                .await
                .map(|_| ()),
            Err(e) => Err(e),
        };

        let persisted = match result {
            Ok(()) => {
                tracing::debug!(seconds = session.duration_seconds, "session saved");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to save session");
                self.notifier.error(SESSION_SAVE_FAILED);
                false
            }
        };

        TimerEvent::Completed { persisted }
    }
}

impl Drop for PomodoroTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

/// `MM:SS`, zero padded
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
