//! One timer session: the owned state every front-end drives.
//!
//! A [`Session`] holds the scheduler, the countdown (once a duration has been
//! selected), the alarm and the optional analytics sink. Front-ends call the
//! command methods for user actions and [`Session::advance_to`] as real (or
//! simulated) time passes. Every method returns the [`Event`]s it produced.
//!
//! ## Usage
//!
//! ```
//! use std::time::Duration;
//! use countdown_core::{Session, SilentAudio};
//!
//! let mut session = Session::new(Box::new(SilentAudio::new()));
//! session.select_duration(1).unwrap();
//! session.start();
//! session.advance_by(Duration::from_secs(60));
//! assert!(session.alarm().is_active());
//! ```

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::alarm::{AlarmController, AlarmStopReason, AlarmSummary, AudioOutput};
use crate::analytics::{Analytics, AnalyticsKind, AnalyticsSink};
use crate::error::Result;
use crate::events::{Event, Snapshot, View};
use crate::scheduler::{Scheduler, TaskHandle, TaskKind};
use crate::timer::{format_mmss, progress_fraction, DurationMinutes, TickOutcome, TimerController, ToggleLabel};

pub struct Session {
    id: Uuid,
    scheduler: Scheduler,
    timer: Option<TimerController>,
    alarm: AlarmController,
    analytics: Analytics,
}

impl Session {
    pub fn new(audio: Box<dyn AudioOutput>) -> Self {
        Self {
            id: Uuid::new_v4(),
            scheduler: Scheduler::new(),
            timer: None,
            alarm: AlarmController::new(audio),
            analytics: Analytics::default(),
        }
    }

    pub fn with_analytics(mut self, sink: Box<dyn AnalyticsSink>) -> Self {
        self.analytics = Analytics::new(Some(sink));
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn view(&self) -> View {
        if self.timer.is_some() {
            View::Display
        } else {
            View::Selection
        }
    }

    pub fn timer(&self) -> Option<&TimerController> {
        self.timer.as_ref()
    }

    pub fn alarm(&self) -> &AlarmController {
        &self.alarm
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Session clock.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// When the next scheduled task comes due, if anything is scheduled.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    pub fn snapshot(&self) -> Snapshot {
        let (minutes, total, remaining, running, label) = match &self.timer {
            Some(t) => (
                Some(t.minutes().get()),
                t.total_secs(),
                t.remaining_secs(),
                t.is_running(),
                t.toggle_label(),
            ),
            None => (None, 0, 0, false, ToggleLabel::Start),
        };
        Snapshot {
            view: self.view(),
            minutes,
            total_secs: total,
            remaining_secs: remaining,
            running,
            display: format_mmss(remaining),
            progress: progress_fraction(remaining, total),
            toggle_label: label,
            alarm_active: self.alarm.is_active(),
            alarm_sound: self.alarm.has_sound(),
            alarm_auto_stop_in_ms: self
                .alarm
                .auto_stop_deadline()
                .map(|d| d.saturating_sub(self.now()).as_millis() as u64),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Select a countdown length in minutes. Rejected values change nothing.
    pub fn select_duration(&mut self, minutes: u32) -> Result<Vec<Event>> {
        let minutes = DurationMinutes::new(minutes)?;
        Ok(self.select(minutes))
    }

    /// Select a countdown length from free-form text.
    pub fn select_input(&mut self, input: &str) -> Result<Vec<Event>> {
        let minutes = DurationMinutes::parse(input)?;
        Ok(self.select(minutes))
    }

    /// Replace the current countdown with a fresh one.
    pub fn select(&mut self, minutes: DurationMinutes) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(summary) = self.alarm.deactivate(&mut self.scheduler, AlarmStopReason::Reselected) {
            events.push(self.alarm_stopped(summary));
        }
        if let Some(mut old) = self.timer.take() {
            old.cancel(&mut self.scheduler);
        }

        let timer = TimerController::new(minutes);
        let total_secs = timer.total_secs();
        self.timer = Some(timer);

        info!(minutes = minutes.get(), "duration selected");
        self.analytics
            .emit(AnalyticsKind::DurationSelected, minutes.get(), self.id);
        events.push(Event::DurationSelected {
            minutes: minutes.get(),
            total_secs,
            at: Utc::now(),
        });
        events
    }

    pub fn start(&mut self) -> Option<Event> {
        let timer = self.timer.as_mut()?;
        if !timer.start(&mut self.scheduler) {
            return None;
        }
        let minutes = timer.minutes().get();
        let remaining_secs = timer.remaining_secs();

        info!(minutes, remaining_secs, "timer started");
        self.analytics.emit(AnalyticsKind::TimerStarted, minutes, self.id);
        Some(Event::TimerStarted {
            remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        let timer = self.timer.as_mut()?;
        if !timer.pause(&mut self.scheduler) {
            return None;
        }
        info!(remaining_secs = timer.remaining_secs(), "timer paused");
        Some(Event::TimerPaused {
            remaining_secs: timer.remaining_secs(),
            at: Utc::now(),
        })
    }

    /// The start/pause control.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.timer.as_ref()?.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Stop counting, restore the full duration and silence any alarm.
    pub fn reset(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.timer.is_none() {
            return events;
        }
        if let Some(summary) = self.alarm.deactivate(&mut self.scheduler, AlarmStopReason::Reset) {
            events.push(self.alarm_stopped(summary));
        }
        let Some(timer) = self.timer.as_mut() else {
            return events;
        };
        timer.reset(&mut self.scheduler);
        let minutes = timer.minutes().get();
        let total_secs = timer.total_secs();

        info!(minutes, "timer reset");
        self.analytics.emit(AnalyticsKind::TimerReset, minutes, self.id);
        events.push(Event::TimerReset {
            total_secs,
            at: Utc::now(),
        });
        events
    }

    pub fn dismiss_alarm(&mut self) -> Option<Event> {
        let summary = self
            .alarm
            .deactivate(&mut self.scheduler, AlarmStopReason::Dismissed)?;
        Some(self.alarm_stopped(summary))
    }

    pub fn advance_by(&mut self, elapsed: Duration) -> Vec<Event> {
        let to = self.now() + elapsed;
        self.advance_to(to)
    }

    /// Fire every task due up to `to`, in deadline order, then move the
    /// clock to `to`. Times in the past are ignored.
    pub fn advance_to(&mut self, to: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some((handle, kind)) = self.scheduler.pop_due(to) {
            match kind {
                TaskKind::CountdownTick => self.handle_tick(handle, &mut events),
                TaskKind::ToneRepeat => {
                    if !self.alarm.on_tone(handle) {
                        warn!("orphaned tone task cancelled");
                        self.scheduler.cancel(handle);
                    }
                }
                TaskKind::AlarmAutoStop => {
                    if let Some(summary) = self.alarm.on_auto_stop(handle, &mut self.scheduler) {
                        events.push(self.alarm_stopped(summary));
                    }
                }
            }
        }
        self.scheduler.settle(to);
        events
    }

    /// Cancel everything and release audio. Safe to call more than once;
    /// also runs on drop.
    pub fn teardown(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(summary) = self.alarm.deactivate(&mut self.scheduler, AlarmStopReason::Teardown) {
            events.push(self.alarm_stopped(summary));
        }
        if let Some(timer) = self.timer.as_mut() {
            timer.cancel(&mut self.scheduler);
        }
        let dropped = self.scheduler.cancel_all();
        if dropped > 0 {
            warn!(dropped, "tasks still scheduled at teardown");
        }
        self.alarm.release_audio();
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn handle_tick(&mut self, handle: TaskHandle, events: &mut Vec<Event>) {
        let Some(timer) = self.timer.as_mut() else {
            self.scheduler.cancel(handle);
            return;
        };
        let clock_ms = self.scheduler.now().as_millis() as u64;
        match timer.on_tick(handle, &mut self.scheduler) {
            TickOutcome::Counting { remaining_secs } => {
                debug!(remaining_secs, "tick");
                events.push(Event::TimerTick {
                    remaining_secs,
                    clock_ms,
                });
            }
            TickOutcome::Expired => {
                let minutes = timer.minutes().get();
                let total_secs = timer.total_secs();
                events.push(Event::TimerTick {
                    remaining_secs: 0,
                    clock_ms,
                });

                info!(minutes, "timer completed");
                self.analytics
                    .emit(AnalyticsKind::TimerCompleted, minutes, self.id);
                events.push(Event::TimerCompleted {
                    total_secs,
                    at: Utc::now(),
                });

                if let Some(activation) = self.alarm.activate(&mut self.scheduler) {
                    let until_stop = activation.auto_stop_deadline.saturating_sub(self.scheduler.now());
                    let until_stop = chrono::Duration::from_std(until_stop)
                        .unwrap_or_else(|_| chrono::Duration::zero());
                    let at = Utc::now();
                    events.push(Event::AlarmStarted {
                        sound: activation.sound,
                        auto_stop_at: at + until_stop,
                        at,
                    });
                }
            }
            TickOutcome::Ignored => {
                warn!("orphaned countdown tick cancelled");
                self.scheduler.cancel(handle);
            }
        }
    }

    fn alarm_stopped(&mut self, summary: AlarmSummary) -> Event {
        let minutes = self.timer.as_ref().map(|t| t.minutes().get()).unwrap_or(0);
        self.analytics.emit(AnalyticsKind::AlarmStopped, minutes, self.id);
        Event::AlarmStopped {
            reason: summary.reason,
            tones_played: summary.tones_played,
            sounded_ms: summary.sounded_ms,
            at: Utc::now(),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("now", &self.now())
            .field("timer", &self.timer)
            .field("alarm", &self.alarm)
            .finish()
    }
}
