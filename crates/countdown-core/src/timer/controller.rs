//! Countdown state machine.
//!
//! The controller owns no clock. Its 1-second tick is a repeating task in the
//! [`Scheduler`] passed to each command, and the owner calls
//! [`TimerController::on_tick`] whenever that task comes due.
//!
//! ## State Transitions
//!
//! ```text
//! Ready -> start -> Running -> pause -> Paused -> start -> Running
//!                   Running -> tick (remaining == 0) -> Expired
//! any   -> reset -> Ready
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::duration::DurationMinutes;
use crate::scheduler::{Scheduler, TaskHandle, TaskKind};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub selected_minutes: DurationMinutes,
    pub total_secs: u64,
    pub remaining_secs: u64,
    pub running: bool,
    /// Stopped by `pause` and not since started, reset or expired.
    #[serde(default)]
    pub paused: bool,
}

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Decremented, still counting.
    Counting { remaining_secs: u64 },
    /// Reached zero on this tick. The tick task has been cancelled.
    Expired,
    /// The timer was not running (stale or foreign handle).
    Ignored,
}

/// Label for the start/pause control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToggleLabel {
    Start,
    Pause,
    Resume,
}

impl ToggleLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            ToggleLabel::Start => "Start",
            ToggleLabel::Pause => "Pause",
            ToggleLabel::Resume => "Resume",
        }
    }
}

#[derive(Debug)]
pub struct TimerController {
    state: TimerState,
    tick: Option<TaskHandle>,
}

impl TimerController {
    pub fn new(minutes: DurationMinutes) -> Self {
        let total_secs = minutes.as_secs();
        Self {
            state: TimerState {
                selected_minutes: minutes,
                total_secs,
                remaining_secs: total_secs,
                running: false,
                paused: false,
            },
            tick: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn minutes(&self) -> DurationMinutes {
        self.state.selected_minutes
    }

    pub fn remaining_secs(&self) -> u64 {
        self.state.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.state.total_secs
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn tick_handle(&self) -> Option<TaskHandle> {
        self.tick
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn toggle_label(&self) -> ToggleLabel {
        if self.state.running {
            ToggleLabel::Pause
        } else if self.state.paused {
            ToggleLabel::Resume
        } else {
            ToggleLabel::Start
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin or resume counting. Returns `false` when nothing changed:
    /// already running, or nothing left to count.
    pub fn start(&mut self, sched: &mut Scheduler) -> bool {
        if self.state.running || self.state.remaining_secs == 0 {
            return false;
        }
        self.state.running = true;
        self.state.paused = false;
        self.tick = Some(sched.every(TICK_PERIOD, TaskKind::CountdownTick));
        true
    }

    /// Stop counting and keep the remaining time.
    pub fn pause(&mut self, sched: &mut Scheduler) -> bool {
        if !self.state.running {
            return false;
        }
        self.stop(sched);
        self.state.paused = true;
        true
    }

    pub fn reset(&mut self, sched: &mut Scheduler) {
        self.stop(sched);
        self.state.paused = false;
        self.state.remaining_secs = self.state.total_secs;
    }

    /// Cancel the tick without touching the remaining time.
    pub fn cancel(&mut self, sched: &mut Scheduler) {
        self.stop(sched);
    }

    /// Handle a due `CountdownTick` task.
    pub fn on_tick(&mut self, handle: TaskHandle, sched: &mut Scheduler) -> TickOutcome {
        if !self.state.running || self.tick != Some(handle) {
            return TickOutcome::Ignored;
        }
        self.state.remaining_secs = self.state.remaining_secs.saturating_sub(1);
        if self.state.remaining_secs == 0 {
            self.stop(sched);
            return TickOutcome::Expired;
        }
        TickOutcome::Counting {
            remaining_secs: self.state.remaining_secs,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn stop(&mut self, sched: &mut Scheduler) {
        if let Some(handle) = self.tick.take() {
            sched.cancel(handle);
        }
        self.state.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer(minutes: u32) -> TimerController {
        TimerController::new(DurationMinutes::new(minutes).unwrap())
    }

    fn run_ticks(t: &mut TimerController, sched: &mut Scheduler, until: Duration) -> Vec<TickOutcome> {
        let mut out = Vec::new();
        while let Some((h, kind)) = sched.pop_due(until) {
            assert_eq!(kind, TaskKind::CountdownTick);
            out.push(t.on_tick(h, sched));
        }
        sched.settle(until);
        out
    }

    #[test]
    fn new_timer_is_ready() {
        let t = timer(2);
        assert_eq!(t.total_secs(), 120);
        assert_eq!(t.remaining_secs(), 120);
        assert!(!t.is_running());
        assert_eq!(t.toggle_label(), ToggleLabel::Start);
    }

    #[test]
    fn start_schedules_one_tick() {
        let mut sched = Scheduler::new();
        let mut t = timer(1);
        assert!(t.start(&mut sched));
        assert!(!t.start(&mut sched));
        assert_eq!(sched.pending(), 1);
        assert_eq!(t.toggle_label(), ToggleLabel::Pause);
    }

    #[test]
    fn counts_down_and_expires_once() {
        let mut sched = Scheduler::new();
        let mut t = timer(1);
        t.start(&mut sched);

        let outcomes = run_ticks(&mut t, &mut sched, Duration::from_secs(120));
        assert_eq!(outcomes.len(), 60);
        assert_eq!(outcomes.last(), Some(&TickOutcome::Expired));
        assert_eq!(
            outcomes.iter().filter(|o| **o == TickOutcome::Expired).count(),
            1
        );
        assert_eq!(t.remaining_secs(), 0);
        assert!(!t.is_running());
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn start_at_zero_schedules_nothing() {
        let mut sched = Scheduler::new();
        let mut t = timer(1);
        t.start(&mut sched);
        run_ticks(&mut t, &mut sched, Duration::from_secs(60));

        assert!(!t.start(&mut sched));
        assert_eq!(sched.pending(), 0);
        assert_eq!(t.toggle_label(), ToggleLabel::Start);
    }

    #[test]
    fn pause_preserves_remaining() {
        let mut sched = Scheduler::new();
        let mut t = timer(1);
        t.start(&mut sched);
        run_ticks(&mut t, &mut sched, Duration::from_secs(10));
        assert!(t.pause(&mut sched));
        assert!(!t.pause(&mut sched));
        assert_eq!(t.remaining_secs(), 50);
        assert_eq!(t.toggle_label(), ToggleLabel::Resume);

        run_ticks(&mut t, &mut sched, Duration::from_secs(40));
        assert_eq!(t.remaining_secs(), 50);

        t.start(&mut sched);
        run_ticks(&mut t, &mut sched, Duration::from_secs(45));
        assert_eq!(t.remaining_secs(), 45);
    }

    #[test]
    fn pause_before_first_tick_offers_resume() {
        let mut sched = Scheduler::new();
        let mut t = timer(1);
        t.start(&mut sched);
        assert!(t.pause(&mut sched));
        assert_eq!(t.remaining_secs(), 60);
        assert!(t.is_paused());
        assert_eq!(t.toggle_label(), ToggleLabel::Resume);

        t.start(&mut sched);
        assert!(!t.is_paused());
        assert_eq!(t.toggle_label(), ToggleLabel::Pause);

        t.pause(&mut sched);
        t.reset(&mut sched);
        assert_eq!(t.toggle_label(), ToggleLabel::Start);
    }

    #[test]
    fn reset_restores_total() {
        let mut sched = Scheduler::new();
        let mut t = timer(3);
        t.start(&mut sched);
        run_ticks(&mut t, &mut sched, Duration::from_secs(7));
        t.reset(&mut sched);
        assert_eq!(t.remaining_secs(), 180);
        assert!(!t.is_running());
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn stale_handle_is_ignored() {
        let mut sched = Scheduler::new();
        let mut t = timer(1);
        t.start(&mut sched);
        let old = t.tick_handle().unwrap();
        t.pause(&mut sched);
        t.start(&mut sched);
        assert_eq!(t.on_tick(old, &mut sched), TickOutcome::Ignored);
        assert_eq!(t.remaining_secs(), 60);
    }
}
