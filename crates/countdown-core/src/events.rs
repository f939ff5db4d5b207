use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alarm::AlarmStopReason;
use crate::timer::ToggleLabel;

/// Every state change in a session produces an Event.
/// The terminal UI renders from them; `simulate` prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    DurationSelected {
        minutes: u32,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStarted {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerTick {
        remaining_secs: u64,
        /// Virtual session time in milliseconds.
        clock_ms: u64,
    },
    TimerReset {
        total_secs: u64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        total_secs: u64,
        at: DateTime<Utc>,
    },
    AlarmStarted {
        sound: bool,
        auto_stop_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    AlarmStopped {
        reason: AlarmStopReason,
        tones_played: u32,
        sounded_ms: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The `type` tag as it appears in JSON.
    pub fn name(&self) -> &'static str {
        match self {
            Event::DurationSelected { .. } => "duration_selected",
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerTick { .. } => "timer_tick",
            Event::TimerReset { .. } => "timer_reset",
            Event::TimerCompleted { .. } => "timer_completed",
            Event::AlarmStarted { .. } => "alarm_started",
            Event::AlarmStopped { .. } => "alarm_stopped",
        }
    }
}

/// Which screen the front-end should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Selection,
    Display,
}

/// Full state snapshot for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub view: View,
    pub minutes: Option<u32>,
    pub total_secs: u64,
    pub remaining_secs: u64,
    pub running: bool,
    pub display: String,
    pub progress: f64,
    pub toggle_label: ToggleLabel,
    pub alarm_active: bool,
    pub alarm_sound: bool,
    /// Milliseconds until the alarm silences itself.
    pub alarm_auto_stop_in_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_matches_serde_tag() {
        let events = [
            Event::TimerTick {
                remaining_secs: 3,
                clock_ms: 1000,
            },
            Event::AlarmStopped {
                reason: AlarmStopReason::TimedOut,
                tones_played: 51,
                sounded_ms: 30_000,
                at: Utc::now(),
            },
        ];
        for e in events {
            let json = serde_json::to_value(&e).unwrap();
            assert_eq!(json["type"], e.name());
        }
    }

    #[test]
    fn stop_reason_is_snake_case() {
        let e = Event::AlarmStopped {
            reason: AlarmStopReason::TimedOut,
            tones_played: 0,
            sounded_ms: 0,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["reason"], "timed_out");
    }
}
