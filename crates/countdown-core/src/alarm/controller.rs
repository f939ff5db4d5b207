//! Alarm state machine.
//!
//! ```text
//! Idle -> activate -> Sounding -> (dismiss | 30s | reset | reselect | teardown) -> Idle
//! ```
//!
//! While sounding, two tasks live in the scheduler: the repeating beep and
//! the one-shot auto-stop. Leaving `Sounding` by any path cancels both and
//! releases the audio output.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::audio::AudioOutput;
use super::tone::{Tone, ALARM_TONE};
use crate::scheduler::{Scheduler, TaskHandle, TaskKind};

/// How long an undismissed alarm keeps sounding.
pub const AUTO_STOP_AFTER: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmStopReason {
    /// The user dismissed it.
    Dismissed,
    /// Nobody dismissed it within [`AUTO_STOP_AFTER`].
    TimedOut,
    /// The countdown was reset while sounding.
    Reset,
    /// A new duration was selected while sounding.
    Reselected,
    /// The session is shutting down.
    Teardown,
}

/// Returned by a successful activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub auto_stop_deadline: Duration,
    /// Whether the audio output could be acquired.
    pub sound: bool,
}

/// Returned when a sounding alarm stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmSummary {
    pub reason: AlarmStopReason,
    pub tones_played: u32,
    pub sounded_ms: u64,
}

#[derive(Debug, Clone, Copy)]
struct Sounding {
    activated_at: Duration,
    auto_stop_deadline: Duration,
    tone_task: TaskHandle,
    auto_stop_task: TaskHandle,
    sound: bool,
    tones_played: u32,
}

pub struct AlarmController {
    tone: Tone,
    audio: Box<dyn AudioOutput>,
    sounding: Option<Sounding>,
}

impl AlarmController {
    pub fn new(audio: Box<dyn AudioOutput>) -> Self {
        Self {
            tone: ALARM_TONE,
            audio,
            sounding: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.sounding.is_some()
    }

    /// Whether the active alarm is producing sound.
    pub fn has_sound(&self) -> bool {
        self.sounding.is_some_and(|s| s.sound)
    }

    pub fn auto_stop_deadline(&self) -> Option<Duration> {
        self.sounding.map(|s| s.auto_stop_deadline)
    }

    pub fn tones_played(&self) -> u32 {
        self.sounding.map(|s| s.tones_played).unwrap_or(0)
    }

    /// Handles of the tone and auto-stop tasks while sounding.
    pub fn task_handles(&self) -> Option<(TaskHandle, TaskHandle)> {
        self.sounding.map(|s| (s.tone_task, s.auto_stop_task))
    }

    /// Start sounding. Returns `None` if already sounding.
    ///
    /// Audio failure is logged and the alarm continues silently.
    pub fn activate(&mut self, sched: &mut Scheduler) -> Option<Activation> {
        if self.sounding.is_some() {
            warn!("alarm activation requested while already sounding; ignored");
            return None;
        }

        let sound = match self.audio.acquire(&self.tone) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "alarm sound unavailable, showing alarm without sound");
                false
            }
        };

        let now = sched.now();
        let mut sounding = Sounding {
            activated_at: now,
            auto_stop_deadline: now + AUTO_STOP_AFTER,
            tone_task: sched.every(self.tone.period, TaskKind::ToneRepeat),
            auto_stop_task: sched.after(AUTO_STOP_AFTER, TaskKind::AlarmAutoStop),
            sound,
            tones_played: 0,
        };
        self.beep(&mut sounding);
        self.sounding = Some(sounding);

        info!(sound, "alarm activated");
        Some(Activation {
            auto_stop_deadline: sounding.auto_stop_deadline,
            sound,
        })
    }

    /// Handle a due `ToneRepeat` task. Returns whether it belonged to this alarm.
    pub fn on_tone(&mut self, handle: TaskHandle) -> bool {
        let Some(mut sounding) = self.sounding else {
            return false;
        };
        if sounding.tone_task != handle {
            return false;
        }
        self.beep(&mut sounding);
        self.sounding = Some(sounding);
        true
    }

    /// Handle a due `AlarmAutoStop` task.
    pub fn on_auto_stop(&mut self, handle: TaskHandle, sched: &mut Scheduler) -> Option<AlarmSummary> {
        match self.sounding {
            Some(s) if s.auto_stop_task == handle => {
                self.deactivate(sched, AlarmStopReason::TimedOut)
            }
            _ => None,
        }
    }

    /// Stop sounding. Idempotent: returns `None` when already idle.
    pub fn deactivate(&mut self, sched: &mut Scheduler, reason: AlarmStopReason) -> Option<AlarmSummary> {
        let sounding = self.sounding.take()?;
        sched.cancel(sounding.tone_task);
        sched.cancel(sounding.auto_stop_task);
        self.audio.release();

        let sounded = sched.now().saturating_sub(sounding.activated_at);
        info!(?reason, tones = sounding.tones_played, "alarm stopped");
        Some(AlarmSummary {
            reason,
            tones_played: sounding.tones_played,
            sounded_ms: sounded.as_millis() as u64,
        })
    }

    /// Release the audio output without touching the scheduler.
    pub fn release_audio(&mut self) {
        self.audio.release();
    }

    fn beep(&mut self, sounding: &mut Sounding) {
        sounding.tones_played += 1;
        if !sounding.sound {
            return;
        }
        if let Err(e) = self.audio.play() {
            warn!(error = %e, "alarm beep failed, continuing without sound");
            sounding.sound = false;
            self.audio.release();
        } else {
            debug!(n = sounding.tones_played, "beep");
        }
    }
}

impl Drop for AlarmController {
    fn drop(&mut self) {
        self.audio.release();
    }
}

impl std::fmt::Debug for AlarmController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlarmController")
            .field("sounding", &self.sounding)
            .field("audio_acquired", &self.audio.is_acquired())
            .finish()
    }
}
