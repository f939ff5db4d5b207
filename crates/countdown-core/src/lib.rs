//! # countdown Core Library
//!
//! Business logic for the `countdown` timer: pick a duration, count it down
//! one second at a time, then sound an alarm until it is dismissed or times
//! out after thirty seconds.
//!
//! ## Architecture
//!
//! - **Scheduler**: a virtual monotonic clock holding cancellable one-shot and
//!   repeating tasks. Nothing fires unless the owner advances it.
//! - **Timer**: duration validation, the countdown state machine and `MM:SS`
//!   formatting.
//! - **Alarm**: the alarm state machine, the synthesized beep and the
//!   [`AudioOutput`] seam for sound devices.
//! - **Session**: the owned controller that wires the above together and turns
//!   user commands and clock advances into [`Event`]s.
//! - **Storage**: TOML configuration.
//!
//! ## Key Components
//!
//! - [`Session`]: the entry point for front-ends
//! - [`TimerController`] / [`AlarmController`]: the two state machines
//! - [`Config`]: application configuration management
//! - [`AnalyticsSink`]: optional usage reporting

pub mod alarm;
pub mod analytics;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod timer;

pub use alarm::{AlarmController, AlarmStopReason, AudioOutput, SilentAudio, Tone, ALARM_TONE};
pub use analytics::{AnalyticsEvent, AnalyticsKind, AnalyticsSink, JsonLinesSink};
pub use error::{AudioError, ConfigError, CoreError, ValidationError};
pub use events::{Event, Snapshot, View};
pub use scheduler::{Scheduler, TaskHandle, TaskKind};
pub use session::Session;
pub use storage::Config;
pub use timer::{format_mmss, DurationMinutes, TimerController, ToggleLabel};
