mod controller;
mod duration;
mod format;

pub use controller::{TickOutcome, TimerController, TimerState, ToggleLabel, TICK_PERIOD};
pub use duration::DurationMinutes;
pub use format::{format_mmss, progress_bar, progress_fraction};
