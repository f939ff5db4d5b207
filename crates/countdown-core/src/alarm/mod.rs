mod audio;
mod controller;
mod tone;

pub use audio::{AudioOutput, SilentAudio};
pub use controller::{Activation, AlarmController, AlarmStopReason, AlarmSummary, AUTO_STOP_AFTER};
pub use tone::{Tone, ALARM_TONE};
