use super::tone::Tone;
use crate::error::AudioError;

/// A sound device the alarm borrows while it is sounding.
///
/// `acquire` is called once on activation, `play` once per beep, and
/// `release` on every deactivation path. `release` must be safe to call
/// when nothing is held.
pub trait AudioOutput {
    fn acquire(&mut self, tone: &Tone) -> Result<(), AudioError>;
    fn play(&mut self) -> Result<(), AudioError>;
    fn release(&mut self);
    fn is_acquired(&self) -> bool;
}

/// Produces no sound; counts what it was asked to do.
#[derive(Debug, Default)]
pub struct SilentAudio {
    acquired: bool,
    pub beeps: u32,
    pub acquisitions: u32,
    pub releases: u32,
}

impl SilentAudio {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioOutput for SilentAudio {
    fn acquire(&mut self, _tone: &Tone) -> Result<(), AudioError> {
        self.acquired = true;
        self.acquisitions += 1;
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if !self.acquired {
            return Err(AudioError::NotAcquired);
        }
        self.beeps += 1;
        Ok(())
    }

    fn release(&mut self) {
        if self.acquired {
            self.acquired = false;
            self.releases += 1;
        }
    }

    fn is_acquired(&self) -> bool {
        self.acquired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::ALARM_TONE;

    #[test]
    fn silent_audio_requires_acquire() {
        let mut audio = SilentAudio::new();
        assert!(matches!(audio.play(), Err(AudioError::NotAcquired)));
        audio.acquire(&ALARM_TONE).unwrap();
        audio.play().unwrap();
        audio.release();
        audio.release();
        assert_eq!(audio.beeps, 1);
        assert_eq!(audio.releases, 1);
        assert!(!audio.is_acquired());
    }
}
