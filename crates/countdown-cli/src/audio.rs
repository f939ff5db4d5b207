//! Sound devices for the terminal front-end.
//!
//! [`SpeakerAudio`] opens the default output device through rodio when the
//! alarm starts and queues one enveloped sine beep per `play`. [`BellAudio`]
//! rings the terminal bell. [`FallbackAudio`] tries one, then the other.

use std::io::Write;
use std::time::Duration;

use countdown_core::storage::AlarmConfig;
use countdown_core::{AudioError, AudioOutput, SilentAudio, Tone};
use rodio::source::SineWave;
use rodio::{OutputStream, Sink, Source};
use tracing::{debug, warn};

/// A sine source shaped by [`Tone::gain_at`].
pub struct Envelope<S> {
    inner: S,
    tone: Tone,
    emitted: u64,
}

impl<S> Envelope<S> {
    pub fn new(inner: S, tone: Tone) -> Self {
        Self {
            inner,
            tone,
            emitted: 0,
        }
    }
}

/// One beep of `tone`, ready to append to a sink.
pub fn beep(tone: &Tone) -> Envelope<rodio::source::TakeDuration<SineWave>> {
    let wave = SineWave::new(tone.frequency_hz as f32).take_duration(tone.length);
    Envelope::new(wave, *tone)
}

impl<S> Iterator for Envelope<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.inner.next()?;
        let per_sec = u64::from(self.inner.sample_rate()) * u64::from(self.inner.channels().max(1));
        let elapsed = Duration::from_secs_f64(self.emitted as f64 / per_sec.max(1) as f64);
        self.emitted += 1;
        Some(sample * self.tone.gain_at(elapsed))
    }
}

impl<S> Source for Envelope<S>
where
    S: Source<Item = f32>,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.inner.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }
}

/// An open output stream. The stream must outlive the sink that plays on it.
struct Device {
    sink: Sink,
    _stream: OutputStream,
}

/// The default speaker, held open while the alarm sounds.
#[derive(Default)]
pub struct SpeakerAudio {
    device: Option<Device>,
    tone: Option<Tone>,
}

impl SpeakerAudio {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioOutput for SpeakerAudio {
    fn acquire(&mut self, tone: &Tone) -> Result<(), AudioError> {
        self.release();
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| AudioError::Unavailable(e.to_string()))?;
        let sink = Sink::try_new(&handle).map_err(|e| AudioError::Unavailable(e.to_string()))?;

        debug!(frequency_hz = tone.frequency_hz, "audio acquired");
        self.device = Some(Device {
            sink,
            _stream: stream,
        });
        self.tone = Some(*tone);
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        let (Some(device), Some(tone)) = (&self.device, &self.tone) else {
            return Err(AudioError::NotAcquired);
        };
        device.sink.append(beep(tone));
        Ok(())
    }

    fn release(&mut self) {
        if let Some(device) = self.device.take() {
            device.sink.stop();
            debug!("audio released");
        }
        self.tone = None;
    }

    fn is_acquired(&self) -> bool {
        self.device.is_some()
    }
}

impl Drop for SpeakerAudio {
    fn drop(&mut self) {
        self.release();
    }
}

/// Rings the terminal bell once per beep.
pub struct BellAudio<W: Write> {
    out: W,
    acquired: bool,
}

impl<W: Write> BellAudio<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            acquired: false,
        }
    }
}

impl<W: Write> AudioOutput for BellAudio<W> {
    fn acquire(&mut self, _tone: &Tone) -> Result<(), AudioError> {
        self.acquired = true;
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if !self.acquired {
            return Err(AudioError::NotAcquired);
        }
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }

    fn release(&mut self) {
        self.acquired = false;
    }

    fn is_acquired(&self) -> bool {
        self.acquired
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Active {
    Primary,
    Fallback,
}

/// Uses `primary` while it works, otherwise `fallback`. A primary that
/// fails at acquire or on any later beep is swapped out for the rest of
/// the alarm.
pub struct FallbackAudio {
    primary: Box<dyn AudioOutput>,
    fallback: Box<dyn AudioOutput>,
    active: Option<Active>,
    tone: Option<Tone>,
}

impl FallbackAudio {
    pub fn new(primary: Box<dyn AudioOutput>, fallback: Box<dyn AudioOutput>) -> Self {
        Self {
            primary,
            fallback,
            active: None,
            tone: None,
        }
    }

    fn switch_to_fallback(&mut self, tone: &Tone) -> Result<(), AudioError> {
        self.primary.release();
        self.active = None;
        self.fallback.acquire(tone)?;
        self.active = Some(Active::Fallback);
        Ok(())
    }
}

impl AudioOutput for FallbackAudio {
    fn acquire(&mut self, tone: &Tone) -> Result<(), AudioError> {
        self.release();
        self.tone = Some(*tone);
        match self.primary.acquire(tone) {
            Ok(()) => {
                self.active = Some(Active::Primary);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "primary audio unavailable, using fallback");
                self.switch_to_fallback(tone)
            }
        }
    }

    fn play(&mut self) -> Result<(), AudioError> {
        match self.active {
            None => Err(AudioError::NotAcquired),
            Some(Active::Fallback) => self.fallback.play(),
            Some(Active::Primary) => {
                let Err(e) = self.primary.play() else {
                    return Ok(());
                };
                let tone = self.tone.ok_or(AudioError::NotAcquired)?;
                warn!(error = %e, "primary audio failed, using fallback");
                self.switch_to_fallback(&tone)?;
                self.fallback.play()
            }
        }
    }

    fn release(&mut self) {
        match self.active.take() {
            Some(Active::Primary) => self.primary.release(),
            Some(Active::Fallback) => self.fallback.release(),
            None => {}
        }
        self.tone = None;
    }

    fn is_acquired(&self) -> bool {
        self.active.is_some()
    }
}

/// Pick the sound device for the current settings.
pub fn from_config(alarm: &AlarmConfig, mute: bool) -> Box<dyn AudioOutput> {
    if mute || !alarm.sound {
        return Box::new(SilentAudio::new());
    }
    if alarm.bell_fallback {
        Box::new(FallbackAudio::new(
            Box::new(SpeakerAudio::new()),
            Box::new(BellAudio::new(std::io::stdout())),
        ))
    } else {
        Box::new(SpeakerAudio::new())
    }
}
