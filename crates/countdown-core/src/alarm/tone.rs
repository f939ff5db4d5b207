//! The alarm beep: a short sine pulse with an exponential fade.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f64,
    pub length: Duration,
    /// Time between the starts of consecutive beeps.
    pub period: Duration,
    pub start_gain: f64,
    pub end_gain: f64,
}

pub const ALARM_TONE: Tone = Tone {
    frequency_hz: 800.0,
    length: Duration::from_millis(500),
    period: Duration::from_millis(600),
    start_gain: 0.3,
    end_gain: 0.01,
};

impl Tone {
    /// Gain `elapsed` into the beep. Ramps exponentially from `start_gain`
    /// to `end_gain` over `length`, then holds `end_gain`.
    pub fn gain_at(&self, elapsed: Duration) -> f32 {
        let length = self.length.as_secs_f64();
        if length <= 0.0 {
            return self.end_gain as f32;
        }
        let progress = (elapsed.as_secs_f64() / length).min(1.0);
        let ratio = self.end_gain / self.start_gain;
        (self.start_gain * ratio.powf(progress)) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beep_fits_inside_period() {
        assert!(ALARM_TONE.length < ALARM_TONE.period);
    }

    #[test]
    fn gain_ramps_down_exponentially() {
        let t = ALARM_TONE;
        assert!((t.gain_at(Duration::ZERO) - 0.3).abs() < 1e-6);
        assert!((t.gain_at(t.length) - 0.01).abs() < 1e-6);
        assert!((t.gain_at(Duration::from_secs(2)) - 0.01).abs() < 1e-6);

        // Halfway is the geometric mean, not the arithmetic one.
        let mid = t.gain_at(t.length / 2);
        assert!((mid - (0.3f32 * 0.01).sqrt()).abs() < 1e-4, "mid {mid}");
    }

    #[test]
    fn gain_never_increases() {
        let t = ALARM_TONE;
        let gains: Vec<f32> = (0..=50).map(|ms| t.gain_at(Duration::from_millis(ms * 10))).collect();
        assert!(gains.windows(2).all(|w| w[1] <= w[0]));
    }
}
