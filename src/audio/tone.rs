use std::f32::consts::PI;

use crate::misc::SampleRate;

/// Sine wave at a fixed frequency.
/// Runs forever unless a duration (in samples) is set.
#[derive(Clone, Copy, Debug)]
pub struct Tone {
    i: usize,
    tone: f32,
    sample_rate: f32,
    duration: Option<usize>,
}

/// A [`Tone`] with a linear fade in and fade out.
/// Stops the speaker from clicking when a tone starts or ends.
#[derive(Clone, Copy, Debug)]
pub struct SmoothTone {
    inner: Tone,
    duration: usize,
    ramp: usize,
}

impl Tone {
    pub fn new(tone: f32, sample_rate: SampleRate) -> Self {
        Self {
            i: 0,
            sample_rate: sample_rate.0 as f32,
            tone,
            duration: None,
        }
    }

    pub fn duration(mut self, duration: usize) -> Self {
        self.duration = Some(duration);
        self
    }
}

impl Iterator for Tone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        self.i += 1;

        match self.duration {
            Some(i) if self.i > i => return None,
            _ => {}
        }

        Some((self.i as f32 * self.tone * 2.0 * PI / self.sample_rate).sin())
    }
}

impl SmoothTone {
    /// The fades last one period of the wave, or half the tone if it is shorter than two periods.
    pub fn new(tone: f32, sample_rate: SampleRate, duration: usize) -> Self {
        let period = (tone.recip() * sample_rate.0 as f32) as usize;
        Self {
            inner: Tone::new(tone, sample_rate).duration(duration),
            duration,
            ramp: period.min(duration / 2),
        }
    }
}

impl Iterator for SmoothTone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = self.inner.next()?;
        if self.ramp == 0 {
            return Some(raw);
        }

        let edge = self.inner.i.min(self.duration - self.inner.i);
        let gain = (edge as f32 / self.ramp as f32).min(1.0);
        Some(raw * gain)
    }
}

#[cfg(test)]
mod test {
    use super::{SmoothTone, Tone};
    use crate::misc::SampleRate;

    #[test]
    fn test_tone_duration() {
        let tone = Tone::new(440.0, SampleRate(8000)).duration(100);
        assert_eq!(tone.count(), 100);
    }

    #[test]
    fn test_smooth_tone_fades() {
        let samples = SmoothTone::new(100.0, SampleRate(1000), 50).collect::<Vec<_>>();

        assert_eq!(samples.len(), 50);
        assert_eq!(*samples.last().unwrap(), 0.0);
        assert!(samples.iter().all(|x| x.abs() <= 1.0));

        // The first period is quieter than the raw wave
        let raw = Tone::new(100.0, SampleRate(1000)).duration(50);
        for (smooth, raw) in samples.iter().zip(raw).take(9) {
            assert!(smooth.abs() <= raw.abs());
        }
    }
}
