//! Random tone generation.
//! Frequencies are drawn from a range and kept a minimum distance apart
//! from each other by rejection sampling.

use log::{debug, warn};
use rand::Rng;

/// A frequency in Hz.
pub type Frequency = u32;

/// How many candidates are drawn for one value before falling back.
pub const MAX_ATTEMPTS: usize = 50;

/// Inclusive range of frequencies to draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyRange {
    pub min: Frequency,
    pub max: Frequency,
}

impl FrequencyRange {
    /// Create a new range.
    /// The bounds are swapped if they are given in the wrong order.
    pub fn new(min: Frequency, max: Frequency) -> Self {
        if min > max {
            warn!("Frequency range {min}..{max} is reversed, swapping bounds");
            return Self { min: max, max: min };
        }

        Self { min, max }
    }

    pub fn contains(&self, freq: Frequency) -> bool {
        (self.min..=self.max).contains(&freq)
    }
}

/// The output of [`ToneGenerator::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub frequencies: Vec<Frequency>,
    /// Positions in `frequencies` that came from the fallback path
    /// and may violate the minimum distance.
    pub fallbacks: Vec<usize>,
}

pub struct ToneGenerator<R: Rng> {
    range: FrequencyRange,
    rng: R,
}

impl<R: Rng> ToneGenerator<R> {
    pub fn new(range: FrequencyRange, rng: R) -> Self {
        Self { range, rng }
    }

    pub fn range(&self) -> FrequencyRange {
        self.range
    }

    pub fn rng(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Draw one frequency uniformly from the range.
    pub fn random(&mut self) -> Frequency {
        self.rng.gen_range(self.range.min..=self.range.max)
    }

    /// Generate `count` frequencies that are at least `min_distance` away from
    /// every value in `existing` and from each other.
    ///
    /// Each value gets [`MAX_ATTEMPTS`] tries. After that a value is derived from the
    /// previous one (see [`ToneGenerator::fallback`]) and its position is recorded in
    /// [`Generated::fallbacks`].
    pub fn generate(
        &mut self,
        count: usize,
        existing: &[Frequency],
        min_distance: u32,
    ) -> Generated {
        let mut frequencies = Vec::with_capacity(count);
        let mut fallbacks = Vec::new();

        for i in 0..count {
            let found = (0..MAX_ATTEMPTS).map(|_| self.random()).find(|&candidate| {
                existing
                    .iter()
                    .chain(frequencies.iter())
                    .all(|&freq| candidate.abs_diff(freq) >= min_distance)
            });

            let freq = match found {
                Some(freq) => freq,
                None => {
                    let prior = frequencies.last().or(existing.last()).copied();
                    let freq = self.fallback(prior, min_distance);
                    warn!(
                        "No frequency {min_distance}Hz away from the others after {MAX_ATTEMPTS} attempts, using {freq}Hz"
                    );
                    fallbacks.push(i);
                    freq
                }
            };

            debug!("Generated frequency: {freq}Hz");
            frequencies.push(freq);
        }

        Generated {
            frequencies,
            fallbacks,
        }
    }

    /// `prior + min_distance`, or `prior - min_distance` when that would leave the range.
    /// Without a prior value the bottom of the range is used.
    fn fallback(&self, prior: Option<Frequency>, min_distance: u32) -> Frequency {
        let prior = prior.unwrap_or(self.range.min);
        match prior.checked_add(min_distance) {
            Some(up) if up <= self.range.max => up,
            _ => prior.saturating_sub(min_distance),
        }
    }
}
