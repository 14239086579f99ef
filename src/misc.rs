use std::time::Duration;

use hashbrown::HashMap;

/// The number of samples per second in the **output stream**.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// Number of samples (per channel) that fit in `duration`.
    pub fn samples(&self, duration: Duration) -> usize {
        (duration.as_secs_f64() * self.0 as f64).round() as usize
    }
}

impl From<u32> for SampleRate {
    fn from(hz: u32) -> Self {
        Self(hz)
    }
}

pub trait Similarity {
    fn similarity(&self, other: &Self) -> f64;
}

impl<T: AsRef<str>> Similarity for T {
    fn similarity(&self, other: &Self) -> f64 {
        similarity(self.as_ref(), other.as_ref())
    }
}

/// Dice coefficient over the character bigrams of both strings (spaces ignored).
pub fn similarity(str1: &str, str2: &str) -> f64 {
    let a = str1.replace(' ', "").chars().collect::<Vec<_>>();
    let b = str2.replace(' ', "").chars().collect::<Vec<_>>();

    // Check some simple cases
    if a == b {
        return 1.0;
    }

    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let mut first_bigrams = HashMap::<(char, char), i32>::new();
    for pair in a.windows(2) {
        *first_bigrams.entry((pair[0], pair[1])).or_insert(0) += 1;
    }

    let mut intersection_size = 0;
    for pair in b.windows(2) {
        if let Some(count) = first_bigrams.get_mut(&(pair[0], pair[1])) {
            if *count > 0 {
                *count -= 1;
                intersection_size += 1;
            }
        }
    }

    (2.0 * intersection_size as f64) / (a.len() + b.len() - 2) as f64
}
