//! Exercise settings.
//!
//! Settings come from three layers, highest priority first:
//! command line options, the JSON config file and the built-in defaults of each exercise.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::generator::{Frequency, FrequencyRange};

/// Optional values for every setting.
/// Used for both the config file and the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub min_frequency: Option<Frequency>,
    pub max_frequency: Option<Frequency>,
    /// Minimum distance between generated frequencies in Hz
    pub frequency_distance: Option<u32>,
    /// Silence between tones in milliseconds
    pub delay: Option<u64>,
    /// Number of low tones in the tone counting exercise
    pub low_count: Option<usize>,
}

/// Built-in values used when a setting is given nowhere else.
#[derive(Debug, Clone, Copy)]
pub struct Defaults {
    pub min_frequency: Frequency,
    pub max_frequency: Frequency,
    pub frequency_distance: u32,
    pub delay: u64,
    pub low_count: usize,
}

/// Fully resolved settings for one exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseConfig {
    pub range: FrequencyRange,
    pub distance: u32,
    pub delay: Duration,
    pub low_count: usize,
}

pub mod defaults {
    use super::Defaults;

    pub const SEQUENCE: Defaults = Defaults {
        min_frequency: 3000,
        max_frequency: 8000,
        frequency_distance: 500,
        delay: 600,
        low_count: 10,
    };

    pub const SINGLE_TONE: Defaults = Defaults {
        min_frequency: 20,
        ..SEQUENCE
    };

    pub const TONE_COUNT: Defaults = Defaults {
        min_frequency: 200,
        max_frequency: 500,
        frequency_distance: 0,
        delay: 500,
        low_count: 10,
    };
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file `{}`", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file `{}`", path.display()))
    }

    /// Fill the unset values of `self` from `lower`.
    pub fn or(self, lower: Settings) -> Settings {
        Settings {
            min_frequency: self.min_frequency.or(lower.min_frequency),
            max_frequency: self.max_frequency.or(lower.max_frequency),
            frequency_distance: self.frequency_distance.or(lower.frequency_distance),
            delay: self.delay.or(lower.delay),
            low_count: self.low_count.or(lower.low_count),
        }
    }

    pub fn resolve(&self, defaults: Defaults) -> ExerciseConfig {
        ExerciseConfig {
            range: FrequencyRange::new(
                self.min_frequency.unwrap_or(defaults.min_frequency),
                self.max_frequency.unwrap_or(defaults.max_frequency),
            ),
            distance: self
                .frequency_distance
                .unwrap_or(defaults.frequency_distance),
            delay: Duration::from_millis(self.delay.unwrap_or(defaults.delay)),
            low_count: self.low_count.unwrap_or(defaults.low_count),
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::{defaults, Settings};
    use crate::generator::FrequencyRange;

    #[test]
    fn test_layering() {
        let file: Settings =
            serde_json::from_str(r#"{ "min_frequency": 1000, "delay": 300 }"#).unwrap();
        let cli = Settings {
            delay: Some(900),
            ..Default::default()
        };

        let config = cli.or(file).resolve(defaults::SEQUENCE);
        assert_eq!(config.range, FrequencyRange::new(1000, 8000));
        assert_eq!(config.delay, Duration::from_millis(900));
        assert_eq!(config.distance, 500);
    }

    #[test]
    fn test_defaults_only() {
        let config = Settings::default().resolve(defaults::SINGLE_TONE);
        assert_eq!(config.range, FrequencyRange::new(20, 8000));
        assert_eq!(config.distance, 500);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<Settings>(r#"{ "minFreq": 10 }"#).is_err());
    }
}
