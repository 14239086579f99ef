use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{builder::EnumValueParser, value_parser, Arg, ArgMatches, Command, ValueEnum};

use crate::{
    config::{defaults, Defaults, Settings},
    exercises::Kind,
};

/// Whether the sequence exercise plays whole sequences or single tones.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Five tones per candidate
    Sequence,
    /// One tone per candidate
    Tones,
}

#[derive(Debug)]
pub struct Args {
    pub kind: Kind,
    pub defaults: Defaults,
    /// Settings given on the command line
    pub settings: Settings,
    pub config: Option<PathBuf>,
    pub output_device: String,
    pub output_gain: f32,
    pub seed: Option<u64>,
}

pub fn command() -> Command {
    Command::new("tone-drills")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .subcommand_required(true)
        .args([
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON file with default settings"),
            Arg::new("output-device")
                .long("output-device")
                .short('o')
                .global(true)
                .default_value("default")
                .help("Output device, picked by closest name"),
            Arg::new("output-gain")
                .long("output-gain")
                .global(true)
                .default_value("1.0")
                .value_parser(value_parser!(f32)),
            Arg::new("seed")
                .long("seed")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Seed the random generator to get the same exercise every time"),
            Arg::new("min-freq")
                .long("min-freq")
                .global(true)
                .value_parser(value_parser!(u32)),
            Arg::new("max-freq")
                .long("max-freq")
                .global(true)
                .value_parser(value_parser!(u32)),
            Arg::new("distance")
                .long("distance")
                .alias("distancia")
                .global(true)
                .value_parser(value_parser!(u32))
                .help("Minimum distance between generated frequencies (Hz)"),
            Arg::new("delay")
                .long("delay")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Silence between tones (ms)"),
        ])
        .subcommands([
            Command::new("count")
                .alias("temporal")
                .about("Count the high tones in a shuffled run of low and high tones.")
                .arg(
                    Arg::new("low-count")
                        .long("low-count")
                        .value_parser(value_parser!(usize))
                        .help("Number of low tones"),
                ),
            Command::new("sequence")
                .alias("seq")
                .about("Find the candidate that matches the reference sequence.")
                .arg(
                    Arg::new("variant")
                        .long("variant")
                        .default_value("sequence")
                        .value_parser(EnumValueParser::<Variant>::new()),
                ),
            Command::new("single")
                .alias("unique")
                .about("Find the candidate that matches the reference tone."),
        ])
}

pub fn parse_args() -> Result<Args> {
    from_matches(&command().get_matches())
}

fn from_matches(m: &ArgMatches) -> Result<Args> {
    let (kind, defaults, m) = match m.subcommand() {
        Some(("count", m)) => (Kind::ToneCount, defaults::TONE_COUNT, m),
        Some(("sequence", m)) => {
            let len = match m.get_one::<Variant>("variant") {
                Some(Variant::Tones) => 1,
                _ => 5,
            };
            (Kind::SequenceMatch { len }, defaults::SEQUENCE, m)
        }
        Some(("single", m)) => (Kind::SingleTone, defaults::SINGLE_TONE, m),
        _ => bail!("Invalid subcommand"),
    };

    let settings = Settings {
        min_frequency: m.get_one("min-freq").copied(),
        max_frequency: m.get_one("max-freq").copied(),
        frequency_distance: m.get_one("distance").copied(),
        delay: m.get_one("delay").copied(),
        low_count: match kind {
            Kind::ToneCount => m.get_one("low-count").copied(),
            _ => None,
        },
    };

    Ok(Args {
        kind,
        defaults,
        settings,
        config: m.get_one::<PathBuf>("config").cloned(),
        output_device: m
            .get_one::<String>("output-device")
            .cloned()
            .unwrap_or_else(|| "default".to_owned()),
        output_gain: m.get_one::<f32>("output-gain").copied().unwrap_or(1.0),
        seed: m.get_one("seed").copied(),
    })
}

#[cfg(test)]
mod test {
    use super::{command, from_matches};
    use crate::exercises::Kind;

    fn parse(args: &[&str]) -> super::Args {
        let m = command()
            .try_get_matches_from(std::iter::once("tone-drills").chain(args.iter().copied()))
            .unwrap();
        from_matches(&m).unwrap()
    }

    #[test]
    fn test_subcommands() {
        assert_eq!(parse(&["count"]).kind, Kind::ToneCount);
        assert_eq!(parse(&["single"]).kind, Kind::SingleTone);
        assert_eq!(parse(&["seq"]).kind, Kind::SequenceMatch { len: 5 });
        assert_eq!(
            parse(&["sequence", "--variant", "tones"]).kind,
            Kind::SequenceMatch { len: 1 }
        );
    }

    #[test]
    fn test_settings() {
        let args = parse(&[
            "sequence",
            "--min-freq",
            "1000",
            "--distancia",
            "250",
            "--seed",
            "4",
        ]);
        assert_eq!(args.settings.min_frequency, Some(1000));
        assert_eq!(args.settings.max_frequency, None);
        assert_eq!(args.settings.frequency_distance, Some(250));
        assert_eq!(args.seed, Some(4));
        assert_eq!(args.output_device, "default");

        let args = parse(&["--delay", "300", "count", "--low-count", "8"]);
        assert_eq!(args.settings.delay, Some(300));
        assert_eq!(args.settings.low_count, Some(8));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(command().try_get_matches_from(["tone-drills"]).is_err());
    }
}
