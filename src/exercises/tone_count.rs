//! Tone counting ("temporal resolution") exercise.
//! A shuffled run of low and high tones is played and the user answers
//! how many high tones they heard.

use std::{ops::RangeInclusive, time::Duration};

use log::{error, info, warn};
use rand::{rngs::StdRng, seq::SliceRandom, Rng};

use super::{Button, Exercise, InitContext, Response};
use crate::{
    audio::{player::Player, sequence::Timing},
    checker::{check, Verdict},
    generator::Frequency,
};

pub const LOW_FREQUENCY: Frequency = 400;
pub const HIGH_FREQUENCY: Frequency = 800;
const TONE_DURATION: Duration = Duration::from_millis(500);
const HIGH_COUNTS: RangeInclusive<usize> = 2..=6;
/// Answers that have a button.
const ANSWERS: RangeInclusive<u8> = 1..=6;
const MARK_TIME: Duration = Duration::from_millis(1000);

pub struct ToneCount {
    player: Player,
    rng: StdRng,
    low_count: usize,
    high_count: usize,
    sequence: Vec<Frequency>,
    gap: Duration,
}

impl ToneCount {
    pub fn new(mut ctx: InitContext) -> Self {
        let high_count = ctx.rng.gen_range(HIGH_COUNTS);
        Self::with_counts(ctx, high_count)
    }

    pub fn with_counts(mut ctx: InitContext, high_count: usize) -> Self {
        let low_count = ctx.config.low_count;
        let sequence = build_sequence(low_count, high_count, &mut ctx.rng);
        info!("Tone counting: {low_count} low tones, {high_count} high tones");

        Self {
            player: ctx.player,
            rng: ctx.rng,
            low_count,
            high_count,
            sequence,
            gap: ctx.config.delay,
        }
    }

    #[cfg(test)]
    pub fn sequence(&self) -> &[Frequency] {
        &self.sequence
    }

    #[cfg(test)]
    pub fn gap(&self) -> Duration {
        self.gap
    }

    fn timing(&self) -> Timing {
        Timing {
            lead_in: Duration::ZERO,
            tone: TONE_DURATION,
            gap: self.gap,
        }
    }

    /// Check a counted number of high tones.
    pub fn check_answer(&self, count: u8) -> Response {
        if !ANSWERS.contains(&count) {
            error!("Invalid count: {count}");
            return Response::Ignored;
        }

        let verdict = Verdict::of(check(&(count as usize), &self.high_count));
        info!("Answer {count} is {}", verdict.label());
        Response::Marked {
            button: Button::Sound(count),
            verdict,
            clear_after: MARK_TIME,
        }
    }
}

impl Exercise for ToneCount {
    fn name(&self) -> &'static str {
        "tone-count"
    }

    fn buttons(&self) -> Vec<Button> {
        let mut out = vec![Button::Play, Button::Pause, Button::Stop];
        out.extend(ANSWERS.map(Button::Sound));
        out.extend((1..=6).map(Button::Velo));
        out.push(Button::Misturar);
        out
    }

    fn press(&mut self, button: Button) -> Response {
        match button {
            // The sound button doubles as play / pause
            Button::Play if self.player.is_busy() => self.player.toggle(),
            Button::Play => {
                self.player.play(&self.sequence, self.timing());
            }
            Button::Pause if self.player.is_busy() => self.player.toggle(),
            Button::Pause => return Response::Ignored,
            Button::Stop => self.player.stop(),
            Button::Sound(_) if self.player.is_busy() => {
                warn!("Answers are locked while the sequence plays");
                return Response::Ignored;
            }
            Button::Sound(count) => return self.check_answer(count),
            Button::Velo(level) => match pause_for_speed(level) {
                Some(gap) => {
                    info!("Pause between tones set to {}ms", gap.as_millis());
                    self.gap = gap;
                    self.reshuffle();
                }
                None => {
                    warn!("No speed level {level}");
                    return Response::Ignored;
                }
            },
            _ => {
                warn!("{button} does nothing in this exercise");
                return Response::Ignored;
            }
        }

        Response::Handled
    }

    fn reshuffle(&mut self) {
        self.player.stop();
        self.high_count = self.rng.gen_range(HIGH_COUNTS);
        self.sequence = build_sequence(self.low_count, self.high_count, &mut self.rng);
        info!(
            "Tone counting: {} low tones, {} high tones",
            self.low_count, self.high_count
        );
    }
}

/// `low` low tones and `high` high tones in random order.
pub fn build_sequence(low: usize, high: usize, rng: &mut impl Rng) -> Vec<Frequency> {
    let mut sequence = [LOW_FREQUENCY]
        .repeat(low)
        .into_iter()
        .chain([HIGH_FREQUENCY].repeat(high))
        .collect::<Vec<_>>();
    sequence.shuffle(rng);
    sequence
}

/// The pause between tones for each `btnVelo` level.
pub fn pause_for_speed(level: u8) -> Option<Duration> {
    let ms = match level {
        1 => 1000,
        2 => 800,
        3 => 600,
        4 => 400,
        5 => 200,
        6 => 100,
        _ => return None,
    };

    Some(Duration::from_millis(ms))
}
