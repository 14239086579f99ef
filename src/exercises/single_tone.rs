//! Single tone matching exercise.
//! One reference tone and four candidates: the reference itself and three distractors
//! kept away from it and from each other.

use std::time::Duration;

use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng};

use super::{Button, ChoiceBoard, Exercise, InitContext, Response, CANDIDATES};
use crate::{
    audio::{player::Player, sequence::Timing},
    generator::{Frequency, FrequencyRange, ToneGenerator},
};

const TIMING: Timing = Timing {
    lead_in: Duration::ZERO,
    tone: Duration::from_millis(500),
    gap: Duration::ZERO,
};
const MARK_TIME: Duration = Duration::from_millis(500);

pub struct SingleTone {
    player: Player,
    generator: ToneGenerator<StdRng>,
    distance: u32,
    board: ChoiceBoard,
}

impl SingleTone {
    pub fn new(ctx: InitContext) -> Self {
        let mut generator = ToneGenerator::new(ctx.config.range, ctx.rng);
        let board = deal(&mut generator, ctx.config.distance);

        Self {
            player: ctx.player,
            generator,
            distance: ctx.config.distance,
            board,
        }
    }

    #[cfg(test)]
    pub fn board(&self) -> &ChoiceBoard {
        &self.board
    }
}

fn deal(generator: &mut ToneGenerator<StdRng>, distance: u32) -> ChoiceBoard {
    let correct = generator.random();
    let index = generator.rng().gen_range(0..CANDIDATES);
    info!("Correct frequency: {correct}Hz");

    // A distractor must never be the reference itself, even with no distance configured
    let distance = distance.max(1);
    let mut taken = vec![correct];
    for _ in 1..CANDIDATES {
        let out = generator.generate(1, &taken, distance);
        let drawn = out.frequencies[0];
        let distractor = if out.fallbacks.is_empty() && !taken.contains(&drawn) {
            drawn
        } else {
            step_from(correct, distance, &taken, generator.range())
        };
        taken.push(distractor);
    }

    let mut candidates = taken[1..].iter().map(|&x| vec![x]).collect::<Vec<_>>();
    candidates.insert(index, vec![correct]);
    debug!("Candidates: {candidates:?}");

    ChoiceBoard::new(candidates, index)
}

/// Picks a distractor whole multiples of `distance` above or below the reference.
/// Prefers values inside the range, but never returns one that is already taken.
fn step_from(
    correct: Frequency,
    distance: u32,
    taken: &[Frequency],
    range: FrequencyRange,
) -> Frequency {
    let mut outside = None;
    let steps = (1..=CANDIDATES as u32)
        .filter_map(|k| distance.checked_mul(k))
        .flat_map(|offset| [correct.checked_add(offset), correct.checked_sub(offset)])
        .flatten();

    for freq in steps.filter(|x| !taken.contains(x)) {
        if range.contains(freq) {
            return freq;
        }
        outside.get_or_insert(freq);
    }

    let freq = outside.unwrap_or(correct.saturating_add(distance));
    warn!("No distractor fits in {}..{}Hz, using {freq}Hz", range.min, range.max);
    freq
}

impl Exercise for SingleTone {
    fn name(&self) -> &'static str {
        "single-tone"
    }

    fn buttons(&self) -> Vec<Button> {
        let mut out = vec![Button::Apito];
        out.extend(self.board.buttons());
        out.extend([Button::Averiguar, Button::Misturar]);
        out
    }

    fn selected(&self) -> Option<Button> {
        self.board.selected_button()
    }

    fn press(&mut self, button: Button) -> Response {
        match button {
            // Single tones are never locked, a new one replaces whatever sounds
            Button::Apito => self.player.replace(self.board.correct(), TIMING),
            Button::Sound(number) => match self.board.select(number) {
                Some(tone) => {
                    debug!("Selected {button}");
                    self.player.replace(tone, TIMING);
                }
                None => {
                    warn!("There is no {button}");
                    return Response::Ignored;
                }
            },
            Button::Averiguar => {
                let Some((button, verdict)) = self.board.verdict() else {
                    info!("No button selected");
                    return Response::Ignored;
                };

                info!("{button} is {}", verdict.label());
                return Response::Marked {
                    button,
                    verdict,
                    clear_after: MARK_TIME,
                };
            }
            _ => {
                warn!("{button} does nothing in this exercise");
                return Response::Ignored;
            }
        }

        Response::Handled
    }

    fn reshuffle(&mut self) {
        self.player.stop();
        self.board = deal(&mut self.generator, self.distance);
    }
}

#[cfg(test)]
mod test {
    use crossbeam::channel;
    use rand::{rngs::StdRng, SeedableRng};

    use super::{step_from, SingleTone};
    use crate::{
        audio::player::Player,
        generator::FrequencyRange,
        checker::Verdict,
        config::{defaults, Settings},
        exercises::{Button, Exercise, InitContext, Response},
        misc::SampleRate,
    };

    fn exercise(seed: u64, settings: Settings) -> SingleTone {
        let (tx, _rx) = channel::unbounded();
        SingleTone::new(InitContext {
            config: settings.resolve(defaults::SINGLE_TONE),
            player: Player::new(SampleRate(1000), tx),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    #[test]
    fn test_distractors_never_equal_reference() {
        for seed in 0..32 {
            let exercise = exercise(seed, Settings::default());
            let board = exercise.board();
            let correct = board.correct()[0];

            for (i, candidate) in board.candidates().iter().enumerate() {
                assert_eq!(candidate.len(), 1);
                if i != board.correct_index() {
                    assert_ne!(candidate[0], correct);
                }
            }
        }
    }

    #[test]
    fn test_zero_distance_still_distinct() {
        let settings = Settings {
            min_frequency: Some(1000),
            max_frequency: Some(1005),
            frequency_distance: Some(0),
            ..Default::default()
        };

        for seed in 0..16 {
            let exercise = exercise(seed, settings.clone());
            let board = exercise.board();
            let mut tones = board.candidates().iter().map(|x| x[0]).collect::<Vec<_>>();
            tones.sort();
            tones.dedup();
            assert_eq!(tones.len(), 4, "{:?}", board.candidates());
        }
    }

    #[test]
    fn test_narrow_range_keeps_reference_unique() {
        // Only one tone fits in a 500Hz wide range at 500Hz distance
        let settings = Settings {
            min_frequency: Some(1000),
            max_frequency: Some(1500),
            frequency_distance: Some(500),
            ..Default::default()
        };

        for seed in 0..32 {
            let exercise = exercise(seed, settings.clone());
            let board = exercise.board();
            let correct = board.correct()[0];

            let mut tones = board.candidates().iter().map(|x| x[0]).collect::<Vec<_>>();
            assert_eq!(tones.iter().filter(|&&x| x == correct).count(), 1, "{tones:?}");
            tones.sort();
            tones.dedup();
            assert_eq!(tones.len(), 4, "{:?}", board.candidates());
        }
    }

    #[test]
    fn test_step_from_reference() {
        let range = FrequencyRange::new(1000, 3000);
        assert_eq!(step_from(2000, 500, &[2000], range), 2500);
        assert_eq!(step_from(2000, 500, &[2000, 2500], range), 1500);
        assert_eq!(step_from(2000, 500, &[2000, 2500, 1500], range), 3000);

        // Nothing fits, the closest free step outside the range is used
        let range = FrequencyRange::new(1000, 1500);
        assert_eq!(step_from(1401, 500, &[1401], range), 1901);
        assert_eq!(step_from(1401, 500, &[1401, 1901], range), 901);
    }

    #[test]
    fn test_check_selected() {
        let mut exercise = exercise(3, Settings::default());
        let right = exercise.board().correct_index() as u8 + 1;
        let wrong = right % 4 + 1;

        exercise.press(Button::Sound(wrong));
        // Picking another tone while one sounds is allowed
        assert_eq!(exercise.press(Button::Sound(right)), Response::Handled);
        assert!(matches!(
            exercise.press(Button::Averiguar),
            Response::Marked {
                verdict: Verdict::Correct,
                ..
            }
        ));

        exercise.press(Button::Sound(wrong));
        assert!(matches!(
            exercise.press(Button::Averiguar),
            Response::Marked {
                verdict: Verdict::Incorrect,
                ..
            }
        ));
    }
}
