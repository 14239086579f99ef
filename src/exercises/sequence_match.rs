//! Sequence matching exercise.
//! A reference sequence is played and the user picks which of four candidates matches it.

use std::time::Duration;

use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng};

use super::{Button, ChoiceBoard, Exercise, InitContext, Response, CANDIDATES};
use crate::{
    audio::{
        player::Player,
        sequence::{Timing, LEAD_IN},
    },
    generator::{Frequency, ToneGenerator, MAX_ATTEMPTS},
};

const TONE_DURATION: Duration = Duration::from_millis(500);
const MARK_TIME: Duration = Duration::from_millis(500);

pub struct SequenceMatch {
    player: Player,
    generator: ToneGenerator<StdRng>,
    len: usize,
    distance: u32,
    delay: Duration,
    board: ChoiceBoard,
}

impl SequenceMatch {
    pub fn new(ctx: InitContext, len: usize) -> Self {
        let mut generator = ToneGenerator::new(ctx.config.range, ctx.rng);
        let board = deal(&mut generator, len, ctx.config.distance);

        Self {
            player: ctx.player,
            generator,
            len,
            distance: ctx.config.distance,
            delay: ctx.config.delay,
            board,
        }
    }

    #[cfg(test)]
    pub fn board(&self) -> &ChoiceBoard {
        &self.board
    }

    /// Single tones are played like whistles: no lead-in and never locked.
    fn whistle(&self) -> bool {
        self.len == 1
    }

    fn timing(&self) -> Timing {
        match self.whistle() {
            true => Timing {
                lead_in: Duration::ZERO,
                tone: TONE_DURATION,
                gap: Duration::ZERO,
            },
            false => Timing {
                lead_in: LEAD_IN,
                tone: TONE_DURATION,
                gap: self.delay,
            },
        }
    }

    fn sound(&self, tones: &[Frequency]) {
        let timing = self.timing();
        match self.whistle() {
            true => self.player.replace(tones, timing),
            false => {
                self.player.play(tones, timing);
            }
        }
    }
}

/// Generates the correct sequence and three distractors, then hides the
/// correct one at a random position.
fn deal(generator: &mut ToneGenerator<StdRng>, len: usize, distance: u32) -> ChoiceBoard {
    let correct = generator.generate(len, &[], distance).frequencies;
    debug!("Correct sequence: {correct:?}");

    let mut candidates = (0..CANDIDATES)
        .map(|_| {
            let mut distractor = generator.generate(len, &[], distance).frequencies;
            for _ in 0..MAX_ATTEMPTS {
                if distractor != correct {
                    break;
                }
                distractor = generator.generate(len, &[], distance).frequencies;
            }

            if distractor == correct {
                warn!("Distractor is identical to the correct sequence");
            }
            distractor
        })
        .collect::<Vec<Vec<Frequency>>>();

    let index = generator.rng().gen_range(0..CANDIDATES);
    candidates[index] = correct;
    debug!("Candidates: {candidates:?}");

    ChoiceBoard::new(candidates, index)
}

impl Exercise for SequenceMatch {
    fn name(&self) -> &'static str {
        match self.len {
            1 => "tone-match",
            _ => "sequence-match",
        }
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
            Button::Apito => self.sound(self.board.correct()),
            Button::Sound(number) => {
                let locked = !self.whistle() && self.player.is_busy();
                let Some(tones) = self.board.select(number).map(<[Frequency]>::to_vec) else {
                    warn!("There is no {button}");
                    return Response::Ignored;
                };

                debug!("Selected {button}");
                match locked {
                    true => debug!("{button} pressed while a sequence is playing"),
                    false => self.sound(&tones),
                }
            }
            Button::Averiguar if !self.whistle() && self.player.is_busy() => {
                warn!("Can't check while a sequence is playing");
                return Response::Ignored;
            }
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
        self.board = deal(&mut self.generator, self.len, self.distance);
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use crossbeam::channel;
    use rand::{rngs::StdRng, SeedableRng};

    use super::SequenceMatch;
    use crate::{
        audio::{player::Player, sequence::PlaybackState},
        checker::Verdict,
        config::{defaults, Settings},
        exercises::{Button, ChoiceBoard, Exercise, InitContext, Response, CANDIDATES},
        misc::SampleRate,
    };

    fn exercise(seed: u64, len: usize) -> SequenceMatch {
        let (tx, _rx) = channel::unbounded();
        let ctx = InitContext {
            config: Settings::default().resolve(defaults::SEQUENCE),
            player: Player::new(SampleRate(1000), tx),
            rng: StdRng::seed_from_u64(seed),
        };
        SequenceMatch::new(ctx, len)
    }

    /// Move the correct candidate to `index`.
    fn place_correct(exercise: &mut SequenceMatch, index: usize) {
        let mut candidates = exercise.board.candidates().to_vec();
        candidates.swap(exercise.board.correct_index(), index);
        exercise.board = ChoiceBoard::new(candidates, index);
    }

    #[test]
    fn test_board_layout() {
        for seed in 0..8 {
            let exercise = exercise(seed, 5);
            let board = exercise.board();
            assert_eq!(board.candidates().len(), CANDIDATES);
            assert!(board.candidates().iter().all(|x| x.len() == 5));

            let matching = board
                .candidates()
                .iter()
                .filter(|x| x.as_slice() == board.correct())
                .count();
            assert_eq!(matching, 1);
        }
    }

    #[test]
    fn test_correct_index_two() {
        let mut exercise = exercise(11, 5);
        place_correct(&mut exercise, 2);

        // Button numbers are 1-based, index 2 is btnSound3
        exercise.press(Button::Sound(3));
        exercise.player.stop();
        assert_eq!(
            exercise.press(Button::Averiguar),
            Response::Marked {
                button: Button::Sound(3),
                verdict: Verdict::Correct,
                clear_after: Duration::from_millis(500),
            }
        );

        for other in [1, 2, 4] {
            exercise.press(Button::Sound(other));
            exercise.player.stop();
            assert_eq!(
                exercise.press(Button::Averiguar),
                Response::Marked {
                    button: Button::Sound(other),
                    verdict: Verdict::Incorrect,
                    clear_after: Duration::from_millis(500),
                }
            );
        }
    }

    #[test]
    fn test_check_needs_selection() {
        let mut exercise = exercise(5, 5);
        assert_eq!(exercise.press(Button::Averiguar), Response::Ignored);
        assert_eq!(exercise.press(Button::Sound(9)), Response::Ignored);
        assert_eq!(exercise.selected(), None);
    }

    #[test]
    fn test_selection_kept_while_playing() {
        let mut exercise = exercise(6, 5);
        assert_eq!(exercise.press(Button::Apito), Response::Handled);
        assert_eq!(exercise.press(Button::Sound(1)), Response::Handled);
        assert_eq!(exercise.selected(), Some(Button::Sound(1)));
        assert_eq!(exercise.press(Button::Averiguar), Response::Ignored);
    }

    #[test]
    fn test_single_tone_variant() {
        let mut exercise = exercise(9, 1);
        assert_eq!(exercise.name(), "tone-match");
        assert!(exercise.board().candidates().iter().all(|x| x.len() == 1));

        // Tones replace each other and checking is never locked
        assert_eq!(exercise.press(Button::Apito), Response::Handled);
        assert_eq!(exercise.press(Button::Sound(2)), Response::Handled);
        assert_eq!(exercise.player.state(), PlaybackState::Playing);
        assert!(matches!(
            exercise.press(Button::Averiguar),
            Response::Marked {
                button: Button::Sound(2),
                ..
            }
        ));
    }

    #[test]
    fn test_reshuffle_clears_selection() {
        let mut exercise = exercise(12, 5);
        exercise.press(Button::Sound(2));
        exercise.reshuffle();
        assert_eq!(exercise.selected(), None);
    }
}
