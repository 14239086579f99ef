use std::{fmt, str::FromStr, time::Duration};

use anyhow::{bail, Context};
use rand::rngs::StdRng;

use crate::{
    audio::player::Player,
    checker::{check, Verdict},
    config::ExerciseConfig,
    generator::Frequency,
};

pub mod sequence_match;
pub mod single_tone;
pub mod tone_count;

/// Number of candidate buttons in the matching exercises.
pub const CANDIDATES: usize = 4;

/// The buttons of an exercise.
/// Displayed and parsed by their element ids (`btnSound3`, `btnApito`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// `btnSound`, plays the tone counting sequence
    Play,
    /// `btnSound{n}`, a numbered answer or candidate (1-based)
    Sound(u8),
    /// `btnApito`, plays the reference
    Apito,
    /// `btnAveriguar`, checks the selected candidate
    Averiguar,
    Pause,
    Stop,
    /// `btnVelo{n}`, playback speed level
    Velo(u8),
    /// `btnMisturar`, generates a new exercise
    Misturar,
}

/// What happened after a button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// The press did nothing
    Ignored,
    Handled,
    /// An answer was checked, the button should show the verdict for a while
    Marked {
        button: Button,
        verdict: Verdict,
        clear_after: Duration,
    },
}

pub trait Exercise {
    fn name(&self) -> &'static str;
    /// Every button this exercise reacts to, in display order.
    fn buttons(&self) -> Vec<Button>;
    /// The currently selected candidate, if any.
    fn selected(&self) -> Option<Button> {
        None
    }
    fn press(&mut self, button: Button) -> Response;
    /// Throw away the current content and generate a new exercise instance.
    fn reshuffle(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    ToneCount,
    /// Sequence matching with `len` tones per candidate
    SequenceMatch { len: usize },
    SingleTone,
}

pub struct InitContext {
    pub config: ExerciseConfig,
    pub player: Player,
    pub rng: StdRng,
}

pub fn build(kind: Kind, ctx: InitContext) -> Box<dyn Exercise> {
    match kind {
        Kind::ToneCount => Box::new(tone_count::ToneCount::new(ctx)),
        Kind::SequenceMatch { len } => Box::new(sequence_match::SequenceMatch::new(ctx, len)),
        Kind::SingleTone => Box::new(single_tone::SingleTone::new(ctx)),
    }
}

/// Four candidates, one of which is the right answer, and the user's pick.
/// Shared by the matching exercises.
pub struct ChoiceBoard {
    candidates: Vec<Vec<Frequency>>,
    correct: usize,
    selected: Option<usize>,
}

impl ChoiceBoard {
    pub fn new(candidates: Vec<Vec<Frequency>>, correct: usize) -> Self {
        debug_assert!(correct < candidates.len());
        Self {
            candidates,
            correct,
            selected: None,
        }
    }

    #[cfg(test)]
    pub fn candidates(&self) -> &[Vec<Frequency>] {
        &self.candidates
    }

    pub fn correct(&self) -> &[Frequency] {
        &self.candidates[self.correct]
    }

    #[cfg(test)]
    pub fn correct_index(&self) -> usize {
        self.correct
    }

    /// Select the candidate behind `btnSound{number}`.
    /// Returns its tones, or `None` if there is no such button.
    pub fn select(&mut self, number: u8) -> Option<&[Frequency]> {
        let index = (number as usize).checked_sub(1)?;
        let tones = self.candidates.get(index)?;
        self.selected = Some(index);
        Some(tones.as_slice())
    }

    pub fn selected_button(&self) -> Option<Button> {
        self.selected.map(|i| Button::Sound(i as u8 + 1))
    }

    /// Compare the selected candidate with the correct one.
    pub fn verdict(&self) -> Option<(Button, Verdict)> {
        let index = self.selected?;
        let correct = check(&self.candidates[index], &self.candidates[self.correct]);
        Some((Button::Sound(index as u8 + 1), Verdict::of(correct)))
    }

    fn buttons(&self) -> impl Iterator<Item = Button> {
        (1..=self.candidates.len() as u8).map(Button::Sound)
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Button::Play => f.write_str("btnSound"),
            Button::Sound(n) => write!(f, "btnSound{n}"),
            Button::Apito => f.write_str("btnApito"),
            Button::Averiguar => f.write_str("btnAveriguar"),
            Button::Pause => f.write_str("btnPause"),
            Button::Stop => f.write_str("btnStop"),
            Button::Velo(n) => write!(f, "btnVelo{n}"),
            Button::Misturar => f.write_str("btnMisturar"),
        }
    }
}

impl FromStr for Button {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let rest = lower
            .strip_prefix("btn")
            .with_context(|| format!("Not a button: `{s}`"))?;

        Ok(match rest {
            "sound" => Button::Play,
            "apito" => Button::Apito,
            "averiguar" => Button::Averiguar,
            "pause" => Button::Pause,
            "stop" => Button::Stop,
            "misturar" => Button::Misturar,
            _ => {
                if let Some(n) = rest.strip_prefix("sound") {
                    let n = n
                        .parse()
                        .with_context(|| format!("Bad button number in `{s}`"))?;
                    Button::Sound(n)
                } else if let Some(n) = rest.strip_prefix("velo") {
                    let n = n
                        .parse()
                        .with_context(|| format!("Bad speed level in `{s}`"))?;
                    Button::Velo(n)
                } else {
                    bail!("Unknown button `{s}`")
                }
            }
        })
    }
}
