//! Tone sequencer.
//! Turns a list of frequencies into samples, one tone after another,
//! and handles pausing and stopping between tones.

use std::{collections::VecDeque, time::Duration};

use crossbeam::channel::Sender;
use log::debug;

use super::tone::{SmoothTone, Tone};
use crate::{generator::Frequency, misc::SampleRate};

/// Silence before the first tone of a sequence.
pub const LEAD_IN: Duration = Duration::from_millis(100);

pub trait Sequenceable {
    fn new(freq: f32, sample_rate: SampleRate, duration: usize) -> Self;
    fn next(&mut self) -> Option<f32>;
}

/// How a sequence is laid out in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Silence before the first tone
    pub lead_in: Duration,
    /// How long each tone sounds
    pub tone: Duration,
    /// Silence after each tone
    pub gap: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// A tone at this frequency just started sounding
    ToneStarted(Frequency),
    /// The sequence is over and the sequencer is idle again
    Finished { stopped: bool },
}

enum Stage<T> {
    /// Nothing to play
    Idle,
    /// Waiting this many samples before the first tone
    LeadIn(usize),
    /// Playing a tone
    Sounding(T),
    /// Waiting this many samples after a tone
    Gap(usize),
    /// Holding at a tone boundary until resumed
    Paused,
}

/// A queue of tones played one at a time.
/// Only one sequence can be played at once, see [`Sequencer::play`].
pub struct Sequencer<T: Sequenceable = SmoothTone> {
    sample_rate: SampleRate,
    queue: VecDeque<Frequency>,
    stage: Stage<T>,
    tone_samples: usize,
    gap_samples: usize,
    pause_requested: bool,
    stop_requested: bool,
    events: Option<Sender<PlaybackEvent>>,
}

impl<T: Sequenceable> Sequencer<T> {
    pub fn new(sample_rate: SampleRate) -> Self {
        Self {
            sample_rate,
            queue: VecDeque::new(),
            stage: Stage::Idle,
            tone_samples: 0,
            gap_samples: 0,
            pause_requested: false,
            stop_requested: false,
            events: None,
        }
    }

    /// Publish [`PlaybackEvent`]s on this channel.
    pub fn events(mut self, events: Sender<PlaybackEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> PlaybackState {
        match self.stage {
            Stage::Idle => PlaybackState::Idle,
            _ if self.pause_requested => PlaybackState::Paused,
            _ => PlaybackState::Playing,
        }
    }

    /// Start playing `frequencies`.
    /// Returns false and changes nothing if a sequence is already active (playing or paused).
    pub fn play(&mut self, frequencies: &[Frequency], timing: Timing) -> bool {
        if !matches!(self.stage, Stage::Idle) {
            debug!("Already playing a sequence, ignoring new one");
            return false;
        }

        self.queue = frequencies.iter().copied().collect();
        self.tone_samples = self.sample_rate.samples(timing.tone);
        self.gap_samples = self.sample_rate.samples(timing.gap);
        self.pause_requested = false;
        self.stop_requested = false;
        self.stage = Stage::LeadIn(self.sample_rate.samples(timing.lead_in));
        true
    }

    /// Drop whatever is playing right now and start `frequencies` in its place.
    pub fn replace(&mut self, frequencies: &[Frequency], timing: Timing) {
        if !matches!(self.stage, Stage::Idle) {
            self.finish(true);
        }

        self.play(frequencies, timing);
    }

    /// Stop after the tone that is sounding now.
    /// If no tone is sounding the sequence stops right away.
    pub fn stop(&mut self) {
        match self.stage {
            Stage::Idle => {}
            Stage::Sounding(_) => self.stop_requested = true,
            _ => self.finish(true),
        }
    }

    /// Hold before the next tone.
    pub fn pause(&mut self) {
        if !matches!(self.stage, Stage::Idle) {
            self.pause_requested = true;
        }
    }

    /// Continue with the next tone that has not been played.
    pub fn resume(&mut self) {
        self.pause_requested = false;
        if matches!(self.stage, Stage::Paused) {
            self.advance();
        }
    }

    /// Pause if playing, resume if paused.
    pub fn toggle(&mut self) {
        match self.state() {
            PlaybackState::Idle => {}
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(),
        }
    }

    /// Called at every tone boundary.
    fn advance(&mut self) {
        if self.stop_requested {
            return self.finish(true);
        }

        if self.pause_requested {
            self.stage = Stage::Paused;
            return;
        }

        match self.queue.pop_front() {
            Some(freq) => {
                self.stage =
                    Stage::Sounding(T::new(freq as f32, self.sample_rate, self.tone_samples));
                self.emit(PlaybackEvent::ToneStarted(freq));
            }
            None => self.finish(false),
        }
    }

    fn finish(&mut self, stopped: bool) {
        self.queue.clear();
        self.stage = Stage::Idle;
        self.pause_requested = false;
        self.stop_requested = false;
        self.emit(PlaybackEvent::Finished { stopped });
    }

    fn emit(&self, event: PlaybackEvent) {
        if let Some(events) = &self.events {
            // The receiver going away just means nobody is listening anymore
            let _ = events.send(event);
        }
    }
}

impl<T: Sequenceable> Iterator for Sequencer<T> {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.stage {
            Stage::Idle | Stage::Paused => return Some(0.0),
            Stage::LeadIn(remaining) | Stage::Gap(remaining) => {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Some(0.0);
                }
            }
            Stage::Sounding(tone) => {
                if let Some(sample) = tone.next() {
                    return Some(sample);
                }
            }
        }

        // The current stage ran out
        match self.stage {
            Stage::Sounding(_) if self.stop_requested => self.finish(true),
            Stage::Sounding(_) => self.stage = Stage::Gap(self.gap_samples),
            _ => self.advance(),
        }

        Some(0.0)
    }
}

impl Sequenceable for Tone {
    fn new(freq: f32, sample_rate: SampleRate, duration: usize) -> Self {
        Self::new(freq, sample_rate).duration(duration)
    }

    fn next(&mut self) -> Option<f32> {
        Iterator::next(self)
    }
}

impl Sequenceable for SmoothTone {
    fn new(freq: f32, sample_rate: SampleRate, duration: usize) -> Self {
        Self::new(freq, sample_rate, duration)
    }

    fn next(&mut self) -> Option<f32> {
        Iterator::next(self)
    }
}
