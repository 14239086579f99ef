//! Shared handle to the sequencer.
//! The UI thread sends commands through it while the output stream pulls samples from it.

use std::sync::Arc;

use crossbeam::channel::Sender;
use parking_lot::Mutex;

use super::sequence::{PlaybackEvent, PlaybackState, Sequencer, Timing};
use crate::{generator::Frequency, misc::SampleRate};

#[derive(Clone)]
pub struct Player {
    sequencer: Arc<Mutex<Sequencer>>,
}

impl Player {
    pub fn new(sample_rate: SampleRate, events: Sender<PlaybackEvent>) -> Self {
        Self {
            sequencer: Arc::new(Mutex::new(Sequencer::new(sample_rate).events(events))),
        }
    }

    /// See [`Sequencer::play`].
    pub fn play(&self, tones: &[Frequency], timing: Timing) -> bool {
        self.sequencer.lock().play(tones, timing)
    }

    /// See [`Sequencer::replace`].
    pub fn replace(&self, tones: &[Frequency], timing: Timing) {
        self.sequencer.lock().replace(tones, timing)
    }

    pub fn toggle(&self) {
        self.sequencer.lock().toggle()
    }

    pub fn stop(&self) {
        self.sequencer.lock().stop()
    }

    pub fn state(&self) -> PlaybackState {
        self.sequencer.lock().state()
    }

    /// A sequence is playing or paused.
    pub fn is_busy(&self) -> bool {
        self.state() != PlaybackState::Idle
    }

    /// Fill an interleaved output buffer.
    /// The same sample is written to every channel of a frame.
    pub fn output(&self, output: &mut [f32], channels: usize, gain: f32) {
        let mut sequencer = self.sequencer.lock();
        let mut last = 0.0;
        for (i, e) in output.iter_mut().enumerate() {
            if i % channels == 0 {
                last = sequencer.next().unwrap_or(0.) * gain;
            }

            *e = last;
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use crossbeam::channel;

    use super::Player;
    use crate::{
        audio::sequence::{PlaybackEvent, PlaybackState, Timing},
        misc::SampleRate,
    };

    const TIMING: Timing = Timing {
        lead_in: Duration::ZERO,
        tone: Duration::from_millis(20),
        gap: Duration::ZERO,
    };

    #[test]
    fn test_output_duplicates_channels() {
        let (tx, _rx) = channel::unbounded();
        let player = Player::new(SampleRate(1000), tx);
        player.play(&[100], TIMING);

        let mut buf = [0.0; 16];
        player.output(&mut buf, 2, 0.5);
        for frame in buf.chunks(2) {
            assert_eq!(frame[0], frame[1]);
            assert!(frame[0].abs() <= 0.5);
        }
        assert!(buf.iter().any(|x| *x != 0.0));
    }

    #[test]
    fn test_busy_until_finished() {
        let (tx, rx) = channel::unbounded();
        let player = Player::new(SampleRate(1000), tx);
        assert!(!player.is_busy());

        assert!(player.play(&[100, 200], TIMING));
        assert!(player.is_busy());
        assert!(!player.play(&[300], TIMING));

        let mut buf = [0.0; 256];
        player.output(&mut buf, 1, 1.0);
        assert_eq!(player.state(), PlaybackState::Idle);
        assert_eq!(
            rx.try_iter().last(),
            Some(PlaybackEvent::Finished { stopped: false })
        );
    }
}
