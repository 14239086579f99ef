//! Audio utilities.
//! Tone generation, sequencing and the output device.

pub mod devices;
pub mod player;
pub mod sequence;
pub mod tone;
