// MIDI module - wire events and the output capability

pub mod event;
pub mod output;

pub use event::MidiEvent;
pub use output::{MidiError, MidiSink, MidirSink, NullSink};
