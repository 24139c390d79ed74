// Notifications published by the playback scheduler

use crate::sequencer::player::PlaybackState;

/// What the engine tells the outside world while playing.
///
/// The engine stays toolkit-free: interested parties (a UI step indicator, a
/// MIDI activity monitor) drain these from the notification channel instead
/// of registering callbacks into the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerNotification {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    Step { step: u32 },
    StateChanged { state: PlaybackState },
}
