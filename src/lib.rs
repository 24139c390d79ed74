// stepseq - Musical event scheduling engine
// Stores time-indexed events, expands them into dispatchable MIDI actions,
// and drives drift-correct real-time playback.

pub mod messaging;
pub mod midi;
pub mod sequencer;

// Re-export commonly used types for convenience
pub use messaging::channels::{
    NotificationConsumer, NotificationProducer, create_notification_channel,
};
pub use messaging::notification::SequencerNotification;
pub use midi::event::MidiEvent;
pub use midi::output::{MidiError, MidiSink, MidirSink, NullSink};
pub use sequencer::{
    ChannelEvent, ChronoMeter, ChronoState, Clock, Event, EventEntry, EventStore, ManualClock,
    MonotonicClock, N_CHANNELS, NoteEvent, PlaybackState, ScheduledEvent, Sequencer,
    SequencerConfig, SequencerError, SequencerResult, TimeUnit, UNITS_PER_BEAT,
};
