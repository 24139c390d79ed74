// Sequencer module - the event scheduling engine
// Exact musical time, the ordered event store, the playback clock and the
// playback scheduler itself.

pub mod chrono;
pub mod clock;
pub mod event;
pub mod player;
pub mod store;
pub mod time_unit;

pub use chrono::{ChronoMeter, ChronoState};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use event::{ChannelEvent, Event, N_CHANNELS, NoteEvent, ScheduledEvent};
pub use player::{EventEntry, PlaybackState, Sequencer, SequencerConfig};
pub use store::EventStore;
pub use time_unit::{TimeUnit, UNITS_PER_BEAT};

use thiserror::Error;

/// Errors surfaced by the scheduling engine.
#[derive(Debug, Error)]
pub enum SequencerError {
    #[error(
        "invalid time unit {amount}/{unit}: unit must be a power of two no finer than 1/{}",
        UNITS_PER_BEAT
    )]
    InvalidTimeUnit { amount: u64, unit: u32 },

    #[error("unknown event kind: {0:?}")]
    UnknownEventKind(String),

    #[error("cannot {op} while {state}")]
    InvalidStateTransition {
        op: &'static str,
        state: &'static str,
    },

    #[error("time {time} is outside the configured window [0, {max})")]
    OutOfRange { time: TimeUnit, max: TimeUnit },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SequencerResult<T> = Result<T, SequencerError>;
