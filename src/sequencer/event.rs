// Event model - user-level musical intents and the dispatchable actions
// they schedule into.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sequencer::SequencerError;
use crate::sequencer::time_unit::TimeUnit;

/// Number of addressable MIDI channels.
pub const N_CHANNELS: u8 = 16;

/// A user-authored musical intent, tagged for serialization.
///
/// `schedule` is the single extension point for new musical constructs: a
/// new construct is a new variant plus its expansion into scheduled events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum Event {
    #[serde(rename = "note_event")]
    Note(NoteEvent),
}

/// A note with velocity and duration.
///
/// Two note events are equal iff note, velocity and duration all match;
/// the store's deduplication and removal-by-value rely on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI note number (0-127, where 60 = C4)
    pub note: u8,

    /// MIDI velocity (0-127)
    pub velocity: u8,

    /// How long the note sounds
    pub duration: TimeUnit,
}

impl NoteEvent {
    pub fn new(note: u8, velocity: u8, duration: TimeUnit) -> Self {
        assert!(note <= 127, "MIDI note must be 0-127");
        assert!(velocity <= 127, "MIDI velocity must be 0-127");
        Self {
            note,
            velocity,
            duration,
        }
    }
}

impl Event {
    /// Expands this event into the scheduled actions it stands for,
    /// anchored at `start_time`. Pure: no side effects, no clock access.
    pub fn schedule(&self, start_time: TimeUnit) -> Vec<ScheduledEvent> {
        match self {
            Event::Note(note) => vec![
                ScheduledEvent::NoteOn {
                    time: start_time,
                    note: note.note,
                    velocity: note.velocity,
                },
                ScheduledEvent::NoteOff {
                    time: start_time + note.duration,
                    note: note.note,
                },
            ],
        }
    }

    /// Serializes to the tagged JSON form
    /// (`{"event_type": "note_event", ...}`).
    pub fn to_json(&self) -> Result<Value, SequencerError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Rebuilds an event from its tagged JSON form.
    ///
    /// The discriminator is checked explicitly so an unrecognized kind
    /// surfaces as `UnknownEventKind` instead of a generic parse failure.
    pub fn from_json(value: &Value) -> Result<Self, SequencerError> {
        let kind = value
            .get("event_type")
            .and_then(Value::as_str)
            .ok_or_else(|| SequencerError::UnknownEventKind("<missing>".to_string()))?;
        match kind {
            "note_event" => Ok(serde_json::from_value(value.clone())?),
            other => Err(SequencerError::UnknownEventKind(other.to_string())),
        }
    }
}

/// A concrete, time-stamped dispatchable action.
///
/// Produced only by `Event::schedule`; the dispatcher matches exhaustively,
/// so an unhandled variant is a compile error rather than a runtime one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledEvent {
    NoteOn {
        time: TimeUnit,
        note: u8,
        velocity: u8,
    },
    NoteOff {
        time: TimeUnit,
        note: u8,
    },
    Stop {
        time: TimeUnit,
    },
}

impl ScheduledEvent {
    pub fn time(&self) -> TimeUnit {
        match self {
            ScheduledEvent::NoteOn { time, .. }
            | ScheduledEvent::NoteOff { time, .. }
            | ScheduledEvent::Stop { time } => *time,
        }
    }
}

/// An event paired with the MIDI channel it targets.
///
/// Equality is structural (channel plus event content).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEvent {
    pub channel: u8,
    pub event: Event,
}

impl ChannelEvent {
    pub fn new(channel: u8, event: Event) -> Self {
        assert!(channel < N_CHANNELS, "MIDI channel must be 0-15");
        Self { channel, event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(note: u8, velocity: u8, beats: u64) -> Event {
        Event::Note(NoteEvent::new(note, velocity, TimeUnit::beats(beats)))
    }

    #[test]
    fn test_note_schedule() {
        let scheduled = note(60, 100, 1).schedule(TimeUnit::beats(2));
        assert_eq!(
            scheduled,
            vec![
                ScheduledEvent::NoteOn {
                    time: TimeUnit::beats(2),
                    note: 60,
                    velocity: 100,
                },
                ScheduledEvent::NoteOff {
                    time: TimeUnit::beats(3),
                    note: 60,
                },
            ]
        );
    }

    #[test]
    fn test_schedule_is_pure() {
        let event = note(64, 80, 2);
        assert_eq!(
            event.schedule(TimeUnit::beats(0)),
            event.schedule(TimeUnit::beats(0))
        );
    }

    #[test]
    fn test_note_equality() {
        assert_eq!(note(60, 100, 1), note(60, 100, 1));
        assert_ne!(note(60, 100, 1), note(60, 101, 1));
        assert_ne!(note(60, 100, 1), note(60, 100, 2));
    }

    #[test]
    fn test_json_round_trip() {
        let event = Event::Note(NoteEvent::new(60, 64, TimeUnit::new(3, 2).unwrap()));
        let json = event.to_json().unwrap();
        assert_eq!(json["event_type"], "note_event");
        assert_eq!(json["note"], 60);
        assert_eq!(json["velocity"], 64);
        assert_eq!(json["duration"], 384);

        let back = Event::from_json(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_unknown_event_kind_rejected() {
        let value = serde_json::json!({"event_type": "wobble_event", "depth": 3});
        match Event::from_json(&value) {
            Err(SequencerError::UnknownEventKind(kind)) => assert_eq!(kind, "wobble_event"),
            other => panic!("expected UnknownEventKind, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_discriminator_rejected() {
        let value = serde_json::json!({"note": 60, "velocity": 64, "duration": 256});
        assert!(matches!(
            Event::from_json(&value),
            Err(SequencerError::UnknownEventKind(_))
        ));
    }

    #[test]
    fn test_scheduled_event_time() {
        assert_eq!(
            ScheduledEvent::Stop {
                time: TimeUnit::beats(4)
            }
            .time(),
            TimeUnit::beats(4)
        );
    }

    #[test]
    #[should_panic(expected = "MIDI channel must be 0-15")]
    fn test_invalid_channel() {
        ChannelEvent::new(16, note(60, 100, 1));
    }
}
