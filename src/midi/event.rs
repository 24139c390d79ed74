// MIDI types events

/// A channel-voice MIDI message, without its channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    ControlChange { controller: u8, value: u8 },
}

impl MidiEvent {
    /// Parses a raw MIDI message, returning the channel it addresses.
    pub fn from_bytes(bytes: &[u8]) -> Option<(u8, Self)> {
        if bytes.len() < 3 {
            return None;
        }

        let status = bytes[0];
        let channel = status & 0x0F;

        match status & 0xF0 {
            0x90 => {
                let note = bytes[1];
                let velocity = bytes[2];
                // Velocity 0 = Note Off
                if velocity == 0 {
                    Some((channel, MidiEvent::NoteOff { note }))
                } else {
                    Some((channel, MidiEvent::NoteOn { note, velocity }))
                }
            }
            0x80 => Some((channel, MidiEvent::NoteOff { note: bytes[1] })),
            0xB0 => Some((
                channel,
                MidiEvent::ControlChange {
                    controller: bytes[1],
                    value: bytes[2],
                },
            )),
            _ => None,
        }
    }

    /// Encodes as a raw 3-byte MIDI message on `channel`.
    pub fn to_bytes(&self, channel: u8) -> [u8; 3] {
        debug_assert!(channel < 16, "MIDI channel must be 0-15");
        match *self {
            MidiEvent::NoteOn { note, velocity } => [0x90 | channel, note, velocity],
            MidiEvent::NoteOff { note } => [0x80 | channel, note, 0],
            MidiEvent::ControlChange { controller, value } => [0xB0 | channel, controller, value],
        }
    }
}
