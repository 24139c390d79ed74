// MIDI output - the dispatch capability the engine consumes

use log::{info, warn};
use midir::{MidiOutput, MidiOutputConnection};
use thiserror::Error;

use crate::midi::event::MidiEvent;

/// Errors raised while opening a MIDI output.
#[derive(Debug, Error)]
pub enum MidiError {
    #[error("failed to initialize MIDI output: {0}")]
    Init(#[from] midir::InitError),

    #[error("no MIDI output port available")]
    NoOutputPort,

    #[error("failed to connect MIDI output: {0}")]
    Connect(String),
}

/// Where dispatched MIDI data goes.
///
/// The sequencer receives this capability at construction and never reaches
/// into ambient device registries.
pub trait MidiSink {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
    fn control_change(&mut self, channel: u8, controller: u8, value: u8);
}

/// Sink that discards everything. Stands in when no device is connected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl MidiSink for NullSink {
    fn note_on(&mut self, _channel: u8, _note: u8, _velocity: u8) {}
    fn note_off(&mut self, _channel: u8, _note: u8) {}
    fn control_change(&mut self, _channel: u8, _controller: u8, _value: u8) {}
}

/// Real MIDI output over midir.
pub struct MidirSink {
    connection: MidiOutputConnection,
}

impl MidirSink {
    /// Opens a virtual output port where the platform supports it, else
    /// connects to the first available hardware port.
    pub fn new(client_name: &str) -> Result<Self, MidiError> {
        #[cfg(unix)]
        {
            use midir::os::unix::VirtualOutput;

            let output = MidiOutput::new(client_name)?;
            match output.create_virtual(client_name) {
                Ok(connection) => {
                    info!("opened virtual MIDI output '{client_name}'");
                    return Ok(Self { connection });
                }
                Err(err) => {
                    warn!("virtual MIDI port unavailable: {err}");
                }
            }
        }

        let output = MidiOutput::new(client_name)?;
        Self::connect_first(output)
    }

    fn connect_first(output: MidiOutput) -> Result<Self, MidiError> {
        let ports = output.ports();
        let port = ports.first().ok_or(MidiError::NoOutputPort)?;
        if let Ok(name) = output.port_name(port) {
            info!("connecting MIDI output to '{name}'");
        }
        let connection = output
            .connect(port, "stepseq-out")
            .map_err(|err| MidiError::Connect(err.to_string()))?;
        Ok(Self { connection })
    }

    fn send(&mut self, message: [u8; 3]) {
        // A failed send is logged, not propagated: the dispatch loop must
        // keep its timing even if the device hiccups.
        if let Err(err) = self.connection.send(&message) {
            warn!("MIDI send failed: {err}");
        }
    }
}

impl MidiSink for MidirSink {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        self.send(MidiEvent::NoteOn { note, velocity }.to_bytes(channel));
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        self.send(MidiEvent::NoteOff { note }.to_bytes(channel));
    }

    fn control_change(&mut self, channel: u8, controller: u8, value: u8) {
        self.send(MidiEvent::ControlChange { controller, value }.to_bytes(channel));
    }
}
