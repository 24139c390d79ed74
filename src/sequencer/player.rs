// Playback scheduler - turns the stored timeline into scheduled batches and
// walks them against the chronometer-driven clock.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::thread;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::messaging::channels::NotificationProducer;
use crate::messaging::notification::SequencerNotification;
use crate::midi::output::MidiSink;
use crate::sequencer::chrono::ChronoMeter;
use crate::sequencer::clock::{Clock, MonotonicClock};
use crate::sequencer::event::{Event, ScheduledEvent};
use crate::sequencer::store::EventStore;
use crate::sequencer::time_unit::{TimeUnit, UNITS_PER_BEAT};
use crate::sequencer::{SequencerError, SequencerResult};

/// Static playback-grid configuration.
///
/// The playable window is `[0, max_time())`: queries clamp to it, mutations
/// outside it are rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerConfig {
    /// Number of steps in the grid
    pub n_steps: u32,

    /// Steps per bar
    pub steps_per_bar: u32,

    /// Step subdivision relative to a whole note (4 = quarter note)
    pub step_unit: u32,

    /// Default tempo, overridden by `play`
    pub bpm: f64,

    /// Append a synthetic end-of-range stop marker per channel on `play`
    pub end_marker: bool,
}

impl SequencerConfig {
    pub fn new(n_steps: u32, steps_per_bar: u32, step_unit: u32, bpm: f64) -> Self {
        assert!(n_steps > 0, "sequencer needs at least one step");
        assert!(steps_per_bar > 0, "bars need at least one step");
        assert!(
            step_unit.is_power_of_two(),
            "step unit must be a power of two"
        );
        assert!(
            (20.0..=999.0).contains(&bpm),
            "BPM must be between 20 and 999"
        );
        Self {
            n_steps,
            steps_per_bar,
            step_unit,
            bpm,
            end_marker: false,
        }
    }

    /// Exclusive upper bound of the playable window.
    pub fn max_time(&self) -> TimeUnit {
        TimeUnit::from_units(
            self.n_steps as u64 * self.steps_per_bar as u64 * UNITS_PER_BEAT as u64
                / self.step_unit as u64,
        )
    }

    /// Length of one step.
    pub fn step_length(&self) -> TimeUnit {
        TimeUnit::from_units(self.max_time().units() / self.n_steps as u64)
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self::new(16, 4, 4, 120.0)
    }
}

/// Playback state, owned exclusively by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    fn name(&self) -> &'static str {
        match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        }
    }
}

/// One row of the UI-facing event listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEntry {
    pub channel: u8,
    pub time: TimeUnit,
    pub event: Event,
}

/// All scheduled events sharing one distinct time; dispatched together.
#[derive(Debug)]
struct Batch {
    time: TimeUnit,
    events: Vec<(u8, ScheduledEvent)>,
}

/// The playback scheduler.
///
/// Edits go to the event store at any time; `play` snapshots the store into
/// an ephemeral queue of scheduled batches, so edits during playback only
/// affect future `play` calls. Dispatch is cooperative: `tick` (or the
/// blocking `run`) advances the engine whenever an alarm has come due.
pub struct Sequencer<C: Clock = MonotonicClock> {
    config: SequencerConfig,
    store: EventStore,
    sink: Box<dyn MidiSink>,
    notifications: Option<NotificationProducer>,
    state: PlaybackState,
    bpm: f64,
    dispatch_clock: ChronoMeter<C>,
    step_clock: ChronoMeter<C>,
    queue: VecDeque<Batch>,
    /// Notes currently sounding, so `stop` can force matching note-offs.
    sustained: HashSet<(u8, u8)>,
    play_start: TimeUnit,
    step_counter: u32,
}

impl Sequencer<MonotonicClock> {
    /// Creates a sequencer over the system clock.
    pub fn new(config: SequencerConfig, sink: Box<dyn MidiSink>) -> Self {
        Self::with_clock(config, sink, MonotonicClock::new())
    }
}

impl<C: Clock> Sequencer<C> {
    /// Creates a sequencer over an injected clock. Tests drive a
    /// `ManualClock`; real playback uses `Sequencer::new`.
    pub fn with_clock(config: SequencerConfig, sink: Box<dyn MidiSink>, clock: C) -> Self
    where
        C: Clone,
    {
        let bpm = config.bpm;
        Self {
            config,
            store: EventStore::new(),
            sink,
            notifications: None,
            state: PlaybackState::Stopped,
            bpm,
            dispatch_clock: ChronoMeter::new(clock.clone()),
            step_clock: ChronoMeter::new(clock),
            queue: VecDeque::new(),
            sustained: HashSet::new(),
            play_start: TimeUnit::default(),
            step_counter: 0,
        }
    }

    /// Publishes note/step/state notifications onto `tx`.
    pub fn set_notifications(&mut self, tx: NotificationProducer) {
        self.notifications = Some(tx);
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Changes the default tempo. Only legal while stopped: a different
    /// tempo mid-flight would invalidate every queued delay.
    pub fn set_bpm(&mut self, bpm: f64) -> SequencerResult<()> {
        if self.state != PlaybackState::Stopped {
            return Err(SequencerError::InvalidStateTransition {
                op: "set_bpm",
                state: self.state.name(),
            });
        }
        assert!(
            (20.0..=999.0).contains(&bpm),
            "BPM must be between 20 and 999"
        );
        self.bpm = bpm;
        self.config.bpm = bpm;
        Ok(())
    }

    /// Step currently under the playhead (for the UI grid indicator).
    pub fn current_step(&self) -> u32 {
        self.step_counter
    }

    /// Notes currently sounding, sorted by `(channel, note)`.
    pub fn sustained_notes(&self) -> Vec<(u8, u8)> {
        let mut held: Vec<(u8, u8)> = self.sustained.iter().copied().collect();
        held.sort_unstable();
        held
    }

    // --- editing -----------------------------------------------------------

    /// Inserts `event` on `channel` at `time`. Idempotent.
    pub fn add_event(&mut self, channel: u8, time: TimeUnit, event: Event) -> SequencerResult<()> {
        self.check_in_window(time)?;
        self.store.add(channel, time, event);
        Ok(())
    }

    /// Removes the structurally-equal `(channel, event)` entry at `time`.
    /// Absent entries are a no-op.
    pub fn remove_event(
        &mut self,
        channel: u8,
        time: TimeUnit,
        event: &Event,
    ) -> SequencerResult<()> {
        self.check_in_window(time)?;
        self.store.remove(channel, time, event);
        Ok(())
    }

    /// Removes every event on `channel` in `[start, stop)`, clamped to the
    /// window.
    pub fn remove_events_in_range(&mut self, channel: u8, start: TimeUnit, stop: TimeUnit) {
        let (start, stop) = self.clamp_range(Some(start), Some(stop));
        self.store.remove_range(channel, start, stop);
    }

    /// Read-only snapshot for UI rendering, ascending in time. Omitted
    /// bounds default to the configured window; supplied bounds clamp to
    /// it.
    pub fn list_events(&self, start: Option<TimeUnit>, stop: Option<TimeUnit>) -> Vec<EventEntry> {
        let (start, stop) = self.clamp_range(start, stop);
        self.store
            .iterate(Some(start), Some(stop))
            .map(|(channel, time, event)| EventEntry {
                channel,
                time,
                event: event.clone(),
            })
            .collect()
    }

    /// First event stored for `channel` at exactly `time`.
    pub fn get_event(&self, channel: u8, time: TimeUnit) -> SequencerResult<Option<Event>> {
        self.check_in_window(time)?;
        Ok(self
            .store
            .events_at(time)
            .find(|ce| ce.channel == channel)
            .map(|ce| ce.event.clone()))
    }

    /// Replaces whatever `channel` has at `time` with `event`.
    pub fn set_event(&mut self, channel: u8, time: TimeUnit, event: Event) -> SequencerResult<()> {
        self.check_in_window(time)?;
        let existing: Vec<Event> = self
            .store
            .events_at(time)
            .filter(|ce| ce.channel == channel)
            .map(|ce| ce.event.clone())
            .collect();
        for old in &existing {
            self.store.remove(channel, time, old);
        }
        self.store.add(channel, time, event);
        Ok(())
    }

    fn check_in_window(&self, time: TimeUnit) -> SequencerResult<()> {
        let max = self.config.max_time();
        if time >= max {
            return Err(SequencerError::OutOfRange { time, max });
        }
        Ok(())
    }

    fn clamp_range(&self, start: Option<TimeUnit>, stop: Option<TimeUnit>) -> (TimeUnit, TimeUnit) {
        let max = self.config.max_time();
        let start = start.unwrap_or_default().min(max);
        let stop = stop.unwrap_or(max).min(max);
        (start, stop.max(start))
    }

    // --- playback ----------------------------------------------------------

    /// Starts playback of `[start, stop)` at `bpm`.
    ///
    /// Snapshots the store, expands every event through `schedule`, merges
    /// the results into one time-ordered queue (ties keep store order) and
    /// arms the first batch. A range that materializes nothing leaves the
    /// sequencer stopped.
    pub fn play(&mut self, bpm: f64, start: TimeUnit, stop: TimeUnit) -> SequencerResult<()> {
        if self.state != PlaybackState::Stopped {
            return Err(SequencerError::InvalidStateTransition {
                op: "play",
                state: self.state.name(),
            });
        }
        assert!(
            (20.0..=999.0).contains(&bpm),
            "BPM must be between 20 and 999"
        );

        let (start, stop) = self.clamp_range(Some(start), Some(stop));
        self.queue = self.materialize(start, stop);
        let first_time = match self.queue.front() {
            Some(batch) => batch.time,
            None => {
                debug!("play: nothing scheduled in [{start}, {stop}), staying stopped");
                return Ok(());
            }
        };

        self.bpm = bpm;
        self.play_start = start;
        self.sustained.clear();
        self.step_counter = (start.units() / self.config.step_length().units()) as u32;

        self.dispatch_clock.set_single_shot(true);
        self.dispatch_clock.set_interval((first_time - start).to_duration(bpm));
        self.dispatch_clock.start();

        self.step_clock.set_single_shot(false);
        self.step_clock
            .set_interval(self.config.step_length().to_duration(bpm));
        self.step_clock.start();

        self.set_state(PlaybackState::Playing);
        self.notify(SequencerNotification::Step {
            step: self.step_counter,
        });
        Ok(())
    }

    /// Halts dispatch without discarding the queue. The chronometers keep
    /// the remaining time to the next event.
    pub fn pause(&mut self) -> SequencerResult<()> {
        if self.state != PlaybackState::Playing {
            return Err(SequencerError::InvalidStateTransition {
                op: "pause",
                state: self.state.name(),
            });
        }
        self.dispatch_clock.pause()?;
        self.step_clock.pause()?;
        self.set_state(PlaybackState::Paused);
        Ok(())
    }

    /// Rearms with exactly the time outstanding at the pause; nothing is
    /// skipped or double-fired.
    pub fn resume(&mut self) -> SequencerResult<()> {
        if self.state != PlaybackState::Paused {
            return Err(SequencerError::InvalidStateTransition {
                op: "resume",
                state: self.state.name(),
            });
        }
        self.dispatch_clock.resume()?;
        self.step_clock.resume()?;
        self.set_state(PlaybackState::Playing);
        Ok(())
    }

    /// Cancels playback from any state; idempotent while stopped.
    ///
    /// Every sustained note receives a forced note-off before this returns,
    /// so no MIDI note is ever left stuck on.
    pub fn stop(&mut self) {
        self.dispatch_clock.stop();
        self.step_clock.stop();
        self.queue.clear();
        self.step_counter = 0;
        self.flush_sustained();
        if self.state != PlaybackState::Stopped {
            self.set_state(PlaybackState::Stopped);
        }
    }

    /// Stopped -> play, Playing -> pause, Paused -> resume.
    pub fn toggle_play_pause(
        &mut self,
        bpm: f64,
        start: TimeUnit,
        stop: TimeUnit,
    ) -> SequencerResult<()> {
        match self.state {
            PlaybackState::Stopped => self.play(bpm, start, stop),
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(),
        }
    }

    /// Advances playback: runs every dispatch step and step-indicator fire
    /// that has come due. Non-blocking; drive it from an event loop, or
    /// from a manual clock in tests.
    pub fn tick(&mut self) {
        while self.state == PlaybackState::Playing && self.dispatch_clock.poll() {
            self.dispatch_step();
        }
        while self.state == PlaybackState::Playing && self.step_clock.poll() {
            self.step_counter += 1;
            self.notify(SequencerNotification::Step {
                step: self.step_counter,
            });
        }
    }

    /// Drives playback on the current thread until the queue drains or the
    /// sequencer is stopped, sleeping between alarms.
    pub fn run(&mut self) {
        while self.state == PlaybackState::Playing {
            self.tick();
            if self.state != PlaybackState::Playing {
                break;
            }
            let next_due = [
                self.dispatch_clock.remaining(),
                self.step_clock.remaining(),
            ]
            .into_iter()
            .flatten()
            .min();
            match next_due {
                Some(wait) if !wait.is_zero() => thread::sleep(wait),
                Some(_) => {}
                None => break,
            }
        }
    }

    /// One dispatch step: pop the batch due now, rearm for the next batch
    /// with the drift-corrected delay, then emit the batch.
    fn dispatch_step(&mut self) {
        let Some(batch) = self.queue.pop_front() else {
            self.finish();
            return;
        };

        // Rearm before emitting so dispatch cost cannot push the next batch
        // late. The delay is the ideal elapsed time of the next batch minus
        // the real elapsed time so far, clamped to zero: any overshoot on
        // this fire is deducted from the next wait instead of accumulating.
        if let Some(next) = self.queue.front() {
            let ideal_next = (next.time - self.play_start).to_duration(self.bpm);
            let delay = ideal_next.saturating_sub(self.dispatch_clock.elapsed());
            self.dispatch_clock.set_interval(delay);
        }

        for (channel, scheduled) in batch.events {
            match scheduled {
                ScheduledEvent::NoteOn { note, velocity, .. } => {
                    self.sustained.insert((channel, note));
                    self.sink.note_on(channel, note, velocity);
                    self.notify(SequencerNotification::NoteOn {
                        channel,
                        note,
                        velocity,
                    });
                }
                ScheduledEvent::NoteOff { note, .. } => {
                    self.sustained.remove(&(channel, note));
                    self.sink.note_off(channel, note);
                    self.notify(SequencerNotification::NoteOff { channel, note });
                }
                ScheduledEvent::Stop { .. } => {
                    self.stop();
                    return;
                }
            }
        }

        if self.queue.is_empty() {
            self.finish();
        }
    }

    /// Expands every stored event in `[start, stop)` into scheduled events
    /// merged into one time-ordered batch queue.
    fn materialize(&self, start: TimeUnit, stop: TimeUnit) -> VecDeque<Batch> {
        let mut by_time: BTreeMap<TimeUnit, Vec<(u8, ScheduledEvent)>> = BTreeMap::new();
        let mut channels: Vec<u8> = Vec::new();

        for (channel, time, event) in self.store.iterate(Some(start), Some(stop)) {
            if !channels.contains(&channel) {
                channels.push(channel);
            }
            for scheduled in event.schedule(time) {
                by_time
                    .entry(scheduled.time())
                    .or_default()
                    .push((channel, scheduled));
            }
        }

        if self.config.end_marker {
            for &channel in &channels {
                by_time
                    .entry(stop)
                    .or_default()
                    .push((channel, ScheduledEvent::Stop { time: stop }));
            }
        }

        by_time
            .into_iter()
            .map(|(time, events)| Batch { time, events })
            .collect()
    }

    /// Natural end of the queue: stop the clocks without forced note-offs
    /// (every note-on already met its queued note-off).
    fn finish(&mut self) {
        self.dispatch_clock.stop();
        self.step_clock.stop();
        self.step_counter = 0;
        self.set_state(PlaybackState::Stopped);
    }

    fn flush_sustained(&mut self) {
        let mut held: Vec<(u8, u8)> = self.sustained.drain().collect();
        held.sort_unstable();
        for (channel, note) in held {
            self.sink.note_off(channel, note);
            self.notify(SequencerNotification::NoteOff { channel, note });
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        debug!("sequencer state -> {}", state.name());
        self.state = state;
        self.notify(SequencerNotification::StateChanged { state });
    }

    fn notify(&mut self, notification: SequencerNotification) {
        if let Some(tx) = self.notifications.as_mut() {
            if ringbuf::traits::Producer::try_push(&mut *tx, notification).is_err() {
                log::warn!("notification channel full, dropping {notification:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::output::NullSink;
    use crate::sequencer::clock::ManualClock;
    use crate::sequencer::event::NoteEvent;

    fn note(note: u8, duration_beats: u64) -> Event {
        Event::Note(NoteEvent::new(note, 100, TimeUnit::beats(duration_beats)))
    }

    fn sequencer(config: SequencerConfig) -> (Sequencer<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (
            Sequencer::with_clock(config, Box::new(NullSink), clock.clone()),
            clock,
        )
    }

    #[test]
    fn test_config_window() {
        let config = SequencerConfig::new(8, 4, 4, 120.0);
        assert_eq!(config.max_time(), TimeUnit::beats(8));
        assert_eq!(config.step_length(), TimeUnit::beats(1));

        // sixteenth-note steps shrink the window accordingly
        let fine = SequencerConfig::new(16, 4, 16, 120.0);
        assert_eq!(fine.max_time(), TimeUnit::beats(4));
        assert_eq!(fine.step_length(), TimeUnit::new(1, 4).unwrap());
    }

    #[test]
    fn test_add_and_list_events() {
        let (mut seq, _clock) = sequencer(SequencerConfig::default());
        seq.add_event(0, TimeUnit::beats(2), note(62, 1)).unwrap();
        seq.add_event(0, TimeUnit::beats(0), note(60, 1)).unwrap();
        seq.add_event(1, TimeUnit::new(1, 2).unwrap(), note(58, 1))
            .unwrap();

        let listed = seq.list_events(None, None);
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].time, TimeUnit::beats(0));
        assert_eq!(listed[1].channel, 1);
        assert_eq!(listed[2].time, TimeUnit::beats(2));
    }

    #[test]
    fn test_list_events_clamps_bounds() {
        let (mut seq, _clock) = sequencer(SequencerConfig::new(4, 4, 4, 120.0));
        seq.add_event(0, TimeUnit::beats(3), note(60, 1)).unwrap();

        // bounds far past the window clamp instead of failing
        let listed = seq.list_events(Some(TimeUnit::beats(0)), Some(TimeUnit::beats(1000)));
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn test_mutations_outside_window_fail() {
        let (mut seq, _clock) = sequencer(SequencerConfig::new(4, 4, 4, 120.0));
        let too_late = TimeUnit::beats(4);

        assert!(matches!(
            seq.add_event(0, too_late, note(60, 1)),
            Err(SequencerError::OutOfRange { .. })
        ));
        assert!(seq.remove_event(0, too_late, &note(60, 1)).is_err());
        assert!(seq.get_event(0, too_late).is_err());
        assert!(seq.set_event(0, too_late, note(60, 1)).is_err());
        // nothing was stored by the failed calls
        assert!(seq.list_events(None, None).is_empty());
    }

    #[test]
    fn test_get_and_set_event() {
        let (mut seq, _clock) = sequencer(SequencerConfig::default());
        let time = TimeUnit::beats(1);

        assert_eq!(seq.get_event(0, time).unwrap(), None);

        seq.add_event(0, time, note(60, 1)).unwrap();
        assert_eq!(seq.get_event(0, time).unwrap(), Some(note(60, 1)));

        // set replaces the channel's entry at that time
        seq.set_event(0, time, note(64, 2)).unwrap();
        assert_eq!(seq.get_event(0, time).unwrap(), Some(note(64, 2)));
        assert_eq!(seq.list_events(None, None).len(), 1);

        // other channels at the same time are untouched
        seq.add_event(3, time, note(70, 1)).unwrap();
        seq.set_event(0, time, note(65, 1)).unwrap();
        assert_eq!(seq.get_event(3, time).unwrap(), Some(note(70, 1)));
    }

    #[test]
    fn test_remove_events_in_range() {
        let (mut seq, _clock) = sequencer(SequencerConfig::default());
        for beat in 0..8 {
            seq.add_event(0, TimeUnit::beats(beat), note(60, 1)).unwrap();
        }
        seq.remove_events_in_range(0, TimeUnit::beats(2), TimeUnit::beats(5));
        assert_eq!(seq.list_events(None, None).len(), 5);
    }

    #[test]
    fn test_state_guards() {
        let (mut seq, _clock) = sequencer(SequencerConfig::default());

        assert!(matches!(
            seq.pause(),
            Err(SequencerError::InvalidStateTransition {
                op: "pause",
                state: "stopped",
            })
        ));
        assert!(seq.resume().is_err());
        assert_eq!(seq.state(), PlaybackState::Stopped);

        seq.add_event(0, TimeUnit::beats(1), note(60, 1)).unwrap();
        seq.play(120.0, TimeUnit::beats(0), TimeUnit::beats(4))
            .unwrap();
        assert!(seq.play(120.0, TimeUnit::beats(0), TimeUnit::beats(4)).is_err());
        assert!(seq.resume().is_err());

        seq.pause().unwrap();
        assert!(seq.pause().is_err());
        seq.stop();
        assert_eq!(seq.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut seq, _clock) = sequencer(SequencerConfig::default());
        seq.stop();
        seq.stop();
        assert_eq!(seq.state(), PlaybackState::Stopped);
        assert!(seq.sustained_notes().is_empty());
    }

    #[test]
    fn test_play_empty_range_stays_stopped() {
        let (mut seq, _clock) = sequencer(SequencerConfig::default());
        seq.play(120.0, TimeUnit::beats(0), TimeUnit::beats(4))
            .unwrap();
        assert_eq!(seq.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_set_bpm_requires_stopped() {
        let (mut seq, _clock) = sequencer(SequencerConfig::default());
        seq.set_bpm(90.0).unwrap();
        assert_eq!(seq.bpm(), 90.0);

        seq.add_event(0, TimeUnit::beats(1), note(60, 1)).unwrap();
        seq.play(120.0, TimeUnit::beats(0), TimeUnit::beats(4))
            .unwrap();
        assert!(seq.set_bpm(140.0).is_err());
        assert_eq!(seq.bpm(), 120.0);
    }

    #[test]
    fn test_toggle_play_pause_cycle() {
        let (mut seq, _clock) = sequencer(SequencerConfig::default());
        seq.add_event(0, TimeUnit::beats(1), note(60, 1)).unwrap();

        let range = (TimeUnit::beats(0), TimeUnit::beats(4));
        seq.toggle_play_pause(120.0, range.0, range.1).unwrap();
        assert!(seq.is_playing());
        seq.toggle_play_pause(120.0, range.0, range.1).unwrap();
        assert_eq!(seq.state(), PlaybackState::Paused);
        seq.toggle_play_pause(120.0, range.0, range.1).unwrap();
        assert!(seq.is_playing());
    }

    #[test]
    fn test_edits_during_playback_do_not_touch_queue() {
        let (mut seq, clock) = sequencer(SequencerConfig::default());
        seq.add_event(0, TimeUnit::beats(1), note(60, 1)).unwrap();
        seq.play(120.0, TimeUnit::beats(0), TimeUnit::beats(4))
            .unwrap();

        // removing the note mid-flight must not cancel its dispatch
        seq.remove_event(0, TimeUnit::beats(1), &note(60, 1)).unwrap();
        clock.advance_millis(500);
        seq.tick();
        assert_eq!(seq.sustained_notes(), vec![(0, 60)]);
        seq.stop();
    }

    #[test]
    fn test_step_counter_follows_play_start() {
        let (mut seq, _clock) = sequencer(SequencerConfig::new(8, 4, 4, 120.0));
        seq.add_event(0, TimeUnit::beats(5), note(60, 1)).unwrap();
        seq.play(120.0, TimeUnit::beats(4), TimeUnit::beats(8))
            .unwrap();
        assert_eq!(seq.current_step(), 4);
        seq.stop();
        assert_eq!(seq.current_step(), 0);
    }
}
