// EventStore - ordered container of channel events keyed by time

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::sequencer::event::{ChannelEvent, Event};
use crate::sequencer::time_unit::TimeUnit;

/// Ordered multimap of `TimeUnit -> [ChannelEvent]`.
///
/// The map keeps time order, each bucket keeps insertion order. Inserting an
/// already-present `(channel, event)` pair at the same time is a no-op, and
/// a bucket emptied by removal is pruned.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: BTreeMap<TimeUnit, Vec<ChannelEvent>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `event` on `channel` at `time`. Idempotent.
    pub fn add(&mut self, channel: u8, time: TimeUnit, event: Event) {
        let bucket = self.events.entry(time).or_default();
        let candidate = ChannelEvent::new(channel, event);
        if !bucket.contains(&candidate) {
            bucket.push(candidate);
        }
    }

    /// Removes the first structurally-equal `(channel, event)` at `time`.
    /// Absent entries are a no-op, not an error.
    pub fn remove(&mut self, channel: u8, time: TimeUnit, event: &Event) {
        if let Some(bucket) = self.events.get_mut(&time) {
            if let Some(pos) = bucket
                .iter()
                .position(|ce| ce.channel == channel && ce.event == *event)
            {
                bucket.remove(pos);
                if bucket.is_empty() {
                    self.events.remove(&time);
                }
            }
        }
    }

    /// Iterates `(channel, time, event)` in non-decreasing time order.
    ///
    /// `start` is inclusive, `stop` exclusive; either bound may be omitted.
    /// The iterator is lazy and restartable (call again to scan from
    /// scratch).
    pub fn iterate(
        &self,
        start: Option<TimeUnit>,
        stop: Option<TimeUnit>,
    ) -> impl Iterator<Item = (u8, TimeUnit, &Event)> + '_ {
        let lower = start.map_or(Bound::Unbounded, Bound::Included);
        let upper = stop.map_or(Bound::Unbounded, Bound::Excluded);
        self.events
            .range((lower, upper))
            .flat_map(|(time, bucket)| bucket.iter().map(move |ce| (ce.channel, *time, &ce.event)))
    }

    /// Events stored at exactly `time`, in insertion order.
    pub fn events_at(&self, time: TimeUnit) -> impl Iterator<Item = &ChannelEvent> + '_ {
        self.events.get(&time).into_iter().flatten()
    }

    /// Removes every event on `channel` with `start <= time < stop`.
    ///
    /// Built from `iterate` + `remove`; not atomic across interleaved
    /// edits.
    pub fn remove_range(&mut self, channel: u8, start: TimeUnit, stop: TimeUnit) {
        let victims: Vec<(TimeUnit, Event)> = self
            .iterate(Some(start), Some(stop))
            .filter(|(ch, _, _)| *ch == channel)
            .map(|(_, time, event)| (time, event.clone()))
            .collect();
        for (time, event) in victims {
            self.remove(channel, time, &event);
        }
    }

    /// Total number of stored events.
    pub fn len(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
