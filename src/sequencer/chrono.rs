// ChronoMeter - pausable stopwatch with a rearming alarm
// The clock primitive underlying playback: elapsed time never includes
// paused intervals, and a paused alarm keeps its remaining time.

use std::time::Duration;

use crate::sequencer::clock::Clock;
use crate::sequencer::{SequencerError, SequencerResult};

/// Chronometer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChronoState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl ChronoState {
    fn name(&self) -> &'static str {
        match self {
            ChronoState::Stopped => "stopped",
            ChronoState::Running => "running",
            ChronoState::Paused => "paused",
        }
    }
}

/// Pausable elapsed-time counter with an optional alarm.
///
/// The alarm deadline lives in the elapsed-time domain, so pausing freezes
/// the outstanding remainder with no extra bookkeeping: resuming fires after
/// exactly the time that was left at the pause, however long the pause
/// lasted.
#[derive(Debug)]
pub struct ChronoMeter<C: Clock> {
    clock: C,
    state: ChronoState,
    /// Running time folded in at the last pause/stop boundary.
    accumulated: Duration,
    /// Clock reading at the last start/resume, while running.
    resumed_at: Option<Duration>,
    interval: Option<Duration>,
    single_shot: bool,
    /// Alarm deadline, as an `elapsed()` value.
    deadline: Option<Duration>,
}

impl<C: Clock> ChronoMeter<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: ChronoState::Stopped,
            accumulated: Duration::ZERO,
            resumed_at: None,
            interval: None,
            single_shot: false,
            deadline: None,
        }
    }

    pub fn state(&self) -> ChronoState {
        self.state
    }

    /// Cumulative running time, excluding every paused interval.
    pub fn elapsed(&self) -> Duration {
        match self.resumed_at {
            Some(at) => self.accumulated + (self.clock.now() - at),
            None => self.accumulated,
        }
    }

    /// Restarts counting from zero. If an interval is configured the alarm
    /// is armed one full interval from now. This is a restart even from
    /// `Paused`; continuing a paused count goes through `resume`.
    pub fn start(&mut self) {
        self.accumulated = Duration::ZERO;
        self.resumed_at = Some(self.clock.now());
        self.state = ChronoState::Running;
        self.deadline = self.interval;
    }

    /// Freezes the count. The alarm's remaining time is preserved.
    pub fn pause(&mut self) -> SequencerResult<()> {
        if self.state != ChronoState::Running {
            return Err(SequencerError::InvalidStateTransition {
                op: "pause",
                state: self.state.name(),
            });
        }
        self.accumulated = self.elapsed();
        self.resumed_at = None;
        self.state = ChronoState::Paused;
        Ok(())
    }

    /// Continues counting from where `pause` left off.
    pub fn resume(&mut self) -> SequencerResult<()> {
        if self.state != ChronoState::Paused {
            return Err(SequencerError::InvalidStateTransition {
                op: "resume",
                state: self.state.name(),
            });
        }
        self.resumed_at = Some(self.clock.now());
        self.state = ChronoState::Running;
        Ok(())
    }

    /// Resets the count to zero and cancels any pending alarm.
    pub fn stop(&mut self) {
        self.accumulated = Duration::ZERO;
        self.resumed_at = None;
        self.deadline = None;
        self.state = ChronoState::Stopped;
    }

    /// Sets the alarm interval. While running this re-arms the alarm to
    /// fire `interval` from now - the rearm path the dispatch loop uses
    /// between batches.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = Some(interval);
        if self.state == ChronoState::Running {
            self.deadline = Some(self.elapsed() + interval);
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn set_single_shot(&mut self, single_shot: bool) {
        self.single_shot = single_shot;
    }

    /// Time left until the alarm fires, if one is armed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_sub(self.elapsed()))
    }

    /// Cancels the pending alarm without touching the count.
    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    /// Reports (and consumes) an alarm expiry.
    ///
    /// Repeating alarms advance the deadline by exactly one interval, so
    /// successive fires do not accumulate polling error. A zero-interval
    /// repeating alarm disarms after firing once rather than spinning.
    pub fn poll(&mut self) -> bool {
        if self.state != ChronoState::Running {
            return false;
        }
        let Some(deadline) = self.deadline else {
            return false;
        };
        if self.elapsed() < deadline {
            return false;
        }
        self.deadline = match (self.single_shot, self.interval) {
            (false, Some(interval)) if !interval.is_zero() => Some(deadline + interval),
            _ => None,
        };
        true
    }
}
