// src/poller.rs
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling,
    /// A fetch failed. Polling never resumes.
    StoppedOnError,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Start a fetch now.
    Fetch,
    /// A fetch is still in flight; this tick is dropped.
    Skipped,
    /// Not polling.
    Inactive,
}

/// Fixed-period fetch schedule with an in-flight guard.
///
/// The poller decides; it does not own a timer. The app keeps a timer
/// subscription alive only while [`Poller::is_polling`] holds, so moving
/// out of `Polling` releases the timer as well.
#[derive(Debug, Clone)]
pub struct Poller {
    period: Duration,
    state: PollState,
    in_flight: bool,
}

impl Poller {
    pub fn new(period: Duration) -> Self {
        Poller {
            period,
            state: PollState::Idle,
            in_flight: false,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn is_polling(&self) -> bool {
        self.state == PollState::Polling
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Begin polling with one immediate fetch. Only an idle poller starts.
    pub fn start(&mut self) -> TickOutcome {
        if self.state != PollState::Idle {
            return TickOutcome::Inactive;
        }
        self.state = PollState::Polling;
        self.tick()
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_polling() {
            return TickOutcome::Inactive;
        }
        if self.in_flight {
            return TickOutcome::Skipped;
        }
        self.in_flight = true;
        TickOutcome::Fetch
    }

    /// Record the end of the in-flight fetch.
    pub fn finish(&mut self, succeeded: bool) {
        self.in_flight = false;
        if !succeeded && self.state == PollState::Polling {
            self.state = PollState::StoppedOnError;
        }
    }

    pub fn cancel(&mut self) {
        if self.state != PollState::StoppedOnError {
            self.state = PollState::Cancelled;
        }
    }
}
