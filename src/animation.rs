use std::time::{Duration, Instant};

/// Cycling frame cursor for a loaded frame sequence.
///
/// The index starts at zero and wraps back to zero after the last frame,
/// so playback never terminates on its own.
#[derive(Debug, Clone, Copy)]
pub struct Playback {
    index: usize,
    frame_count: usize,
}

impl Playback {
    /// Creates a cursor over `frame_count` frames, positioned on frame zero.
    #[must_use]
    pub fn new(frame_count: usize) -> Self {
        Self {
            index: 0,
            frame_count: frame_count.max(1),
        }
    }

    /// The currently displayed frame index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Moves to the next frame, wrapping at the sequence length, and
    /// returns the new index.
    pub fn advance(&mut self) -> usize {
        self.index = (self.index + 1) % self.frame_count;
        self.index
    }
}

/// Fixed-period deadline used to pace frame advancement.
///
/// The owning event loop polls for input with [`Ticker::timeout`] and calls
/// [`Ticker::tick`] afterwards, so input handling and the frame timer share
/// one thread without either blocking the other.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    deadline: Instant,
}

impl Ticker {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: Instant::now() + period,
        }
    }

    /// Time remaining until the next deadline, zero if it has passed.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Returns `true` once per elapsed period and arms the next deadline.
    ///
    /// The next deadline is measured from now rather than from the missed
    /// one, so a stalled loop resumes at the normal pace instead of
    /// bursting through queued ticks.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        if now < self.deadline {
            return false;
        }
        self.deadline = now + self.period;
        true
    }
}
