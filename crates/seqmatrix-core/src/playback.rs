#![forbid(unsafe_code)]

//! Playback scheduler: one-shot replay timers and their cancellation.
//!
//! The scheduler does not own a clock. It hands the host a [`TimerEffect`]
//! describing the timer to arm or cancel, and the host later reports the fire
//! back through [`PlaybackScheduler::fire`] with the token it was given.
//!
//! # Token discipline
//!
//! - At most one token is pending at a time.
//! - Every armed token carries a fresh generation, so a token from before a
//!   reset can never compare equal to one armed after it.
//! - [`PlaybackScheduler::cancel`] clears the pending token synchronously.
//!   Even if the host's timer fires anyway, `fire` rejects it.

use std::time::Duration;

/// Identity of one armed replay timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickToken {
    generation: u64,
}

impl TickToken {
    /// Generation number of this token.
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

/// Timer work the host must perform after a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerEffect {
    /// No timer change.
    #[default]
    None,
    /// Arm a one-shot timer that reports `token` after `delay`.
    Arm { token: TickToken, delay: Duration },
    /// Drop the timer that would report `token`.
    Cancel { token: TickToken },
}

/// Whether a reported fire belongs to the pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireVerdict {
    /// The token is the pending one; the tick should be applied.
    Accepted,
    /// The token was cancelled or superseded; the fire must have no effect.
    Stale,
}

/// Arms one replay timer at a time and rejects stale fires.
#[derive(Debug, Clone)]
pub struct PlaybackScheduler {
    delay: Duration,
    next_generation: u64,
    pending: Option<TickToken>,
    ticks: usize,
}

impl PlaybackScheduler {
    /// Create an idle scheduler with the given tick delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_generation: 0,
            pending: None,
            ticks: 0,
        }
    }

    /// Delay between ticks.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The currently armed token, if any.
    pub fn pending(&self) -> Option<TickToken> {
        self.pending
    }

    /// Whether a timer is armed.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Ticks accepted since the last [`start`](Self::start).
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Begin a replay run: zero the tick count and arm the first timer.
    pub fn start(&mut self) -> TimerEffect {
        self.ticks = 0;
        self.arm()
    }

    /// Arm the next timer.
    ///
    /// Any token still pending is superseded; the caller only ever arms after
    /// a fire or a cancel, so this does not happen in practice.
    pub fn arm(&mut self) -> TimerEffect {
        let token = TickToken {
            generation: self.next_generation,
        };
        self.next_generation += 1;
        #[cfg(feature = "tracing")]
        {
            if let Some(old) = self.pending {
                tracing::warn!(
                    old = old.generation,
                    new = token.generation,
                    "arming over a pending replay timer"
                );
            }
            tracing::trace!(
                generation = token.generation,
                delay_ms = self.delay.as_millis() as u64,
                "replay timer armed"
            );
        }
        self.pending = Some(token);
        TimerEffect::Arm {
            token,
            delay: self.delay,
        }
    }

    /// Consume a timer fire.
    ///
    /// Only the pending token is accepted; accepting it clears the pending
    /// slot so the same fire cannot be applied twice.
    pub fn fire(&mut self, token: TickToken) -> FireVerdict {
        if self.pending == Some(token) {
            self.pending = None;
            self.ticks += 1;
            FireVerdict::Accepted
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!(generation = token.generation, "stale replay tick dropped");
            FireVerdict::Stale
        }
    }

    /// Invalidate the pending timer, if any.
    pub fn cancel(&mut self) -> TimerEffect {
        match self.pending.take() {
            Some(token) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(generation = token.generation, "replay timer cancelled");
                TimerEffect::Cancel { token }
            }
            None => TimerEffect::None,
        }
    }
}
