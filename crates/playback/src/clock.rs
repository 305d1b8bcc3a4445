//! Playback clock: wall-clock time to shared simulation progress.
//!
//! One cycle of playback lasts `duration` seconds and covers the whole span
//! of the arena. The clock starts lazily on the first tick, can be seeked by
//! passing an explicit fraction, and restarts itself once a cycle completes.
//!
//! # Example
//!
//! ```
//! use playback::clock::{Cursor, PlaybackClock};
//!
//! let mut clock = PlaybackClock::new(10.0);
//! let cursor = clock.tick(100.0, None, 20);
//! assert_eq!(cursor.fraction, 0.0);
//!
//! let cursor = clock.tick(102.5, None, 20);
//! assert_eq!(cursor, Cursor::new(0.25, 20));
//! assert_eq!(cursor.index, 5);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Source of monotonic time, in seconds.
pub trait TimeSource {
    /// Seconds since an arbitrary fixed origin.
    fn now_secs(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Manually driven clock for deterministic replay.
///
/// Clones share the same reading, so a test can keep one handle and advance
/// time under a [`crate::Playback`] that owns the other.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading `secs`.
    pub fn starting_at(secs: f64) -> Self {
        let clock = Self::default();
        clock.set(secs);
        clock
    }

    /// Sets the current reading.
    pub fn set(&self, secs: f64) {
        self.bits.store(secs.to_bits(), Ordering::Relaxed);
    }

    /// Moves the reading forward by `secs`.
    pub fn advance(&self, secs: f64) {
        self.set(self.now_secs() + secs);
    }
}

impl TimeSource for ManualClock {
    fn now_secs(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

/// Position on the shared timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    /// Normalized cycle position in `[0, 1]`.
    pub fraction: f64,
    /// `fraction * span`, in `[0, span]`.
    pub progress: f64,
    /// Whole steps completed.
    pub index: usize,
    /// Position between step `index` and the next one, in `[0, 1)`.
    pub factor: f64,
}

impl Cursor {
    /// Derives the cursor for `fraction` of a timeline `span` steps long.
    pub fn new(fraction: f64, span: usize) -> Self {
        let progress = fraction * span as f64;
        let index = progress.floor();
        Self {
            fraction,
            progress,
            index: index as usize,
            factor: progress - index,
        }
    }

    /// Cursor at the very start of the timeline.
    pub fn start() -> Self {
        Self::new(0.0, 0)
    }
}

/// Maps time onto the shared simulation-progress scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackClock {
    duration: f64,
    start: Option<f64>,
}

impl PlaybackClock {
    /// Creates a stopped clock with a cycle of `duration` seconds.
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            start: None,
        }
    }

    /// Seconds per full cycle.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Time the current cycle started, if it has.
    pub fn start_time(&self) -> Option<f64> {
        self.start
    }

    /// Clears the cycle start; the next tick restarts from 0.
    pub fn reset(&mut self) {
        self.start = None;
    }

    /// Advances the clock to `now` and returns the cursor for a `span`-step timeline.
    ///
    /// Without `explicit` the fraction is the elapsed share of the cycle. A
    /// non-negative `explicit` fraction seeks: the cycle start is moved so
    /// later time-driven ticks continue from there. Negative fractions are
    /// used by magnitude without seeking, and NaN reads as 0. Reaching a
    /// fraction of exactly 1 reports the end of the span and restarts the
    /// cycle for the following tick.
    pub fn tick(&mut self, now: f64, explicit: Option<f64>, span: usize) -> Cursor {
        let start = *self.start.get_or_insert(now);

        let raw = match explicit {
            None => (now - start) / self.duration,
            Some(fraction) if fraction >= 0.0 => {
                self.start = Some(now - fraction * self.duration);
                fraction
            }
            Some(fraction) => fraction,
        };

        let fraction = if raw.is_nan() { 0.0 } else { raw.abs().min(1.0) };

        if fraction == 1.0 {
            tracing::debug!("Playback cycle complete, restarting");
            self.reset();
        }

        Cursor::new(fraction, span)
    }
}
