//! Periodic tick scheduler for MindLink background maintenance.
//!
//! Provides a fixed-period timer with pause/resume, start-up jitter and
//! skip-on-overrun semantics. The session keep-alive uses it to refresh
//! the access token every few minutes while a user is signed in.
//!
//! # Disabled mode
//!
//! When `period` is `None`, the scheduler is disabled and
//! [`TickScheduler::wait_for_tick`] pends forever. That keeps callers'
//! `tokio::select!` loops uniform whether or not the feature is on.
//!
//! # Integration
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         changed = state_rx.changed() => { /* pause or resume */ }
//!         _ = scheduler.wait_for_tick() => { session.refresh_token().await; }
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the tick scheduler.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between ticks. `None` disables the scheduler.
    pub period: Option<Duration>,
    /// Random jitter (0..max) added to the *first* tick so that many
    /// clients started together don't all refresh in the same second.
    pub initial_jitter: Duration,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            period: Some(Self::DEFAULT_PERIOD),
            initial_jitter: Duration::from_secs(30),
        }
    }
}

impl TickConfig {
    /// Default period between ticks: 15 minutes.
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(15 * 60);

    /// Shortest accepted period. Anything lower is clamped.
    pub const MIN_PERIOD: Duration = Duration::from_millis(10);

    /// A config for the given period with no jitter.
    pub fn every(period: Duration) -> Self {
        Self {
            period: Some(period),
            initial_jitter: Duration::ZERO,
        }
    }

    /// A config that never ticks.
    pub fn disabled() -> Self {
        Self {
            period: None,
            initial_jitter: Duration::ZERO,
        }
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`TickScheduler::new`].
    pub fn validated(mut self) -> Self {
        if let Some(period) = self.period {
            if period < Self::MIN_PERIOD {
                warn!(
                    period_ms = period.as_millis() as u64,
                    min_ms = Self::MIN_PERIOD.as_millis() as u64,
                    "tick period below minimum, clamping"
                );
                self.period = Some(Self::MIN_PERIOD);
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info (returned to caller each tick)
// ---------------------------------------------------------------------------

/// Information about a fired tick, returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// How late the tick fired relative to its deadline.
    pub late_by: Duration,
    /// Whole periods that were skipped because the tick fired late
    /// (e.g. after the host was suspended).
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-period tick scheduler.
pub struct TickScheduler {
    period: Option<Duration>,
    tick_count: u64,
    total_skipped: u64,
    /// When the next tick should fire (Tokio instant for `sleep_until`).
    next_tick: Option<Instant>,
    paused: bool,
}

impl TickScheduler {
    /// Create a new scheduler from config.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();

        let next_tick = config.period.map(|p| {
            let jitter = if config.initial_jitter > Duration::ZERO {
                let max = config.initial_jitter.as_millis() as u64;
                Duration::from_millis(rand::rng().random_range(0..max.max(1)))
            } else {
                Duration::ZERO
            };
            Instant::now() + p + jitter
        });

        match config.period {
            Some(p) => debug!(period_secs = p.as_secs_f64(), "tick scheduler created"),
            None => debug!("tick scheduler created disabled"),
        }

        Self {
            period: config.period,
            tick_count: 0,
            total_skipped: 0,
            next_tick,
            paused: false,
        }
    }

    /// Create a scheduler for a specific period with no jitter.
    pub fn every(period: Duration) -> Self {
        Self::new(TickConfig::every(period))
    }

    /// Wait until the next tick is due.
    ///
    /// When disabled or paused this future pends forever; `tokio::select!`
    /// will still process other branches.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let (next, period) = match (self.next_tick, self.period) {
            (Some(next), Some(period)) if !self.paused => (next, period),
            _ => std::future::pending().await,
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        self.tick_count += 1;

        // Missed periods are skipped rather than replayed: one late tick
        // is as good as several for keeping a session alive.
        let late_by = now.saturating_duration_since(next);
        let ticks_skipped = (late_by.as_nanos() / period.as_nanos()) as u64;
        if ticks_skipped > 0 {
            warn!(
                tick = self.tick_count,
                skipped = ticks_skipped,
                late_secs = late_by.as_secs_f64(),
                "tick fired late, skipping missed periods"
            );
        }
        self.total_skipped += ticks_skipped;
        self.next_tick = Some(now + period);

        trace!(tick = self.tick_count, "tick fired");

        TickInfo {
            tick: self.tick_count,
            late_by,
            ticks_skipped,
        }
    }

    /// Pause the scheduler. `wait_for_tick` pends until [`resume`](Self::resume).
    ///
    /// Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.tick_count, "tick scheduler paused");
        }
    }

    /// Resume after a pause. The next tick is a full period from now, so
    /// time spent paused never produces an immediate tick.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            if let Some(period) = self.period {
                self.next_tick = Some(Instant::now() + period);
            }
            debug!(tick = self.tick_count, "tick scheduler resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether this scheduler never ticks (`period == None`).
    pub fn is_disabled(&self) -> bool {
        self.period.is_none()
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Periods skipped over the scheduler's lifetime.
    pub fn total_skipped(&self) -> u64 {
        self.total_skipped
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }
}
