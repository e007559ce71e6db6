//! Idle detection for a live session.
//!
//! The read loop calls [`LastTraffic::touch`] on every inbound frame; the
//! watchdog task polls [`LastTraffic::idle_for`] on a short tick and cancels
//! the session token once the gap exceeds the idle timeout. The two share
//! nothing else.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Longest interval between two idle checks.
const MAX_TICK: Duration = Duration::from_secs(1);

/// Shortest interval between two idle checks.
const MIN_TICK: Duration = Duration::from_millis(5);

/// Monotonic timestamp of the most recent inbound frame.
///
/// Stored as nanoseconds since the session's origin instant so it fits an
/// [`AtomicU64`]. Updates use `fetch_max`, so a late writer can never move
/// the timestamp backwards.
#[derive(Debug)]
pub struct LastTraffic {
    origin: Instant,
    offset_nanos: AtomicU64,
}

impl LastTraffic {
    /// Creates a tracker whose last traffic is "now".
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    /// Records traffic at the current instant.
    pub fn touch(&self) {
        let now = as_nanos(self.origin.elapsed());
        self.offset_nanos.fetch_max(now, Ordering::AcqRel);
    }

    /// Returns the time elapsed since the last recorded traffic.
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        let last = Duration::from_nanos(self.offset_nanos.load(Ordering::Acquire));
        self.origin.elapsed().saturating_sub(last)
    }
}

impl Default for LastTraffic {
    fn default() -> Self {
        Self::new()
    }
}

/// How a watchdog run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogOutcome {
    /// The idle timeout elapsed; the watchdog cancelled the session.
    Expired,
    /// The session was cancelled by someone else.
    Stopped,
}

/// Returns the check interval for `idle_timeout`: half the timeout, capped
/// at one second.
#[must_use]
pub fn tick_period(idle_timeout: Duration) -> Duration {
    (idle_timeout / 2).clamp(MIN_TICK, MAX_TICK)
}

/// Watches `traffic` until it has been idle for longer than `idle_timeout`
/// or `cancel` fires.
///
/// On expiry the watchdog cancels `cancel` itself, which stops the read loop.
pub async fn watch(
    traffic: Arc<LastTraffic>,
    idle_timeout: Duration,
    cancel: CancellationToken,
) -> WatchdogOutcome {
    let mut ticker = tokio::time::interval(tick_period(idle_timeout));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return WatchdogOutcome::Stopped,
            _ = ticker.tick() => {
                let idle = traffic.idle_for();
                if idle > idle_timeout {
                    tracing::debug!(idle_ms = idle.as_millis(), "idle timeout reached");
                    cancel.cancel();
                    return WatchdogOutcome::Expired;
                }
            }
        }
    }
}

fn as_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
