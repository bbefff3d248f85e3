//! Metrics Module
//!
//! Sliding-window request counters backing the stats endpoint.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

// == Windows ==
const WINDOW_5M: Duration = Duration::from_secs(5 * 60);
const WINDOW_1H: Duration = Duration::from_secs(60 * 60);
const WINDOW_24H: Duration = Duration::from_secs(24 * 60 * 60);

// == Request Metrics ==
/// Rolling request counters over fixed lookback windows.
///
/// One timestamp is kept per served request; entries older than the
/// largest window are dropped on record and by the periodic cleanup
/// task, so memory stays proportional to a day of traffic.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one served request at the current instant.
    pub fn record_request(&self) {
        let now = Instant::now();
        let mut timestamps = self.timestamps.lock();
        timestamps.push_back(now);
        if let Some(cutoff) = now.checked_sub(WINDOW_24H) {
            Self::drop_before(&mut timestamps, cutoff);
        }
    }

    /// Drops timestamps outside the largest window.
    ///
    /// # Returns
    /// How many timestamps were removed.
    pub fn prune(&self) -> usize {
        let Some(cutoff) = Instant::now().checked_sub(WINDOW_24H) else {
            return 0;
        };
        let mut timestamps = self.timestamps.lock();
        Self::drop_before(&mut timestamps, cutoff)
    }

    /// Counts requests inside each window.
    pub fn snapshot(&self) -> RequestWindows {
        let now = Instant::now();
        let timestamps = self.timestamps.lock();
        RequestWindows {
            last_5m: Self::count_within(&timestamps, now, WINDOW_5M),
            last_1h: Self::count_within(&timestamps, now, WINDOW_1H),
            last_24h: Self::count_within(&timestamps, now, WINDOW_24H),
        }
    }

    fn drop_before(timestamps: &mut VecDeque<Instant>, cutoff: Instant) -> usize {
        let before = timestamps.len();
        while let Some(front) = timestamps.front() {
            if *front < cutoff {
                timestamps.pop_front();
            } else {
                break;
            }
        }
        before - timestamps.len()
    }

    fn count_within(timestamps: &VecDeque<Instant>, now: Instant, window: Duration) -> u64 {
        timestamps
            .iter()
            .filter(|recorded| now.saturating_duration_since(**recorded) <= window)
            .count() as u64
    }
}

// == Request Windows ==
/// Request counts per lookback window, as served by the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RequestWindows {
    pub last_5m: u64,
    pub last_1h: u64,
    pub last_24h: u64,
}
