//! Random pause after network fetches.

use std::time::Duration;

use rand::Rng;
use tracing::trace;

use imgdl_core::WaitRange;

/// Sleeps a uniformly random duration from a fixed range.
///
/// Spreads requests out so a batch does not hit one host in lockstep. A zero
/// range never sleeps.
#[derive(Debug, Clone, Copy)]
pub struct RateJitter {
    range: WaitRange,
}

impl RateJitter {
    pub const fn new(range: WaitRange) -> Self {
        Self { range }
    }

    pub const fn range(&self) -> WaitRange {
        self.range
    }

    /// Draw one pause from `[min, max]`.
    pub fn sample(&self) -> Duration {
        let (min, max) = (self.range.min(), self.range.max());
        if min >= max {
            return min;
        }
        let secs = rand::rng().random_range(min.as_secs_f64()..=max.as_secs_f64());
        Duration::from_secs_f64(secs).clamp(min, max)
    }

    /// Sleep for one sampled pause.
    pub async fn pause(&self) {
        if self.range.is_zero() {
            return;
        }
        let delay = self.sample();
        trace!(delay_ms = delay.as_millis(), "Jitter pause");
        tokio::time::sleep(delay).await;
    }
}
