//! Progress throttling.
//!
//! Rate-limits plain-text progress lines so logs are not flooded on large
//! batches.

use std::time::{Duration, Instant};

/// Rate-limiter for progress lines.
///
/// The first update and the final one (`completed == total`) always pass;
/// anything in between passes at most once per interval.
#[derive(Debug)]
pub struct ProgressThrottle {
    last_emit: Option<Instant>,
    min_interval: Duration,
}

impl ProgressThrottle {
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            last_emit: None,
            min_interval,
        }
    }

    /// One line per second.
    pub const fn default_interval() -> Self {
        Self::new(Duration::from_secs(1))
    }

    pub fn should_emit(&mut self, completed: usize, total: usize) -> bool {
        self.should_emit_at(Instant::now(), completed, total)
    }

    fn should_emit_at(&mut self, now: Instant, completed: usize, total: usize) -> bool {
        let due = match self.last_emit {
            Some(last) => now.duration_since(last) >= self.min_interval,
            None => true,
        };
        if due || completed >= total {
            self.last_emit = Some(now);
            return true;
        }
        false
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::default_interval()
    }
}
