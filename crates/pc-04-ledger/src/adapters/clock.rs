//! System clock adapter.

use crate::ports::Clock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock time in fractional Unix seconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}
