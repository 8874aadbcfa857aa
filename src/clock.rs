//! Time source used for coupon dates and polling pauses.
//!
//! The workflow never reads the system clock or sleeps directly; it goes
//! through [`Clock`] so tests can drive the polling loop without waiting.

use core::future::Future;
use core::time::Duration;

use chrono::{DateTime, Local};

/// Source of the current time and of pauses between polls.
pub trait Clock: core::fmt::Debug + Send + Sync {
    /// Returns the current local time.
    fn now(&self) -> DateTime<Local>;

    /// Waits for the given duration.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Wall-clock time and tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    #[inline]
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
