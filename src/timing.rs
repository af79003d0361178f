//! Settle delays.
//!
//! Every wait after a screen-changing action goes through [`Pause`] so tests can
//! record delays instead of sleeping.

use std::time::Duration;

/// Blocking wait provider.
pub trait Pause {
    fn pause(&self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPause;

impl Pause for ThreadPause {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
