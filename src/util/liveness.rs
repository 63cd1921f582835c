//! Liveness flag for discarding late async results.
//!
//! A view creates one on mount and calls [`Liveness::kill`] on cleanup. Async
//! work captures a clone and checks [`Liveness::is_alive`] before applying
//! state, so a response that lands after navigation is dropped silently.

#[cfg(test)]
#[path = "liveness_test.rs"]
mod liveness_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone, Debug)]
pub struct Liveness {
    alive: Arc<AtomicBool>,
}

impl Default for Liveness {
    fn default() -> Self {
        Self { alive: Arc::new(AtomicBool::new(true)) }
    }
}

impl Liveness {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    pub fn kill(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }
}
