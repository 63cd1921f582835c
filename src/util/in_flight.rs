//! Single-request-in-flight guard.
//!
//! A second click on the same action while the first request is pending must
//! be a no-op. Each operation owns one [`InFlight`]; callers hold the returned
//! ticket for the duration of the request and the slot frees on drop.

#[cfg(test)]
#[path = "in_flight_test.rs"]
mod in_flight_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone, Debug, Default)]
pub struct InFlight {
    busy: Arc<AtomicBool>,
}

impl InFlight {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot, or `None` if a request is already pending.
    #[must_use]
    pub fn try_start(&self) -> Option<InFlightTicket> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightTicket { busy: self.busy.clone() })
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Proof of a claimed slot; releases it when dropped.
#[derive(Debug)]
pub struct InFlightTicket {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
