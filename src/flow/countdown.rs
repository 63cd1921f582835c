//! Resend cooldown for OTP challenges.
//!
//! A plain value type: the owning view drives it with one `tick` per second
//! and stops ticking on cleanup. Resend is enabled exactly when the remaining
//! time reaches zero.

#[cfg(test)]
#[path = "countdown_test.rs"]
mod countdown_test;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    total: u32,
    remaining: u32,
}

impl Countdown {
    /// A countdown that starts full.
    #[must_use]
    pub fn new(total_secs: u32) -> Self {
        Self { total: total_secs, remaining: total_secs }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// One second elapsed. Returns the new remaining time.
    pub fn tick(&mut self) -> u32 {
        self.advance(1)
    }

    /// `secs` elapsed; saturates at zero.
    pub fn advance(&mut self, secs: u32) -> u32 {
        self.remaining = self.remaining.saturating_sub(secs);
        self.remaining
    }

    pub fn restart(&mut self) {
        self.remaining = self.total;
    }

    #[must_use]
    pub fn can_resend(&self) -> bool {
        self.remaining == 0
    }

    /// `m:ss`, e.g. `3:00`, `0:07`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}
