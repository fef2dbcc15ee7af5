//! Resend Policy

use super::countdown::Countdown;

pub const MAX_RESENDS: u32 = 2;
pub const RESEND_COOLDOWN_SECS: u32 = 30;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResendState {
    resend_count: u32,
    countdown: Countdown,
}

impl ResendState {
    pub fn new() -> Self { Self::default() }

    pub fn resend_count(&self) -> u32 { self.resend_count }
    pub fn cooldown_remaining(&self) -> u32 { self.countdown.remaining() }
    pub fn countdown(&self) -> &Countdown { &self.countdown }
    pub fn is_exhausted(&self) -> bool { self.resend_count >= MAX_RESENDS }

    pub fn can_resend(&self) -> bool { !self.countdown.is_running() && !self.is_exhausted() }

    /// Counts a resend the backend accepted and restarts the cooldown.
    /// Returns the countdown generation for the ticker.
    pub fn record_success(&mut self) -> u64 {
        self.resend_count += 1;
        self.countdown.start(RESEND_COOLDOWN_SECS)
    }

    pub fn tick(&mut self, generation: u64) -> bool { self.countdown.tick(generation) }

    pub fn cancel_cooldown(&mut self) { self.countdown.cancel() }

    pub fn label(&self) -> String {
        if self.is_exhausted() {
            "Resend Disabled".to_string()
        } else if self.countdown.is_running() {
            format!("Resend in {}s", self.countdown.remaining())
        } else {
            "Resend Code".to_string()
        }
    }
}
