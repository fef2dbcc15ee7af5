//! Countdown
//!
//! Second-granularity cooldown counter. Ticks come from an external ticker;
//! every `start` opens a new generation and ticks from earlier generations are
//! ignored, so a restarted countdown can never be decremented twice per second.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    generation: u64,
}

impl Countdown {
    pub fn new() -> Self { Self::default() }

    pub fn remaining(&self) -> u32 { self.remaining }
    pub fn generation(&self) -> u64 { self.generation }
    pub fn is_running(&self) -> bool { self.remaining > 0 }

    /// Returns the generation the ticker must stamp its ticks with.
    pub fn start(&mut self, seconds: u32) -> u64 {
        self.generation += 1;
        self.remaining = seconds;
        self.generation
    }

    /// Returns whether the countdown is still running afterwards.
    pub fn tick(&mut self, generation: u64) -> bool {
        if generation == self.generation && self.remaining > 0 {
            self.remaining -= 1;
        }
        self.is_running()
    }

    /// Stops the countdown and invalidates every outstanding tick.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.remaining = 0;
    }
}
