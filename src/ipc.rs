//! State shared between the capture tasks (writers) and the gate / control
//! loop (readers).
//!
//! One writer and one reader per channel, latest value wins. Every field is
//! a single `AtomicU32`, so a preempting capture task can never leave a
//! half-written width behind.
use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use crate::config::RC_NEUTRAL_US;
use crate::drivers::ppm::Derivation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Stick {
    Left,
    Right,
}

impl Stick {
    pub const ALL: [Stick; 2] = [Stick::Left, Stick::Right];

    pub fn derivation(self) -> Derivation {
        match self {
            Stick::Left => Derivation::Direct,
            Stick::Right => Derivation::Inverted,
        }
    }

    pub fn state(self) -> &'static ChannelState {
        match self {
            Stick::Left => &LEFT_CH,
            Stick::Right => &RIGHT_CH,
        }
    }
}

pub struct ChannelState {
    raw_us: AtomicU32,
    conditioned_us: AtomicU32,
    updated_at_us: AtomicU32,
    seen: AtomicBool,
}

impl ChannelState {
    pub const fn new() -> Self {
        Self {
            raw_us: AtomicU32::new(0),
            conditioned_us: AtomicU32::new(0),
            updated_at_us: AtomicU32::new(0),
            seen: AtomicBool::new(false),
        }
    }

    /// Capture side: store a new reading.
    pub fn publish(&self, raw_us: u32, conditioned_us: u32, now_us: u32) {
        self.raw_us.store(raw_us, Ordering::Relaxed);
        self.conditioned_us.store(conditioned_us, Ordering::Release);
        self.updated_at_us.store(now_us, Ordering::Release);
        self.seen.store(true, Ordering::Release);
    }

    pub fn raw(&self) -> u32 {
        self.raw_us.load(Ordering::Relaxed)
    }

    /// Zero until the first pulse arrives.
    pub fn conditioned(&self) -> u32 {
        self.conditioned_us.load(Ordering::Acquire)
    }

    /// µs since the last publish, `None` if nothing was ever published.
    pub fn age(&self, now_us: u32) -> Option<u32> {
        if !self.seen.load(Ordering::Acquire) {
            return None;
        }
        Some(now_us.wrapping_sub(self.updated_at_us.load(Ordering::Acquire)))
    }

    /// Conditioned width, or neutral when the channel is silent for
    /// longer than `timeout_us`.
    pub fn fresh_or_neutral(&self, now_us: u32, timeout_us: u32) -> (u32, bool) {
        match self.age(now_us) {
            Some(age) if age <= timeout_us => (self.conditioned(), true),
            _ => (RC_NEUTRAL_US, false),
        }
    }
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::new()
    }
}

pub static LEFT_CH: ChannelState = ChannelState::new();
pub static RIGHT_CH: ChannelState = ChannelState::new();

/// Read side of the channel pair, as seen by the gate and the control loop.
pub trait ChannelReadings {
    fn state(&self, stick: Stick) -> &ChannelState;

    fn conditioned(&self, stick: Stick) -> u32 {
        self.state(stick).conditioned()
    }
}

/// The firmware's two global channel records.
#[derive(Clone, Copy, Default)]
pub struct GlobalChannels;

impl ChannelReadings for GlobalChannels {
    fn state(&self, stick: Stick) -> &ChannelState {
        stick.state()
    }
}

/// A standalone pair, used where the globals would leak between tests.
#[derive(Default)]
pub struct ChannelPair {
    pub left: ChannelState,
    pub right: ChannelState,
}

impl ChannelReadings for ChannelPair {
    fn state(&self, stick: Stick) -> &ChannelState {
        match stick {
            Stick::Left => &self.left,
            Stick::Right => &self.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_initialised_until_first_publish() {
        let ch = ChannelState::new();
        assert_eq!(ch.conditioned(), 0);
        assert_eq!(ch.age(1_000), None);
        assert_eq!(ch.fresh_or_neutral(1_000, 100), (1_500, false));
    }

    #[test]
    fn publish_then_read() {
        let ch = ChannelState::new();
        ch.publish(1_620, 1_620, 5_000);
        assert_eq!(ch.raw(), 1_620);
        assert_eq!(ch.conditioned(), 1_620);
        assert_eq!(ch.age(5_250), Some(250));
        assert_eq!(ch.fresh_or_neutral(5_250, 1_000), (1_620, true));
    }

    #[test]
    fn stale_channel_reads_neutral() {
        let ch = ChannelState::new();
        ch.publish(1_900, 1_900, 0);
        assert_eq!(ch.fresh_or_neutral(100_001, 100_000), (1_500, false));
        assert_eq!(ch.fresh_or_neutral(100_000, 100_000), (1_900, true));
    }

    #[test]
    fn channels_are_independent() {
        let pair = ChannelPair::default();
        pair.left.publish(1_100, 1_000, 1);
        assert_eq!(pair.conditioned(Stick::Left), 1_000);
        assert_eq!(pair.conditioned(Stick::Right), 0);
    }

    #[test]
    fn derivation_per_stick() {
        assert_eq!(Stick::Left.derivation(), Derivation::Direct);
        assert_eq!(Stick::Right.derivation(), Derivation::Inverted);
    }
}
