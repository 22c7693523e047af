//! Microsecond time source.
//!
//! The counter wraps at 2^32 µs (~71 min). Consumers only ever take
//! differences with `wrapping_sub`, which stays correct across one wrap.

/// Monotonic microsecond counter, wrapping at `u32::MAX`.
pub trait Clock {
    fn now_micros(&self) -> u32;

    /// µs elapsed since `since`, modulo 2^32.
    #[inline]
    fn elapsed_micros(&self, since: u32) -> u32 {
        self.now_micros().wrapping_sub(since)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now_micros(&self) -> u32 {
        (**self).now_micros()
    }
}

/// Clock backed by the embassy time driver (1 MHz tick).
#[cfg(target_os = "none")]
#[derive(Clone, Copy, Default)]
pub struct EmbassyClock;

#[cfg(target_os = "none")]
impl Clock for EmbassyClock {
    #[inline]
    fn now_micros(&self) -> u32 {
        embassy_time::Instant::now().as_micros() as u32
    }
}

/// Host-side clock that advances by a fixed step on every read.
#[cfg(test)]
pub struct MockClock {
    now: core::cell::Cell<u32>,
    step: u32,
}

#[cfg(test)]
impl MockClock {
    pub fn new(start: u32, step: u32) -> Self {
        Self {
            now: core::cell::Cell::new(start),
            step,
        }
    }

    /// Current time without advancing.
    pub fn peek(&self) -> u32 {
        self.now.get()
    }
}

#[cfg(test)]
impl Clock for MockClock {
    fn now_micros(&self) -> u32 {
        let t = self.now.get();
        self.now.set(t.wrapping_add(self.step));
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_survives_counter_wrap() {
        let clock = MockClock::new(5, 0);
        assert_eq!(clock.elapsed_micros(u32::MAX - 4), 10);
    }

    #[test]
    fn mock_clock_steps_after_each_read() {
        let clock = MockClock::new(100, 25);
        assert_eq!(clock.now_micros(), 100);
        assert_eq!(clock.now_micros(), 125);
        assert_eq!(clock.peek(), 150);
    }
}
