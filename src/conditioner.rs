//! Dead-band and failsafe clamp for captured RC pulse widths.
//!
//! Rules are tried in order and the first match wins:
//!
//! | reading (µs)             | result   |
//! |--------------------------|----------|
//! | 1450 ..= 1550            | neutral  |
//! | 1775 < v < 2000          | max      |
//! | 1000 < v < 1150          | min      |
//! | v < 1000 or v > 2000     | neutral  |
//!
//! Anything else passes through unchanged.

use crate::config::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct SignalLimits {
    pub neutral: u32,
    pub min: u32,
    pub max: u32,
    pub deadband: u32,
    pub dead_low: u32,
    pub dead_high: u32,
}

impl SignalLimits {
    pub const DEFAULT: Self = Self {
        neutral: RC_NEUTRAL_US,
        min: RC_MIN_US,
        max: RC_MAX_US,
        deadband: RC_DEADBAND_US,
        dead_low: RC_DEAD_LOW_US,
        dead_high: RC_DEAD_HIGH_US,
    };

    /// Closed window: `neutral ± deadband` themselves count as centred, so
    /// 1450 and 1550 both read as 1500.
    #[inline]
    fn in_deadband(&self, v: u32) -> bool {
        v >= self.neutral - self.deadband && v <= self.neutral + self.deadband
    }

    /// Clamp one raw reading.
    pub fn condition(&self, raw: u32) -> u32 {
        if self.in_deadband(raw) {
            self.neutral
        } else if raw > self.dead_high && raw < self.max {
            self.max
        } else if raw < self.dead_low && raw > self.min {
            self.min
        } else if raw > self.max || raw < self.min {
            // glitch or lost signal: stop, never full speed
            self.neutral
        } else {
            raw
        }
    }
}

/// [`SignalLimits::condition`] with the stock thresholds.
#[inline]
pub fn condition(raw: u32) -> u32 {
    SignalLimits::DEFAULT.condition(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadband_snaps_to_neutral() {
        for v in 1450..=1550 {
            assert_eq!(condition(v), 1500, "v = {v}");
        }
    }

    #[test]
    fn deadband_edges_are_inclusive() {
        assert_eq!(condition(1450), 1500);
        assert_eq!(condition(1550), 1500);
        assert_eq!(condition(1449), 1449);
        assert_eq!(condition(1551), 1551);
    }

    #[test]
    fn near_full_deflection_saturates() {
        for v in 1776..2000 {
            assert_eq!(condition(v), 2000, "v = {v}");
        }
        for v in 1001..1150 {
            assert_eq!(condition(v), 1000, "v = {v}");
        }
    }

    #[test]
    fn out_of_range_is_failsafe_neutral() {
        for v in [0, 1, 500, 999, 2001, 2500, 3000, u32::MAX] {
            assert_eq!(condition(v), 1500, "v = {v}");
        }
    }

    #[test]
    fn usable_band_passes_through() {
        for v in (1150..1450).chain(1551..=1775) {
            assert_eq!(condition(v), v, "v = {v}");
        }
    }

    #[test]
    fn absolute_limits_pass_through() {
        assert_eq!(condition(1000), 1000);
        assert_eq!(condition(2000), 2000);
    }

    #[test]
    fn output_is_idempotent() {
        for v in (0..3200).step_by(7) {
            let once = condition(v);
            assert_eq!(condition(once), once, "v = {v}");
        }
    }

    #[test]
    fn custom_limits_are_honoured() {
        let limits = SignalLimits {
            deadband: 100,
            ..SignalLimits::DEFAULT
        };
        assert_eq!(limits.condition(1420), 1500);
        assert_eq!(SignalLimits::DEFAULT.condition(1420), 1420);
    }
}
