// Centralize all configuration constants

// RC pulse widths (µs)
pub const RC_NEUTRAL_US: u32 = 1500;
pub const RC_MAX_US: u32 = 2000;
pub const RC_MIN_US: u32 = 1000;
pub const RC_DEADBAND_US: u32 = 50;
pub const RC_DEAD_LOW_US: u32 = 1150;
pub const RC_DEAD_HIGH_US: u32 = 1775;

/// Right channel is wired with inverted polarity; its width is reported
/// as `CORRECTION_US - measured`.
pub const CORRECTION_US: u32 = 3000;

/// Full deflection on either side of neutral.
pub const RC_HALF_SPAN_US: u32 = RC_MAX_US - RC_NEUTRAL_US;

// Arming gesture: left stick low, right stick high
pub const ARM_LEFT_BELOW_US: u32 = 1200;
pub const ARM_RIGHT_ABOVE_US: u32 = 1700;
pub const ARM_HOLD_US: u32 = 10_000;
pub const ARM_TIMEOUT_US: u32 = 10_000;
pub const STARTUP_SETTLE_MS: u64 = 5_000;

// Control loop
pub const CONTROL_PERIOD_US: u64 = 1_000;
pub const STATS_EVERY_CYCLES: u32 = 5_000;
pub const SIGNAL_TIMEOUT_US: u32 = 100_000;

// Outputs
pub const PWM_FREQUENCY_HZ: u32 = 1_000;
