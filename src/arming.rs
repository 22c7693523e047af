//! Startup gate: hold motor power off until the pilot shows a deliberate
//! stick gesture (left low, right high) for a sustained window.
//!
//! The gate is advisory. It always releases after `timeout_us` measured from
//! its first poll, armed or not, so the firmware can never hang here.

use crate::config::*;
use crate::drivers::clock::Clock;
use crate::ipc::{ChannelReadings, Stick};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum GateOutcome {
    /// Gesture held for the full window.
    Armed,
    /// Global timeout hit first.
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct GateReport {
    pub outcome: GateOutcome,
    pub left_us: u32,
    pub right_us: u32,
    pub elapsed_us: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct GateConfig {
    pub left_below_us: u32,
    pub right_above_us: u32,
    pub hold_us: u32,
    pub timeout_us: u32,
}

impl GateConfig {
    pub const DEFAULT: Self = Self {
        left_below_us: ARM_LEFT_BELOW_US,
        right_above_us: ARM_RIGHT_ABOVE_US,
        hold_us: ARM_HOLD_US,
        timeout_us: ARM_TIMEOUT_US,
    };

    #[inline]
    pub fn gesture_held(&self, left_us: u32, right_us: u32) -> bool {
        left_us < self.left_below_us && right_us > self.right_above_us
    }
}

pub struct StartupGate {
    cfg: GateConfig,
    gate_start: Option<u32>,
    streak_start: u32,
}

impl StartupGate {
    pub const fn new(cfg: GateConfig) -> Self {
        Self {
            cfg,
            gate_start: None,
            streak_start: 0,
        }
    }

    /// One check. Returns the report once the gate releases.
    pub fn poll(&mut self, now_us: u32, left_us: u32, right_us: u32) -> Option<GateReport> {
        let gate_start = match self.gate_start {
            Some(t) => t,
            None => {
                self.gate_start = Some(now_us);
                self.streak_start = now_us;
                now_us
            }
        };
        let held = self.cfg.gesture_held(left_us, right_us);

        if held {
            debug!("Init LRef: {} RRef: {}", left_us, right_us);
        } else {
            self.streak_start = now_us;
            debug!("Error LRef: {} RRef: {}", left_us, right_us);
        }

        let elapsed_us = now_us.wrapping_sub(gate_start);
        let report = |outcome| GateReport {
            outcome,
            left_us,
            right_us,
            elapsed_us,
        };

        if held && now_us.wrapping_sub(self.streak_start) >= self.cfg.hold_us {
            Some(report(GateOutcome::Armed))
        } else if elapsed_us >= self.cfg.timeout_us {
            Some(report(GateOutcome::TimedOut))
        } else {
            None
        }
    }
}

/// Poll the gate against live channel readings until it releases.
pub async fn wait_for_transmitter<C, R>(clock: &C, channels: &R, cfg: GateConfig) -> GateReport
where
    C: Clock,
    R: ChannelReadings,
{
    let mut gate = StartupGate::new(cfg);
    loop {
        let now = clock.now_micros();
        let left = channels.conditioned(Stick::Left);
        let right = channels.conditioned(Stick::Right);
        if let Some(report) = gate.poll(now, left, right) {
            match report.outcome {
                GateOutcome::Armed => info!(
                    "transmitter gesture held, arming (L={} R={})",
                    report.left_us, report.right_us
                ),
                GateOutcome::TimedOut => warn!(
                    "no arming gesture within {}us, continuing (L={} R={})",
                    report.elapsed_us, report.left_us, report.right_us
                ),
            }
            return report;
        }
        embassy_futures::yield_now().await;
    }
}
