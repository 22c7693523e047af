//! RC pulse capture from pin-change edges.
//!
//! Each receiver channel gets its own [`PulseCapture`]. The capture task
//! feeds it every edge together with a microsecond timestamp and publishes
//! whatever width comes back.

use crate::config::CORRECTION_US;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    /// Edge kind from the pin level sampled right after the transition.
    #[inline]
    pub fn from_level(high: bool) -> Self {
        if high {
            Edge::Rising
        } else {
            Edge::Falling
        }
    }
}

/// How a channel turns a measured high time into a reported width.
///
/// The two sticks are wired with opposite polarity. Keep both variants;
/// they encode the harness, not a simplification opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Derivation {
    /// Width reported on the falling edge as measured.
    Direct,
    /// `CORRECTION_US - measured`, reported on every edge.
    Inverted,
}

pub struct PulseCapture {
    derivation: Derivation,
    rise_us: u32,
}

impl PulseCapture {
    pub const fn new(derivation: Derivation) -> Self {
        Self {
            derivation,
            rise_us: 0,
        }
    }

    /// Feed one edge; returns the raw width to condition, if this edge
    /// produces one.
    pub fn on_edge(&mut self, edge: Edge, now_us: u32) -> Option<u32> {
        if edge == Edge::Rising {
            self.rise_us = now_us;
        }
        let measured = now_us.wrapping_sub(self.rise_us);
        match (self.derivation, edge) {
            (Derivation::Inverted, _) => Some(CORRECTION_US.wrapping_sub(measured)),
            (Derivation::Direct, Edge::Falling) => Some(measured),
            (Derivation::Direct, Edge::Rising) => None,
        }
    }
}
