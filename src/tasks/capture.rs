//! Per-channel pulse capture.
//!
//! Runs on the interrupt-priority executor so an edge is timestamped and
//! conditioned before the control loop gets the CPU back, the same way a
//! pin-change ISR would.
use crate::conditioner::SignalLimits;
use crate::drivers::ppm::{Edge, PulseCapture};
use crate::ipc::ChannelState;

/// Edge → width → clamp → publish. Returns the conditioned value when
/// the edge produced one.
pub fn handle_edge(
    capture: &mut PulseCapture,
    limits: &SignalLimits,
    state: &ChannelState,
    edge: Edge,
    now_us: u32,
) -> Option<u32> {
    let raw = capture.on_edge(edge, now_us)?;
    let conditioned = limits.condition(raw);
    state.publish(raw, conditioned, now_us);
    Some(conditioned)
}

#[cfg(target_os = "none")]
#[embassy_executor::task(pool_size = 2)]
pub async fn capture_task(
    mut pin: embassy_stm32::exti::ExtiInput<'static>,
    stick: crate::ipc::Stick,
) {
    use crate::drivers::clock::{Clock, EmbassyClock};

    info!("capture task started for {:?}", stick);
    let clock = EmbassyClock;
    let limits = SignalLimits::DEFAULT;
    let state = stick.state();
    let mut capture = PulseCapture::new(stick.derivation());

    loop {
        pin.wait_for_any_edge().await;
        let now = clock.now_micros();
        let edge = Edge::from_level(pin.is_high());
        handle_edge(&mut capture, &limits, state, edge, now);
    }
}
