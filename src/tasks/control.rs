//! Steady-state control loop: latest conditioned width → motor output.
use crate::drivers::hbridge::{Drive, MotorCommand};
use crate::ipc::{ChannelReadings, Stick};

/// What one iteration did, per stick (`[left, right]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct Cycle {
    pub widths: [u32; 2],
    pub commands: [MotorCommand; 2],
    pub fresh: [bool; 2],
}

pub struct ControlLoop {
    signal_timeout_us: u32,
    lost: [bool; 2],
    cycles: u32,
    stale_cycles: u32,
}

impl ControlLoop {
    pub const fn new(signal_timeout_us: u32) -> Self {
        Self {
            signal_timeout_us,
            lost: [false; 2],
            cycles: 0,
            stale_cycles: 0,
        }
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn stale_cycles(&self) -> u32 {
        self.stale_cycles
    }

    /// Reset the counters reported by the periodic stats line.
    pub fn take_stats(&mut self) -> (u32, u32) {
        let out = (self.cycles, self.stale_cycles);
        self.cycles = 0;
        self.stale_cycles = 0;
        out
    }

    /// One pass: read both sticks, drive both motors.
    pub fn step<R, D>(&mut self, now_us: u32, channels: &R, motors: &mut D) -> Cycle
    where
        R: ChannelReadings,
        D: Drive,
    {
        let mut cycle = Cycle {
            widths: [0; 2],
            commands: [MotorCommand::STOP; 2],
            fresh: [false; 2],
        };

        for (i, stick) in Stick::ALL.into_iter().enumerate() {
            let (width, fresh) = channels
                .state(stick)
                .fresh_or_neutral(now_us, self.signal_timeout_us);

            if fresh == self.lost[i] {
                self.lost[i] = !fresh;
                if fresh {
                    info!("{:?} signal restored", stick);
                } else {
                    warn!("{:?} signal lost, holding neutral", stick);
                }
            }

            cycle.widths[i] = width;
            cycle.fresh[i] = fresh;
            cycle.commands[i] = motors.drive(stick, width);
        }

        trace!("LRef: {} RRef: {}", cycle.widths[0], cycle.widths[1]);

        self.cycles = self.cycles.wrapping_add(1);
        if !(cycle.fresh[0] && cycle.fresh[1]) {
            self.stale_cycles = self.stale_cycles.wrapping_add(1);
        }
        cycle
    }
}

#[cfg(target_os = "none")]
pub type BoardMotors = crate::drivers::hbridge::MotorDriver<
    crate::board::MotorBridge,
    crate::board::MotorBridge,
    embassy_stm32::gpio::Output<'static>,
    embassy_stm32::gpio::Output<'static>,
>;

#[cfg(target_os = "none")]
#[embassy_executor::task]
pub async fn control_task(mut motors: BoardMotors) {
    use crate::config::{CONTROL_PERIOD_US, SIGNAL_TIMEOUT_US, STATS_EVERY_CYCLES};
    use crate::drivers::clock::{Clock, EmbassyClock};
    use crate::ipc::GlobalChannels;
    use embassy_time::{Duration, Ticker};

    info!("control loop running every {}us", CONTROL_PERIOD_US);
    if !motors.is_enabled() {
        warn!("motor drivers are disabled, commands will not reach the motors");
    }
    let clock = EmbassyClock;
    let mut control = ControlLoop::new(SIGNAL_TIMEOUT_US);
    let mut ticker = Ticker::every(Duration::from_micros(CONTROL_PERIOD_US));

    loop {
        let cycle = control.step(clock.now_micros(), &GlobalChannels, &mut motors);

        if control.cycles() >= STATS_EVERY_CYCLES {
            let (cycles, stale) = control.take_stats();
            info!(
                "control stats: cycles={}, stale={}, L={} {:?}, R={} {:?}",
                cycles,
                stale,
                cycle.widths[0],
                cycle.commands[0],
                cycle.widths[1],
                cycle.commands[1]
            );
        }

        ticker.next().await;
    }
}
