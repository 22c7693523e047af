//! Dual H-bridge motor output
//! ===========================================================
//!
//! Each motor has an A/B PWM pair. A is driven for forward, B for backward,
//! and the idle line is always zeroed *before* the active one is written so
//! the bridge never sees both inputs high. Both driver chips share a pair of
//! enable lines that stay low until the arming gate releases.

use embedded_hal::digital::v2::OutputPin;

use crate::config::{CORRECTION_US, RC_HALF_SPAN_US, RC_NEUTRAL_US};
use crate::ipc::Stick;

/* ------------------------------------------------------------------------- */
/*  Error enum                                                               */
/* ------------------------------------------------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum MotorError {
    EnableLine(Stick),
}

/* ------------------------------------------------------------------------- */
/*  Mapping                                                                  */
/* ------------------------------------------------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Neutral itself falls on the backward side.
    #[inline]
    pub fn from_width(width_us: u32) -> Self {
        if width_us <= RC_NEUTRAL_US {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }
}

/// Pulse width → 8-bit drive magnitude, `floor(|w - 1500| * 255 / 500)`.
pub fn duty_from_width(width_us: u32) -> u8 {
    let magnitude = if width_us > RC_NEUTRAL_US {
        width_us - RC_NEUTRAL_US
    } else if width_us < RC_NEUTRAL_US {
        // mirrors the right channel's inversion; equals 1500 - w
        CORRECTION_US.saturating_sub(width_us) - RC_NEUTRAL_US
    } else {
        return 0;
    };
    let magnitude = magnitude.min(RC_HALF_SPAN_US);
    (magnitude * u8::MAX as u32 / RC_HALF_SPAN_US) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct MotorCommand {
    pub direction: Direction,
    pub duty: u8,
}

impl MotorCommand {
    pub const STOP: Self = Self {
        direction: Direction::Backward,
        duty: 0,
    };

    pub fn from_width(width_us: u32) -> Self {
        Self {
            direction: Direction::from_width(width_us),
            duty: duty_from_width(width_us),
        }
    }
}

/* ------------------------------------------------------------------------- */
/*  Output seams                                                             */
/* ------------------------------------------------------------------------- */

/// One PWM output line, duty in 0..=255.
pub trait PwmLine {
    fn set_duty(&mut self, duty: u8);
}

impl<P: PwmLine + ?Sized> PwmLine for &mut P {
    fn set_duty(&mut self, duty: u8) {
        (**self).set_duty(duty)
    }
}

#[cfg(target_os = "none")]
impl<T: embassy_stm32::timer::GeneralInstance4Channel> PwmLine
    for embassy_stm32::timer::simple_pwm::SimplePwmChannel<'static, T>
{
    fn set_duty(&mut self, duty: u8) {
        self.set_duty_cycle_fraction(duty as u16, u8::MAX as u16);
    }
}

/// One motor behind an A/B direction pair.
pub struct HBridge<A, B> {
    a: A,
    b: B,
    last: MotorCommand,
}

impl<A: PwmLine, B: PwmLine> HBridge<A, B> {
    pub fn new(mut a: A, mut b: B) -> Self {
        a.set_duty(0);
        b.set_duty(0);
        Self {
            a,
            b,
            last: MotorCommand::STOP,
        }
    }

    pub fn drive(&mut self, cmd: MotorCommand) {
        match cmd.direction {
            Direction::Forward => {
                self.b.set_duty(0);
                self.a.set_duty(cmd.duty);
            }
            Direction::Backward => {
                self.a.set_duty(0);
                self.b.set_duty(cmd.duty);
            }
        }
        self.last = cmd;
    }

    pub fn drive_width(&mut self, width_us: u32) -> MotorCommand {
        let cmd = MotorCommand::from_width(width_us);
        self.drive(cmd);
        cmd
    }

    pub fn stop(&mut self) {
        self.a.set_duty(0);
        self.b.set_duty(0);
        self.last = MotorCommand::STOP;
    }

    pub fn last(&self) -> MotorCommand {
        self.last
    }
}

/// Something that can turn a conditioned width into motor output.
pub trait Drive {
    fn drive(&mut self, stick: Stick, width_us: u32) -> MotorCommand;
}

/// Both motors plus their driver-enable lines.
pub struct MotorDriver<M1, M2, EN1, EN2> {
    pub left: M1,
    pub right: M2,
    enable_left: EN1,
    enable_right: EN2,
    enabled: bool,
}

impl<A1, B1, A2, B2, EN1, EN2> MotorDriver<HBridge<A1, B1>, HBridge<A2, B2>, EN1, EN2>
where
    A1: PwmLine,
    B1: PwmLine,
    A2: PwmLine,
    B2: PwmLine,
    EN1: OutputPin,
    EN2: OutputPin,
{
    pub fn new(
        left: HBridge<A1, B1>,
        right: HBridge<A2, B2>,
        enable_left: EN1,
        enable_right: EN2,
    ) -> Self {
        Self {
            left,
            right,
            enable_left,
            enable_right,
            enabled: false,
        }
    }

    /// Power both driver chips. Stays on for the rest of execution.
    pub fn enable(&mut self) -> Result<(), MotorError> {
        self.enable_left
            .set_high()
            .map_err(|_| MotorError::EnableLine(Stick::Left))?;
        self.enable_right
            .set_high()
            .map_err(|_| MotorError::EnableLine(Stick::Right))?;
        self.enabled = true;
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn stop_all(&mut self) {
        self.left.stop();
        self.right.stop();
    }
}

impl<A1, B1, A2, B2, EN1, EN2> Drive for MotorDriver<HBridge<A1, B1>, HBridge<A2, B2>, EN1, EN2>
where
    A1: PwmLine,
    B1: PwmLine,
    A2: PwmLine,
    B2: PwmLine,
{
    fn drive(&mut self, stick: Stick, width_us: u32) -> MotorCommand {
        match stick {
            Stick::Left => self.left.drive_width(width_us),
            Stick::Right => self.right.drive_width(width_us),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec;
    use std::vec::Vec;

    #[test]
    fn direction_split_at_neutral() {
        assert_eq!(Direction::from_width(1_500), Direction::Backward);
        assert_eq!(Direction::from_width(1_000), Direction::Backward);
        assert_eq!(Direction::from_width(1_501), Direction::Forward);
        assert_eq!(Direction::from_width(2_000), Direction::Forward);
    }

    #[test]
    fn duty_endpoints() {
        assert_eq!(duty_from_width(1_500), 0);
        assert_eq!(duty_from_width(2_000), 255);
        assert_eq!(duty_from_width(1_000), 255);
    }

    #[test]
    fn duty_is_floor_of_scaled_magnitude() {
        assert_eq!(duty_from_width(1_900), 204);
        assert_eq!(duty_from_width(1_100), 204);
        assert_eq!(duty_from_width(1_501), 0);
        assert_eq!(duty_from_width(1_502), 1);
        assert_eq!(duty_from_width(1_200), 153);
    }

    #[test]
    fn duty_is_symmetric_about_neutral() {
        for m in 0..=500 {
            assert_eq!(duty_from_width(1_500 + m), duty_from_width(1_500 - m), "m = {m}");
        }
    }

    #[test]
    fn duty_saturates_beyond_full_deflection() {
        assert_eq!(duty_from_width(2_600), 255);
        assert_eq!(duty_from_width(0), 255);
    }

    #[test]
    fn forward_zeroes_b_before_driving_a() {
        let log = WriteLog::default();
        let (a, b) = lines(&log, 0, 1);
        let mut bridge = HBridge::new(a, b);
        log.borrow_mut().clear();

        let cmd = bridge.drive_width(1_900);
        assert_eq!(cmd, MotorCommand { direction: Direction::Forward, duty: 204 });
        assert_eq!(*log.borrow(), vec![(1, 0), (0, 204)]);
    }

    #[test]
    fn backward_zeroes_a_before_driving_b() {
        let log = WriteLog::default();
        let (a, b) = lines(&log, 0, 1);
        let mut bridge = HBridge::new(a, b);
        log.borrow_mut().clear();

        bridge.drive_width(1_000);
        assert_eq!(*log.borrow(), vec![(0, 0), (1, 255)]);
        assert_eq!(bridge.last().direction, Direction::Backward);
    }

    #[test]
    fn never_both_lines_on_across_reversals() {
        let log = WriteLog::default();
        let (a, b) = lines(&log, 0, 1);
        let mut bridge = HBridge::new(a, b);
        let widths: Vec<u32> = vec![2_000, 1_000, 1_900, 1_500, 1_100, 2_000, 1_501, 1_499];
        for w in widths {
            bridge.drive_width(w);
        }
        assert_never_both_on(&log, &[(0, 1)]);
    }

    #[test]
    fn driver_enables_both_chips() {
        let log = WriteLog::default();
        let (a1, b1) = lines(&log, 0, 1);
        let (a2, b2) = lines(&log, 2, 3);
        let en1 = FakePin::default();
        let en2 = FakePin::default();
        let (s1, s2) = (en1.high.clone(), en2.high.clone());

        let mut motors = MotorDriver::new(HBridge::new(a1, b1), HBridge::new(a2, b2), en1, en2);
        assert!(!motors.is_enabled());
        motors.enable().unwrap();
        assert!(motors.is_enabled());
        assert!(*s1.borrow() && *s2.borrow());
    }

    #[test]
    fn enable_failure_is_reported() {
        let log = WriteLog::default();
        let (a1, b1) = lines(&log, 0, 1);
        let (a2, b2) = lines(&log, 2, 3);
        let mut motors = MotorDriver::new(
            HBridge::new(a1, b1),
            HBridge::new(a2, b2),
            FakePin { high: Rc::new(RefCell::new(false)) },
            BrokenPin,
        );
        assert_eq!(motors.enable(), Err(MotorError::EnableLine(Stick::Right)));
        assert!(!motors.is_enabled());
    }

    #[test]
    fn stop_all_zeroes_every_line() {
        let log = WriteLog::default();
        let (a1, b1) = lines(&log, 0, 1);
        let (a2, b2) = lines(&log, 2, 3);
        let mut motors = MotorDriver::new(
            HBridge::new(a1, b1),
            HBridge::new(a2, b2),
            FakePin::default(),
            FakePin::default(),
        );
        motors.drive(Stick::Left, 2_000);
        motors.drive(Stick::Right, 1_000);
        log.borrow_mut().clear();
        motors.stop_all();
        let mut written: Vec<(usize, u8)> = log.borrow().clone();
        written.sort();
        assert_eq!(written, vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
    }
}
