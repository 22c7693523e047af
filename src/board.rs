use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Level, Output, OutputType, Pull, Speed};
use embassy_stm32::peripherals::TIM3;
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm, SimplePwmChannel};
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::{rcc, Config};

use crate::config::PWM_FREQUENCY_HZ;
use crate::drivers::hbridge::{HBridge, MotorDriver};

pub type MotorLine = SimplePwmChannel<'static, TIM3>;
pub type MotorBridge = HBridge<MotorLine, MotorLine>;

// ── Board struct ──────────────────────────────────────────
pub struct Board {
    pub rc_left: ExtiInput<'static>,
    pub rc_right: ExtiInput<'static>,
    pub motors: MotorDriver<MotorBridge, MotorBridge, Output<'static>, Output<'static>>,
}

impl Board {
    pub fn init() -> Self {
        let mut config = Config::default();

        // HSI16 -> PLL -> 64MHz SYSCLK
        config.rcc.hsi = Some(rcc::Hsi {
            sys_div: rcc::HsiSysDiv::DIV1,
        });
        config.rcc.pll = Some(rcc::Pll {
            source: rcc::PllSource::HSI,    // Use HSI as PLL source
            prediv: rcc::PllPreDiv::DIV2,   // 16MHz / 2 = 8MHz
            mul: rcc::PllMul::MUL16,        // 8MHz * 16 = 128MHz
            divp: None,
            divq: None,
            divr: Some(rcc::PllRDiv::DIV2), // 128MHz / 2 = 64MHz
        });
        config.rcc.sys = rcc::Sysclk::PLL1_R;
        let p = embassy_stm32::init(config);

        // RC receiver: CH1 (right stick) on PA0, CH3 (left stick) on PA1
        let rc_right = ExtiInput::new(p.PA0, p.EXTI0, Pull::Down);
        let rc_left = ExtiInput::new(p.PA1, p.EXTI1, Pull::Down);

        // TIM3: CH1/CH2 -> motor 1 A/B, CH3/CH4 -> motor 2 A/B
        let pwm = SimplePwm::new(
            p.TIM3,
            Some(PwmPin::new_ch1(p.PA6, OutputType::PushPull)),
            Some(PwmPin::new_ch2(p.PA7, OutputType::PushPull)),
            Some(PwmPin::new_ch3(p.PB0, OutputType::PushPull)),
            Some(PwmPin::new_ch4(p.PB1, OutputType::PushPull)),
            Hertz(PWM_FREQUENCY_HZ),
            CountingMode::EdgeAlignedUp,
        );
        let mut ch = pwm.split();
        ch.ch1.enable();
        ch.ch2.enable();
        ch.ch3.enable();
        ch.ch4.enable();

        // driver enables held low until the arming gate releases
        let enable_left = Output::new(p.PC6, Level::Low, Speed::Low);
        let enable_right = Output::new(p.PC7, Level::Low, Speed::Low);

        let motors = MotorDriver::new(
            HBridge::new(ch.ch1, ch.ch2),
            HBridge::new(ch.ch3, ch.ch4),
            enable_left,
            enable_right,
        );

        Self {
            rc_left,
            rc_right,
            motors,
        }
    }
}
