#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

use ppm_drive::{
    arming::{wait_for_transmitter, GateConfig},
    config::STARTUP_SETTLE_MS,
    drivers::clock::{Clock, EmbassyClock},
    ipc::GlobalChannels,
    tasks::{capture_task, control_task},
    Board, Stick,
};

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn USART2() {
    EXECUTOR_HIGH.on_interrupt()
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Starting ppm-drive");
    let Board {
        rc_left,
        rc_right,
        mut motors,
    } = Board::init();
    motors.stop_all();

    // Capture runs above thread mode so edges preempt the control loop
    interrupt::USART2.set_priority(Priority::P1);
    let spawner_high_priority = EXECUTOR_HIGH.start(interrupt::USART2);
    spawner_high_priority
        .spawn(capture_task(rc_left, Stick::Left))
        .unwrap();
    spawner_high_priority
        .spawn(capture_task(rc_right, Stick::Right))
        .unwrap();
    info!("Capture tasks spawned on interrupt executor");

    // Give the receiver time to bind before looking for the gesture
    let clock = EmbassyClock;
    let boot_us = clock.now_micros();
    Timer::after_millis(STARTUP_SETTLE_MS).await;
    let report = wait_for_transmitter(&clock, &GlobalChannels, GateConfig::DEFAULT).await;
    info!(
        "Startup gate released after {}us: {:?}",
        clock.elapsed_micros(boot_us),
        report
    );

    if let Err(e) = motors.enable() {
        error!("Motor enable failed: {:?}", e);
    }
    info!("Motor drivers enabled: {}", motors.is_enabled());

    spawner.spawn(control_task(motors)).unwrap();
    info!("Control task spawned on main executor");

    core::future::pending::<()>().await;
}
