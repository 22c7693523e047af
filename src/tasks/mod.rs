pub mod capture;
pub mod control;

pub use capture::handle_edge;
pub use control::{ControlLoop, Cycle};

#[cfg(target_os = "none")]
pub use capture::capture_task;
#[cfg(target_os = "none")]
pub use control::{control_task, BoardMotors};
