pub mod clock;
pub mod hbridge;
pub mod ppm;

pub use clock::Clock;
pub use hbridge::{Direction, HBridge, MotorCommand, MotorDriver, MotorError, PwmLine};
pub use ppm::{Derivation, Edge, PulseCapture};
