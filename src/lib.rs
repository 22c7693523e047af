#![cfg_attr(not(test), no_std)]

// must come first so the logging macros are visible below
#[macro_use]
mod fmt;

pub mod arming;
#[cfg(target_os = "none")]
pub mod board;
pub mod conditioner;
pub mod config;
pub mod drivers;
pub mod ipc;
pub mod tasks;

#[cfg(target_os = "none")]
pub use board::Board;
pub use ipc::Stick;
