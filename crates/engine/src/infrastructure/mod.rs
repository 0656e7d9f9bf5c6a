//! External dependency implementations.

pub mod deepseek;
pub mod ports;
