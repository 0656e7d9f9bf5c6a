//! Use cases orchestrating the game loop.

pub mod generate;
pub mod prompt;

pub use generate::ContentGenerator;
