//! DungeonMind Engine library.
//!
//! All server-side code for the DungeonMind text-adventure backend:
//!
//! - `infrastructure/` - external dependency implementations (LLM port + client)
//! - `stores/` - in-memory session and user storage
//! - `use_cases/` - content generation against the LLM contract
//! - `api/` - HTTP entry points
//! - `app` - application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

pub use app::App;
