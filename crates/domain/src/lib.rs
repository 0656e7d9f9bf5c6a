//! DungeonMind domain types.
//!
//! - `game_state` - the canonical game snapshot and its validation boundary
//! - `request` - the player command request body
//! - `session` - persisted session and user records
//! - `ids` - identifier newtypes
//! - `error` - validation and domain error types

pub mod error;
pub mod game_state;
pub mod ids;
pub mod request;
pub mod session;

pub use error::{FieldError, ValidationError};
pub use game_state::{GameEnemy, GameLoot, GameState};
pub use ids::{SessionId, UserId};
pub use request::CommandRequest;
pub use session::{GameSession, User};
