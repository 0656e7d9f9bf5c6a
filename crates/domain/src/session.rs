//! Persisted session and user records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game_state::GameState;
use crate::ids::{SessionId, UserId};

/// A persisted wrapper pairing a [`GameState`] with its identifier and the
/// command that produced it. The state is replaced wholesale on every update;
/// no history is retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: SessionId,
    pub user_id: Option<UserId>,
    pub game_state: GameState,
    pub last_command: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A registered player. Declared by the store interface but unused by the
/// gameplay flow; no ownership checks anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password: String,
}
