//! In-memory session and user storage.
//!
//! Process-scoped and explicitly non-durable: everything here is lost on
//! restart. Each operation completes without suspension, so callers observe
//! every mutation as atomic. Two in-flight commands for the same session are
//! last-write-wins; the single-player assumption makes that acceptable.

use chrono::Utc;
use dashmap::DashMap;

use dungeonmind_domain::{GameSession, GameState, SessionId, User, UserId};

/// Keyed mapping from session identifier to session record, plus the user
/// sub-store the storage interface declares (unused by the gameplay flow).
///
/// Constructed once at startup and handed to request handlers through the
/// application state; tests build isolated instances.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, GameSession>,
    users: DashMap<UserId, User>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh identifier and store a new session.
    pub fn create(
        &self,
        initial_state: GameState,
        last_command: Option<String>,
        user_id: Option<UserId>,
    ) -> GameSession {
        let now = Utc::now();
        let session = GameSession {
            id: SessionId::new(),
            user_id,
            game_state: initial_state,
            last_command,
            created_at: now,
            updated_at: now,
        };
        self.sessions.insert(session.id, session.clone());
        session
    }

    /// Look up a session; a missing key is `None`, never an error.
    pub fn get(&self, id: SessionId) -> Option<GameSession> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    /// Replace the state and command of an existing session in place,
    /// refreshing `updated_at`. Unknown identifiers mutate nothing.
    pub fn update(
        &self,
        id: SessionId,
        new_state: GameState,
        new_command: String,
    ) -> Option<GameSession> {
        let mut entry = self.sessions.get_mut(&id)?;
        entry.game_state = new_state;
        entry.last_command = Some(new_command);
        entry.updated_at = Utc::now();
        Some(entry.clone())
    }

    /// Remove a session, reporting whether it existed.
    pub fn delete(&self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub fn create_user(&self, username: impl Into<String>, password: impl Into<String>) -> User {
        let user = User {
            id: UserId::new(),
            username: username.into(),
            password: password.into(),
        };
        self.users.insert(user.id, user.clone());
        user
    }

    pub fn get_user(&self, id: UserId) -> Option<User> {
        self.users.get(&id).map(|entry| entry.value().clone())
    }

    pub fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.users
            .iter()
            .find(|entry| entry.username == username)
            .map(|entry| entry.value().clone())
    }
}
