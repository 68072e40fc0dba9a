//! # Session Management
//!
//! Opaque bearer sessions. Sessions are created once a social login has
//! been linked to a user; this module only stores and checks them.
//!
//! ## Invariants
//! - Raw tokens are never stored, only their SHA-256 hash
//! - Sessions expire at stated time
//! - Revocation invalidates immediately

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::context::AuthContext;
use super::crypto::{constant_time_str_eq, generate_token, hash_token};
use super::errors::{AuthError, AuthResult};
use super::user::{Role, User};
use crate::core::{StoreError, StoreResult};
use crate::observability::Event;

/// Session model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: Uuid,

    /// User this session belongs to
    pub user_id: Uuid,

    /// Role captured when the session was created
    pub role: Role,

    /// Hashed bearer token (raw token given to client)
    #[serde(skip_serializing, default)]
    pub token_hash: String,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// When the session expires
    pub expires_at: DateTime<Utc>,

    /// Whether the session has been revoked
    pub revoked: bool,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Caller identity carried by this session
    pub fn context(&self) -> AuthContext {
        AuthContext {
            user_id: self.user_id,
            role: self.role,
        }
    }
}

/// Session manager configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session lifetime
    pub ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::days(7),
        }
    }
}

/// Session manager handles session creation and validation
#[derive(Clone)]
pub struct SessionManager {
    config: SessionConfig,
    repository: Arc<dyn SessionRepository>,
}

impl SessionManager {
    pub fn new(config: SessionConfig, repository: Arc<dyn SessionRepository>) -> Self {
        Self { config, repository }
    }

    /// Create a new session for a user
    ///
    /// Returns the raw token (not hashed) to give to the client.
    pub fn create_session(&self, user: &User) -> AuthResult<(Session, String)> {
        let token = generate_token();

        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id: user.id,
            role: user.role,
            token_hash: hash_token(&token),
            created_at: now,
            expires_at: now + self.config.ttl,
            revoked: false,
        };

        self.repository.create(&session)?;
        info!(event = %Event::SessionCreated, user_id = %user.id, session_id = %session.id);

        Ok((session, token))
    }

    /// Validate a bearer token and return the associated session
    pub fn validate(&self, token: &str) -> AuthResult<Session> {
        let session = self
            .repository
            .find_by_token_hash(&hash_token(token))?
            .ok_or(AuthError::SessionInvalid)?;

        if session.revoked {
            return Err(AuthError::SessionRevoked);
        }

        if session.is_expired(Utc::now()) {
            return Err(AuthError::SessionInvalid);
        }

        Ok(session)
    }

    /// Revoke the session behind `token` (logout)
    pub fn revoke(&self, token: &str) -> AuthResult<()> {
        let session = self
            .repository
            .find_by_token_hash(&hash_token(token))?
            .ok_or(AuthError::SessionInvalid)?;
        self.repository.revoke(session.id)?;
        info!(event = %Event::SessionRevoked, session_id = %session.id);
        Ok(())
    }

    /// Drop expired sessions, returning how many were removed
    pub fn purge_expired(&self) -> AuthResult<usize> {
        Ok(self.repository.delete_expired(Utc::now())?)
    }
}

/// Session repository trait
pub trait SessionRepository: Send + Sync {
    /// Create a new session
    fn create(&self, session: &Session) -> StoreResult<()>;

    /// Find session by token hash
    fn find_by_token_hash(&self, hash: &str) -> StoreResult<Option<Session>>;

    /// Revoke a session
    fn revoke(&self, id: Uuid) -> StoreResult<()>;

    /// Delete sessions that expired before `now`
    fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<usize>;
}

/// In-memory session repository
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<Vec<Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn create(&self, session: &Session) -> StoreResult<()> {
        let mut sessions = self.sessions.write().map_err(|_| StoreError::Poisoned("sessions"))?;
        sessions.push(session.clone());
        Ok(())
    }

    fn find_by_token_hash(&self, hash: &str) -> StoreResult<Option<Session>> {
        let sessions = self.sessions.read().map_err(|_| StoreError::Poisoned("sessions"))?;
        Ok(sessions
            .iter()
            .find(|s| constant_time_str_eq(&s.token_hash, hash))
            .cloned())
    }

    fn revoke(&self, id: Uuid) -> StoreResult<()> {
        let mut sessions = self.sessions.write().map_err(|_| StoreError::Poisoned("sessions"))?;
        if let Some(session) = sessions.iter_mut().find(|s| s.id == id) {
            session.revoked = true;
        }
        Ok(())
    }

    fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        let mut sessions = self.sessions.write().map_err(|_| StoreError::Poisoned("sessions"))?;
        let before = sessions.len();
        sessions.retain(|s| !s.is_expired(now));
        Ok(before - sessions.len())
    }
}
