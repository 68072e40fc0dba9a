//! # User Management
//!
//! Users are created from social (OAuth) profiles. The provider handshake
//! happens elsewhere; this module only binds the resulting profile to a
//! local user.

use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::errors::{AuthError, AuthResult};
use crate::core::{StoreError, StoreResult};
use crate::observability::Event;

/// Longest accepted nickname
pub const MAX_NICKNAME_LEN: usize = 50;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity linked from an OAuth provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialBind {
    pub provider: String,

    /// Provider-side identifier (never exposed)
    #[serde(default, skip_serializing)]
    pub provider_user_id: String,

    pub name: String,

    /// Provider-reported email (never exposed)
    #[serde(default, skip_serializing)]
    pub email: String,

    pub avatar: String,
}

/// User model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,

    pub role: Role,

    pub nickname: String,

    pub avatar: String,

    /// Only shown to the user themselves
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,

    pub socials: Vec<SocialBind>,

    /// When the user was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user from a freshly linked social profile
    pub fn from_social(social: SocialBind, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            nickname: social.name.clone(),
            avatar: social.avatar.clone(),
            email: social.email.clone(),
            socials: vec![social],
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Projection safe to show to other users
    pub fn public(&self) -> UserPublic {
        UserPublic {
            id: self.id,
            nickname: self.nickname.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Public user information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub nickname: String,
    pub avatar: String,
}

/// User profile update request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// User repository trait
///
/// Abstracts storage operations for users.
pub trait UserRepository: Send + Sync {
    /// Find a user by their ID
    fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Find the user bound to a provider identity
    fn find_by_social(&self, provider: &str, provider_user_id: &str) -> StoreResult<Option<User>>;

    /// Create a new user
    fn create(&self, user: &User) -> StoreResult<()>;

    /// Update an existing user
    fn update(&self, user: &User) -> StoreResult<()>;
}

/// In-memory user repository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().map_err(|_| StoreError::Poisoned("users"))?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    fn find_by_social(&self, provider: &str, provider_user_id: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().map_err(|_| StoreError::Poisoned("users"))?;
        Ok(users
            .iter()
            .find(|u| {
                u.socials
                    .iter()
                    .any(|s| s.provider == provider && s.provider_user_id == provider_user_id)
            })
            .cloned())
    }

    fn create(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().map_err(|_| StoreError::Poisoned("users"))?;

        let clash = users.iter().any(|u| {
            u.id == user.id
                || u.socials.iter().any(|s| {
                    user.socials
                        .iter()
                        .any(|n| n.provider == s.provider && n.provider_user_id == s.provider_user_id)
                })
        });
        if clash {
            return Err(StoreError::Duplicate(user.id.to_string()));
        }

        users.push(user.clone());
        Ok(())
    }

    fn update(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().map_err(|_| StoreError::Poisoned("users"))?;

        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(StoreError::Unavailable(format!("user {} vanished", user.id))),
        }
    }
}

/// User operations on top of a [`UserRepository`]
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    admin_email: String,
}

impl UserService {
    /// `admin_email` grants the admin role to the first login with that
    /// address. Empty disables the rule.
    pub fn new(repository: Arc<dyn UserRepository>, admin_email: impl Into<String>) -> Self {
        Self {
            repository,
            admin_email: admin_email.into(),
        }
    }

    /// Find or create the user bound to a provider identity.
    pub fn link_social_profile(&self, social: SocialBind) -> AuthResult<User> {
        if social.provider.trim().is_empty() || social.provider_user_id.trim().is_empty() {
            return Err(AuthError::InvalidProfile(
                "provider and provider user id are required".into(),
            ));
        }

        if let Some(user) = self
            .repository
            .find_by_social(&social.provider, &social.provider_user_id)?
        {
            return Ok(user);
        }

        let role = if !self.admin_email.is_empty()
            && social.email.eq_ignore_ascii_case(&self.admin_email)
        {
            Role::Admin
        } else {
            Role::User
        };

        let user = User::from_social(social, role);
        self.repository.create(&user)?;
        info!(event = %Event::UserCreated, user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    pub fn get(&self, id: Uuid) -> AuthResult<User> {
        self.repository.find_by_id(id)?.ok_or(AuthError::UserNotFound)
    }

    /// Public projection, `None` for unknown ids
    pub fn public(&self, id: Uuid) -> AuthResult<Option<UserPublic>> {
        Ok(self.repository.find_by_id(id)?.map(|u| u.public()))
    }

    /// Change nickname and/or avatar
    pub fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> AuthResult<User> {
        let mut user = self.get(id)?;

        if let Some(nickname) = req.nickname {
            let nickname = nickname.trim();
            if nickname.is_empty() || nickname.chars().count() > MAX_NICKNAME_LEN {
                return Err(AuthError::InvalidProfile(format!(
                    "nickname must be 1-{} characters",
                    MAX_NICKNAME_LEN
                )));
            }
            user.nickname = nickname.to_string();
        }
        if let Some(avatar) = req.avatar {
            user.avatar = avatar.trim().to_string();
        }

        self.repository.update(&user)?;
        Ok(user)
    }
}
