//! Authenticated caller identity passed into the content services.

use uuid::Uuid;

use super::errors::{AuthError, AuthResult};
use super::user::Role;

/// Who is making a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthContext {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owners and admins may modify a resource
    pub fn can_modify(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id || self.is_admin()
    }

    /// Fail unless the caller is an admin
    pub fn require_admin(&self) -> AuthResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::AdminRequired)
        }
    }
}
