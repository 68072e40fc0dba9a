//! # Auth Module
//!
//! Consumer side of authentication: users bound to social identities,
//! opaque bearer sessions, and the caller context handed to services.
//! The OAuth provider handshake itself lives outside this crate.

pub mod context;
pub mod crypto;
pub mod errors;
pub mod session;
pub mod user;

pub use context::AuthContext;
pub use errors::{AuthError, AuthResult};
pub use session::{InMemorySessionRepository, Session, SessionConfig, SessionManager, SessionRepository};
pub use user::{
    InMemoryUserRepository, Role, SocialBind, UpdateProfileRequest, User, UserPublic,
    UserRepository, UserService,
};
