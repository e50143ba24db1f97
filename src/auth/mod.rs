//! Authentication: credential storage, password hashing, session tokens and the
//! request gate.

pub mod db;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;
pub mod transport;
pub mod validation;

pub use handlers::*;
pub use middleware::{require_auth, AuthContext};
pub use models::{Credential, NewCredential, Role, User};
pub use repository::{RepositoryError, SqliteUserRepository, UserRepository};
pub use service::{AuthService, Session};
pub use token::{Claims, TokenError, TokenService};
pub use transport::SessionTransport;
