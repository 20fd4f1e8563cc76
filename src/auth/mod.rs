//! Authentication module
//!
//! Provides JWT-based authentication: every member of the squad has the same
//! capabilities, so there is no role layer - identity is the whole story.

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, TokenPair, TokenType, create_tokens, decode_token, refresh_tokens};
pub use middleware::auth_middleware;
pub use password::{hash_password, verify_password};
