// Authentication: password policy, JWT access/refresh lifecycle, revocation.
// Tokens are stateless; the blacklist is the only server-side token state.

pub mod blacklist;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod handlers;
pub mod password;
pub mod purge;
pub mod tokens;
pub mod users;

pub use error::AuthError;
