use serde::{Deserialize, Serialize};

/// Access token claims.
///
/// - `email` identifies the caller; the role is never carried in the token
/// - `iat` / `exp` are unix seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(email: impl Into<String>, issued_at: i64, ttl_seconds: u64) -> Self {
        Self {
            email: email.into(),
            iat: issued_at,
            exp: issued_at + ttl_seconds as i64,
        }
    }
}
