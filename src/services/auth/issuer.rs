use jsonwebtoken::{Algorithm, EncodingKey, Header};
use tracing::error;

use crate::error::AppError;
use crate::services::auth::claims::Claims;

/// Signs access tokens over `{email}` with the shared HS256 secret.
#[derive(Clone)]
pub struct TokenIssuer {
    ttl_seconds: u64,
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl_seconds: u64) -> Self {
        Self {
            ttl_seconds,
            encoding_key: EncodingKey::from_secret(secret),
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn issue(&self, email: &str) -> Result<String, AppError> {
        self.issue_at(email, chrono::Utc::now().timestamp())
    }

    pub fn issue_at(&self, email: &str, issued_at: i64) -> Result<String, AppError> {
        self.sign(&Claims::new(email, issued_at, self.ttl_seconds))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            AppError::Internal
        })
    }
}
