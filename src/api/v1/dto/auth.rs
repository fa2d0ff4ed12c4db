/*
 * Responsibility
 * - POST /jwt, POST /logout の DTO
 */
use serde::{Deserialize, Serialize};

use super::common::is_email;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
}

impl TokenRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !is_email(self.email.trim()) {
            return Err("email is invalid");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    /// Always "Bearer"
    pub token_type: &'static str,
    /// Seconds until expiry.
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}
