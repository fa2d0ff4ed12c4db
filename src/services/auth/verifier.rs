use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use std::{error::Error as StdError, fmt};

use crate::services::auth::claims::Claims;

// Errors returned by the credential verifier. All of them are surfaced as 401.
#[derive(Debug)]
pub enum AuthnError {
    MissingToken,
    MalformedToken,
    InvalidToken(jsonwebtoken::errors::Error),
}

impl fmt::Display for AuthnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingToken => write!(f, "missing authorization header"),
            Self::MalformedToken => write!(f, "authorization header is not a bearer token"),
            Self::InvalidToken(e) => write!(f, "token verification failed: {}", e),
        }
    }
}

impl StdError for AuthnError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::InvalidToken(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthnError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::InvalidToken(e)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(raw: &str) -> Result<&str, AuthnError> {
    let (scheme, token) = raw
        .trim()
        .split_once(' ')
        .ok_or(AuthnError::MalformedToken)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthnError::MalformedToken);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthnError::MalformedToken);
    }

    Ok(token)
}

/// HS256 access-token verifier.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(secret: &[u8], leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verify the raw `Authorization` header value and return the decoded claims.
    ///
    /// Pure: nothing is recorded, the caller attaches the claims to the request.
    pub fn verify(&self, header: Option<&str>) -> Result<Claims, AuthnError> {
        let raw = header.ok_or(AuthnError::MissingToken)?;
        let token = bearer_token(raw)?;
        self.decode(token)
    }

    // Signature + exp check only (no header parsing)
    pub fn decode(&self, token: &str) -> Result<Claims, AuthnError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
