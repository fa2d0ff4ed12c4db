use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::Claims;

/// Claims verified by the route group's guard.
///
/// Only meaningful behind `RouteGuard::apply`; on an unguarded route there is
/// nothing in the extensions and the request is answered with 401.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

impl<S: Send + Sync> FromRequestParts<S> for AuthClaims {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Claims>() {
            Some(claims) => Ok(AuthClaims(claims.clone())),
            None => {
                tracing::error!(path = %parts.uri.path(), "AuthClaims used on an unguarded route");
                Err(AppError::Unauthorized)
            }
        }
    }
}
