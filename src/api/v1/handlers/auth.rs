/*
 * Responsibility
 * - POST /jwt: email に対して access token を発行 (body + cookie)
 * - POST /logout: token cookie を消す
 * - 本人確認そのものは sign-in provider 側で済んでいる前提
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::{AppendHeaders, IntoResponse},
};

use crate::{
    api::v1::dto::auth::{LogoutResponse, TokenRequest, TokenResponse},
    error::AppError,
    services::auth::cookie::{clear_token_cookie, token_cookie},
    state::AppState,
};

pub async fn issue_token(
    State(state): State<AppState>,
    req: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = req?;
    req.validate().map_err(AppError::invalid)?;

    let email = req.email.trim();
    let ttl = state.issuer.ttl_seconds();
    let token = state.issuer.issue(email)?;
    tracing::info!(email = %email, "access token issued");

    let cookie = token_cookie(&token, ttl, state.app_env);
    let body = TokenResponse {
        token,
        token_type: "Bearer",
        expires_in: ttl,
    };

    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(body)))
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, clear_token_cookie(state.app_env))]),
        Json(LogoutResponse { success: true }),
    )
}
