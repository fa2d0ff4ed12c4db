/*
 * Responsibility
 * - GET /admin-stats (admin dashboard の集計)
 */
use axum::{Json, extract::State};
use serde::Serialize;

use crate::{
    error::AppError,
    repos::{blog_repo, donation_request_repo},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    pub users: i64,
    pub donation_requests: i64,
    pub blogs: i64,
}

pub async fn admin_stats(State(state): State<AppState>) -> Result<Json<AdminStatsResponse>, AppError> {
    let (users, donation_requests, blogs) = tokio::try_join!(
        state.users.count(),
        donation_request_repo::count(&state.db),
        blog_repo::count(&state.db),
    )?;

    Ok(Json(AdminStatsResponse {
        users,
        donation_requests,
        blogs,
    }))
}
