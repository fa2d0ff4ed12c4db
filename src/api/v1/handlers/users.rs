/*
 * Responsibility
 * - /users 系 handler
 * - users は email で引く (Path の {email})。本人確認 / admin 確認は route group の guard 側
 * - role / status の変更後は認可 lookup (role cache) を invalidate する
 */
use axum::{
    Json,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
    http::StatusCode,
};

use crate::{
    api::v1::dto::{
        common::ListQuery,
        users::{
            AdminStatusResponse, CreateUserRequest, CreateUserResponse, UpdateProfileRequest,
            UpdateRoleRequest, UpdateStatusRequest, UserResponse, UserStatus,
            VolunteerStatusResponse,
        },
    },
    error::AppError,
    repos::{
        error::RepoError,
        user_repo::{NewUser, ProfileChanges},
    },
    services::auth::Role,
    state::AppState,
};

pub async fn create_user(
    State(state): State<AppState>,
    req: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateUserResponse>), AppError> {
    let Json(req) = req?;
    req.validate().map_err(AppError::invalid)?;

    let email = req.email.trim();
    if state.users.find_by_email(email).await?.is_some() {
        return Ok((StatusCode::OK, Json(CreateUserResponse::already_exists())));
    }

    let new_user = NewUser {
        email,
        name: req.name.trim(),
        avatar: req.avatar.as_deref(),
        blood_group: req.blood_group.as_deref(),
        district: req.district.as_deref(),
        upazila: req.upazila.as_deref(),
    };
    match state.users.create(&new_user).await {
        Ok(row) => {
            tracing::info!(email = %row.email, "user registered");
            Ok((StatusCode::CREATED, Json(CreateUserResponse::created(row.id))))
        }
        // lost the race against a concurrent registration
        Err(RepoError::Conflict) => Ok((StatusCode::OK, Json(CreateUserResponse::already_exists()))),
        Err(e) => Err(e.into()),
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<ListQuery<UserStatus>>, QueryRejection>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let Query(query) = query?;
    let (limit, offset) = query.limit_offset();

    let rows = state
        .users
        .list(query.status.map(|s| s.as_str()), limit, offset)
        .await?;
    let res = rows
        .into_iter()
        .map(UserResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(res))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let row = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(row.try_into()?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(email): Path<String>,
    req: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(req) = req?;
    req.validate().map_err(AppError::invalid)?;

    let changes = ProfileChanges {
        name: req.name.as_deref().map(str::trim),
        avatar: req.avatar.as_ref().map(|inner| inner.as_deref()),
        blood_group: req.blood_group.as_deref(),
        district: req.district.as_deref(),
        upazila: req.upazila.as_deref(),
    };
    let row = state
        .users
        .update_profile(&email, &changes)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(row.try_into()?))
}

/// `GET /users/admin/{email}`: unknown users are simply not admins.
pub async fn admin_status(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<AdminStatusResponse>, AppError> {
    let admin = has_role(&state, &email, Role::Admin).await?;
    Ok(Json(AdminStatusResponse { admin }))
}

pub async fn volunteer_status(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<VolunteerStatusResponse>, AppError> {
    let volunteer = has_role(&state, &email, Role::Volunteer).await?;
    Ok(Json(VolunteerStatusResponse { volunteer }))
}

async fn has_role(state: &AppState, email: &str, role: Role) -> Result<bool, AppError> {
    let principal = state.principals.find_principal(email).await.map_err(|e| {
        tracing::error!(email = %email, error = %e, "principal lookup failed");
        AppError::Internal
    })?;

    Ok(principal.is_some_and(|p| p.role == role))
}

pub async fn update_role(
    State(state): State<AppState>,
    Path(email): Path<String>,
    req: Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(req) = req?;

    let row = state
        .users
        .set_role(&email, req.role)
        .await?
        .ok_or(AppError::not_found("user"))?;
    state.principals.invalidate(&email).await;
    tracing::info!(email = %email, role = %req.role, "user role changed");

    Ok(Json(row.try_into()?))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(email): Path<String>,
    req: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(req) = req?;

    let row = state
        .users
        .set_status(&email, req.status.as_str())
        .await?
        .ok_or(AppError::not_found("user"))?;
    state.principals.invalidate(&email).await;
    tracing::info!(email = %email, status = %req.status, "user status changed");

    Ok(Json(row.try_into()?))
}
