/*
 * Responsibility
 * - Users の request/response DTO
 * - validation (形式チェック) 用の validate()
 */
use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{double_option, is_blood_group, is_email};
use crate::error::AppError;
use crate::repos::user_repo::UserRow;
use crate::services::auth::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Blocked,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "blocked" => Ok(UserStatus::Blocked),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub blood_group: Option<String>,
    pub district: Option<String>,
    pub upazila: Option<String>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !is_email(self.email.trim()) {
            return Err("email is invalid");
        }
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if let Some(url) = &self.avatar
            && url.len() > 512
        {
            return Err("avatar must be <= 512 chars");
        }
        if let Some(group) = &self.blood_group
            && !is_blood_group(group)
        {
            return Err("blood_group is invalid");
        }
        Ok(())
    }
}

/// `POST /users` の返却。既存ユーザーの場合は `inserted_id: null`
#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub inserted_id: Option<Uuid>,
}

impl CreateUserResponse {
    pub fn created(id: Uuid) -> Self {
        Self {
            message: None,
            inserted_id: Some(id),
        }
    }

    pub fn already_exists() -> Self {
        Self {
            message: Some("user already exists"),
            inserted_id: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    // Tri-state:
    // - None: field missing (do not update)
    // - Some(None): null (set NULL)
    // - Some(Some(v)): set value
    #[serde(default, deserialize_with = "double_option")]
    pub avatar: Option<Option<String>>,
    pub blood_group: Option<String>,
    pub district: Option<String>,
    pub upazila: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("name cannot be empty");
        }
        if let Some(Some(url)) = &self.avatar
            && url.len() > 512
        {
            return Err("avatar must be <= 512 chars");
        }
        if let Some(group) = &self.blood_group
            && !is_blood_group(group)
        {
            return Err("blood_group is invalid");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: UserStatus,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub blood_group: Option<String>,
    pub district: Option<String>,
    pub upazila: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserResponse {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        // CHECK 制約があるので、ここで失敗するのはデータ不整合
        let role = row.role.parse::<Role>().map_err(|e| {
            tracing::error!(email = %row.email, error = %e, "stored role is invalid");
            AppError::Internal
        })?;
        let status = row.status.parse::<UserStatus>().map_err(|_| {
            tracing::error!(email = %row.email, status = %row.status, "stored status is invalid");
            AppError::Internal
        })?;

        Ok(Self {
            id: row.id,
            email: row.email,
            name: row.name,
            avatar: row.avatar,
            blood_group: row.blood_group,
            district: row.district,
            upazila: row.upazila,
            role,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AdminStatusResponse {
    pub admin: bool,
}

#[derive(Debug, Serialize)]
pub struct VolunteerStatusResponse {
    pub volunteer: bool,
}
