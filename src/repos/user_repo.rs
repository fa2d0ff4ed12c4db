/*
 * Responsibility
 * - users テーブル向け SQLx 操作
 * - PgPool を受け取り CRUD を提供 (UserStore 実装、handler は trait 越しに使う)
 * - PrincipalLookup 実装 (role gate が email → role を毎回読む)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::services::auth::{LookupError, Principal, PrincipalLookup, Role};

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub blood_group: Option<String>,
    pub district: Option<String>,
    pub upazila: Option<String>,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub avatar: Option<&'a str>,
    pub blood_group: Option<&'a str>,
    pub district: Option<&'a str>,
    pub upazila: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct ProfileChanges<'a> {
    pub name: Option<&'a str>,
    // Tri-state:
    // - None: do not update
    // - Some(None): set NULL
    // - Some(Some(v)): set v
    pub avatar: Option<Option<&'a str>>,
    pub blood_group: Option<&'a str>,
    pub district: Option<&'a str>,
    pub upazila: Option<&'a str>,
}

const USER_COLUMNS: &str = r#"
    id, email, name, avatar, blood_group, district, upazila, role, status, created_at
"#;

#[derive(Clone, Debug)]
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// User table operations the handlers depend on.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// New users start as `donor` / `active`. Duplicate email → `RepoError::Conflict`.
    async fn create(&self, user: &NewUser<'_>) -> Result<UserRow, RepoError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, RepoError>;
    async fn list(
        &self,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserRow>, RepoError>;
    async fn update_profile(
        &self,
        email: &str,
        changes: &ProfileChanges<'_>,
    ) -> Result<Option<UserRow>, RepoError>;
    async fn set_role(&self, email: &str, role: Role) -> Result<Option<UserRow>, RepoError>;
    async fn set_status(&self, email: &str, status: &str) -> Result<Option<UserRow>, RepoError>;
    async fn count(&self) -> Result<i64, RepoError>;
}

#[async_trait]
impl UserStore for UserRepo {
    async fn create(&self, user: &NewUser<'_>) -> Result<UserRow, RepoError> {
        let sql = format!(
            r#"
            INSERT INTO users (email, name, avatar, blood_group, district, upazila, role, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'donor', 'active')
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.email)
            .bind(user.name)
            .bind(user.avatar)
            .bind(user.blood_group)
            .bind(user.district)
            .bind(user.upazila)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn list(
        &self,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserRow>, RepoError> {
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn update_profile(
        &self,
        email: &str,
        changes: &ProfileChanges<'_>,
    ) -> Result<Option<UserRow>, RepoError> {
        let sql = format!(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                avatar = CASE
                    WHEN $3 = false THEN avatar
                    ELSE $4
                END,
                blood_group = COALESCE($5, blood_group),
                district = COALESCE($6, district),
                upazila = COALESCE($7, upazila)
            WHERE email = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .bind(changes.name)
            .bind(changes.avatar.is_some()) // $3: flag to set avatar
            .bind(changes.avatar.flatten()) // $4: new avatar value
            .bind(changes.blood_group)
            .bind(changes.district)
            .bind(changes.upazila)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn set_role(&self, email: &str, role: Role) -> Result<Option<UserRow>, RepoError> {
        let sql = format!("UPDATE users SET role = $2 WHERE email = $1 RETURNING {USER_COLUMNS}");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn set_status(&self, email: &str, status: &str) -> Result<Option<UserRow>, RepoError> {
        let sql =
            format!("UPDATE users SET status = $2 WHERE email = $1 RETURNING {USER_COLUMNS}");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn count(&self) -> Result<i64, RepoError> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(n)
    }
}

#[async_trait]
impl PrincipalLookup for UserRepo {
    async fn find_principal(&self, email: &str) -> Result<Option<Principal>, LookupError> {
        let role = sqlx::query_scalar::<_, String>("SELECT role FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepoError::from)?;

        match role {
            Some(role) => {
                let role = role
                    .parse::<Role>()
                    .map_err(|e| LookupError::UnknownRole(e.0))?;
                Ok(Some(Principal::new(email, role)))
            }
            None => Ok(None),
        }
    }
}
