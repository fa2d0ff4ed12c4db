/*
 * Responsibility
 * - blogs CRUD
 * - id は内部 ID (bigserial)、公開時は id_codec で encode する
 */
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BlogRow {
    pub id: i64,
    pub title: String,
    pub thumbnail: Option<String>,
    pub content: String,
    pub status: String,
    pub author_email: String,
    pub created_at: DateTime<Utc>,
}

pub async fn list(
    pool: &PgPool,
    status: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<BlogRow>, RepoError> {
    let rows = sqlx::query_as::<_, BlogRow>(
        r#"
        SELECT id, title, thumbnail, content, status, author_email, created_at
        FROM blogs
        WHERE ($1::text IS NULL OR status = $1)
        ORDER BY id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<BlogRow>, RepoError> {
    let row = sqlx::query_as::<_, BlogRow>(
        r#"
        SELECT id, title, thumbnail, content, status, author_email, created_at
        FROM blogs
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn create(
    pool: &PgPool,
    title: &str,
    thumbnail: Option<&str>,
    content: &str,
    author_email: &str,
) -> Result<BlogRow, RepoError> {
    // new posts are drafts until an admin publishes them
    let row = sqlx::query_as::<_, BlogRow>(
        r#"
        INSERT INTO blogs (title, thumbnail, content, status, author_email)
        VALUES ($1, $2, $3, 'draft', $4)
        RETURNING id, title, thumbnail, content, status, author_email, created_at
        "#,
    )
    .bind(title)
    .bind(thumbnail)
    .bind(content)
    .bind(author_email)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn set_status(pool: &PgPool, id: i64, status: &str) -> Result<Option<BlogRow>, RepoError> {
    let row = sqlx::query_as::<_, BlogRow>(
        r#"
        UPDATE blogs
        SET status = $2
        WHERE id = $1
        RETURNING id, title, thumbnail, content, status, author_email, created_at
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count(pool: &PgPool) -> Result<i64, RepoError> {
    let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM blogs")
        .fetch_one(pool)
        .await?;

    Ok(n)
}
