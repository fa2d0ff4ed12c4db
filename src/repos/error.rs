/*
 * Responsibility
 * - repo が上位に伝える失敗の意味 (Db / Conflict)
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Db(#[source] sqlx::Error),
    /// Unique constraint hit (e.g. a second registration for the same email).
    #[error("conflict")]
    Conflict,
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::Conflict,
            _ => RepoError::Db(e),
        }
    }
}
