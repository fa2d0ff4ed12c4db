/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - db: PgPool, users: UserStore (UserRepo), principals: 認可用 lookup, token verifier/issuer など
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppEnv;
use crate::repos::user_repo::{UserRepo, UserStore};
use crate::services::auth::{PrincipalLookup, TokenIssuer, TokenVerifier};
use crate::services::id_codec::IdCodec;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub users: Arc<dyn UserStore>,
    pub id_codec: IdCodec,
    // Role gate reads through this (UserRepo, optionally behind the role cache)
    pub principals: Arc<dyn PrincipalLookup>,
    pub verifier: Arc<TokenVerifier>,
    pub issuer: Arc<TokenIssuer>,
    pub app_env: AppEnv,
}

impl AppState {
    pub fn new(
        db: PgPool,
        id_codec: IdCodec,
        principals: Arc<dyn PrincipalLookup>,
        verifier: Arc<TokenVerifier>,
        issuer: Arc<TokenIssuer>,
        app_env: AppEnv,
    ) -> Self {
        Self {
            users: Arc::new(UserRepo::new(db.clone())),
            db,
            id_codec,
            principals,
            verifier,
            issuer,
            app_env,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State whose pool never connects; only for routes that stop before the database.
    pub fn for_tests(principals: Arc<dyn PrincipalLookup>, secret: &[u8]) -> Self {
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let id_codec = IdCodec::new(10, "abcdefghijklmnopqrstuvwxyz0123456789").unwrap();

        Self::new(
            db,
            id_codec,
            principals,
            Arc::new(TokenVerifier::new(secret, 0)),
            Arc::new(TokenIssuer::new(secret, 3600)),
            AppEnv::Development,
        )
    }

    pub fn with_users(mut self, users: Arc<dyn UserStore>) -> Self {
        self.users = users;
        self
    }
}
