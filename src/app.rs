/*
 * Responsibility
 * - Config読み込み → 依存生成 (PgPool / IdCodec / auth services) → Router 組み立て
 * - Middleware の適用 (security headers / CORS / request id・trace・limit)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware::{cors, http, security_headers};
use crate::repos::user_repo::UserRepo;
use crate::services::auth::{
    PrincipalLookup, build_principal_lookup, build_token_issuer, build_token_verifier,
};
use crate::services::id_codec::IdCodec;
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG=info,blood_wave=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: fail fast so the panic is noticed
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(config = ?config, "starting blood wave api");

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to postgres")?;
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("failed to run migrations")?;

    let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)?;

    // Role gate reads straight from the user table unless the role cache is configured
    let store: Arc<dyn PrincipalLookup> = Arc::new(UserRepo::new(db.clone()));
    let principals = build_principal_lookup(config, store)
        .await
        .context("failed to connect role cache")?;

    Ok(AppState::new(
        db,
        id_codec,
        principals,
        build_token_verifier(config),
        build_token_issuer(config),
        config.app_env,
    ))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .merge(api::v1::routes(&state))
        .with_state(state);

    let router = security_headers::apply(router);
    let router = cors::apply(router, config);
    http::apply(router)
}
