/// Factory: build auth services from application `Config`.
use std::{sync::Arc, time::Duration};

use crate::config::Config;
use crate::services::auth::{
    CachedPrincipalLookup, PrincipalLookup, TokenIssuer, TokenVerifier,
};
use crate::services::cache::{CacheError, ValkeyStore};

pub fn build_token_verifier(config: &Config) -> Arc<TokenVerifier> {
    Arc::new(TokenVerifier::new(
        config.access_token_secret.as_bytes(),
        config.access_token_leeway_seconds,
    ))
}

pub fn build_token_issuer(config: &Config) -> Arc<TokenIssuer> {
    Arc::new(TokenIssuer::new(
        config.access_token_secret.as_bytes(),
        config.access_token_ttl_seconds,
    ))
}

/// Wrap the user store with the role cache when `VALKEY_URL` and a TTL are configured.
pub async fn build_principal_lookup(
    config: &Config,
    store: Arc<dyn PrincipalLookup>,
) -> Result<Arc<dyn PrincipalLookup>, CacheError> {
    let Some(url) = config.role_cache_url() else {
        tracing::info!("role cache disabled, roles are read from the user store on every request");
        return Ok(store);
    };

    let cache = ValkeyStore::connect(url).await?;

    tracing::info!(
        ttl_seconds = config.role_cache_ttl_seconds,
        "role cache enabled, role changes take effect within the ttl"
    );

    Ok(Arc::new(CachedPrincipalLookup::new(
        store,
        cache,
        Duration::from_secs(config.role_cache_ttl_seconds),
    )))
}
