//! Principal lookup capability injected into the role gate.
//!
//! - `UserRepo` implements it directly (fresh read on every request)
//! - `CachedPrincipalLookup` wraps any lookup with a bounded-TTL role cache
use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::role::{Principal, Role};
use crate::services::cache::CacheStore;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("user store error")]
    Store(#[from] RepoError),
    #[error("unknown role stored for principal: {0}")]
    UnknownRole(String),
}

#[async_trait]
pub trait PrincipalLookup: Send + Sync {
    /// `Ok(None)` means no user record with this email.
    async fn find_principal(&self, email: &str) -> Result<Option<Principal>, LookupError>;

    /// Drop anything remembered about `email`. Called after role/status changes.
    async fn invalidate(&self, _email: &str) {}
}

/// Role cache in front of another lookup.
///
/// - Only hits are cached; unknown emails are always re-read
/// - Role changes become visible after at most `ttl` (or immediately when invalidated)
/// - Cache failures fall through to the inner lookup, which stays authoritative
pub struct CachedPrincipalLookup<C: CacheStore> {
    inner: Arc<dyn PrincipalLookup>,
    cache: C,
    ttl: Duration,
    prefix: String,
}

impl<C: CacheStore> CachedPrincipalLookup<C> {
    pub fn new(inner: Arc<dyn PrincipalLookup>, cache: C, ttl: Duration) -> Self {
        Self {
            inner,
            cache,
            ttl,
            prefix: "role".to_string(),
        }
    }

    pub fn key(&self, email: &str) -> String {
        format!("{}:{}", self.prefix, email)
    }
}

#[async_trait]
impl<C: CacheStore> PrincipalLookup for CachedPrincipalLookup<C> {
    async fn find_principal(&self, email: &str) -> Result<Option<Principal>, LookupError> {
        let key = self.key(email);

        match self.cache.get(&key).await {
            Ok(Some(cached)) => match cached.parse::<Role>() {
                Ok(role) => return Ok(Some(Principal::new(email, role))),
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "discarding unparsable cached role");
                }
            },
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(
                    backend = self.cache.backend(),
                    error = %err,
                    "role cache read failed, falling back to user store"
                );
            }
        }

        let found = self.inner.find_principal(email).await?;

        if let Some(principal) = &found
            && let Err(err) = self
                .cache
                .put(&key, principal.role.as_str(), self.ttl)
                .await
        {
            tracing::warn!(
                backend = self.cache.backend(),
                error = %err,
                "role cache write failed"
            );
        }

        Ok(found)
    }

    async fn invalidate(&self, email: &str) {
        self.inner.invalidate(email).await;

        if let Err(err) = self.cache.remove(&self.key(email)).await {
            tracing::warn!(
                backend = self.cache.backend(),
                error = %err,
                "role cache invalidation failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::testing::{MemoryCache, MemoryPrincipals};

    fn cached(
        principals: &MemoryPrincipals,
        cache: &MemoryCache,
    ) -> CachedPrincipalLookup<MemoryCache> {
        CachedPrincipalLookup::new(
            Arc::new(principals.clone()),
            cache.clone(),
            Duration::from_secs(30),
        )
    }

    #[tokio::test]
    async fn hit_is_served_from_cache() {
        let principals = MemoryPrincipals::new().with("a@x.com", Role::Admin);
        let cache = MemoryCache::default();
        let lookup = cached(&principals, &cache);

        let first = lookup.find_principal("a@x.com").await.unwrap();
        assert_eq!(first, Some(Principal::new("a@x.com", Role::Admin)));
        assert_eq!(cache.entry("role:a@x.com").as_deref(), Some("admin"));

        // store changes are hidden until the entry expires or is invalidated
        principals.set_role("a@x.com", Role::Donor);
        let second = lookup.find_principal("a@x.com").await.unwrap();
        assert_eq!(second.map(|p| p.role), Some(Role::Admin));
        assert_eq!(principals.lookups(), 1);
    }

    #[tokio::test]
    async fn cached_role_is_written_with_the_configured_ttl() {
        let principals = MemoryPrincipals::new().with("v@x.com", Role::Volunteer);
        let cache = MemoryCache::default();
        let lookup = CachedPrincipalLookup::new(
            Arc::new(principals.clone()),
            cache.clone(),
            Duration::from_secs(90),
        );

        lookup.find_principal("v@x.com").await.unwrap();

        assert_eq!(cache.ttl("role:v@x.com"), Some(Duration::from_secs(90)));
    }

    #[tokio::test]
    async fn invalidate_makes_role_change_visible() {
        let principals = MemoryPrincipals::new().with("a@x.com", Role::Admin);
        let cache = MemoryCache::default();
        let lookup = cached(&principals, &cache);

        lookup.find_principal("a@x.com").await.unwrap();
        principals.set_role("a@x.com", Role::Volunteer);
        lookup.invalidate("a@x.com").await;

        let after = lookup.find_principal("a@x.com").await.unwrap();
        assert_eq!(after.map(|p| p.role), Some(Role::Volunteer));
    }

    #[tokio::test]
    async fn unknown_email_is_not_cached() {
        let principals = MemoryPrincipals::new();
        let cache = MemoryCache::default();
        let lookup = cached(&principals, &cache);

        assert_eq!(lookup.find_principal("ghost@x.com").await.unwrap(), None);
        assert_eq!(cache.entry("role:ghost@x.com"), None);

        principals.set_role("ghost@x.com", Role::Donor);
        let later = lookup.find_principal("ghost@x.com").await.unwrap();
        assert_eq!(later.map(|p| p.role), Some(Role::Donor));
    }

    #[tokio::test]
    async fn broken_cache_falls_through_to_store() {
        let principals = MemoryPrincipals::new().with("v@x.com", Role::Volunteer);
        let cache = MemoryCache::failing();
        let lookup = cached(&principals, &cache);

        let found = lookup.find_principal("v@x.com").await.unwrap();
        assert_eq!(found.map(|p| p.role), Some(Role::Volunteer));
    }
}
