//! In-memory doubles for the user store and the cache (tests only).
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::repos::user_repo::{NewUser, ProfileChanges, UserRow, UserStore};
use crate::services::auth::lookup::{LookupError, PrincipalLookup};
use crate::services::auth::role::{Principal, Role};
use crate::services::cache::{CacheError, CacheStore};

#[derive(Clone, Default)]
pub struct MemoryPrincipals {
    roles: Arc<Mutex<HashMap<String, Role>>>,
    lookups: Arc<AtomicUsize>,
    broken: bool,
}

impl MemoryPrincipals {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every lookup fails with an unknown stored role.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn with(self, email: &str, role: Role) -> Self {
        self.set_role(email, role);
        self
    }

    pub fn set_role(&self, email: &str, role: Role) {
        self.roles.lock().unwrap().insert(email.to_string(), role);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PrincipalLookup for MemoryPrincipals {
    async fn find_principal(&self, email: &str) -> Result<Option<Principal>, LookupError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(LookupError::UnknownRole("corrupted".to_string()));
        }
        let role = self.roles.lock().unwrap().get(email).copied();
        Ok(role.map(|role| Principal::new(email, role)))
    }
}

#[derive(Clone, Default)]
pub struct MemoryCache {
    // value and the ttl it was written with
    entries: Arc<Mutex<HashMap<String, (String, Duration)>>>,
    failing: bool,
}

impl MemoryCache {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn entry(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone())
    }

    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.failing {
            return Err(CacheError::Connect("cache is down".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check()?;
        Ok(self.entry(key))
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.check()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), ttl));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        self.check()?;
        Ok(self.entries.lock().unwrap().remove(key).is_some())
    }
}

/// User table keyed by email.
#[derive(Clone, Default)]
pub struct MemoryUsers {
    rows: Arc<Mutex<HashMap<String, UserRow>>>,
}

impl MemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, email: &str, role: Role, status: &str) -> Self {
        let row = UserRow {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: email.split('@').next().unwrap_or(email).to_string(),
            avatar: None,
            blood_group: Some("O+".to_string()),
            district: None,
            upazila: None,
            role: role.as_str().to_string(),
            status: status.to_string(),
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().insert(email.to_string(), row);
        self
    }

    pub fn row(&self, email: &str) -> Option<UserRow> {
        self.rows.lock().unwrap().get(email).cloned()
    }

    fn update(&self, email: &str, f: impl FnOnce(&mut UserRow)) -> Option<UserRow> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(email)?;
        f(row);
        Some(row.clone())
    }
}

#[async_trait]
impl UserStore for MemoryUsers {
    async fn create(&self, user: &NewUser<'_>) -> Result<UserRow, RepoError> {
        if self.row(user.email).is_some() {
            return Err(RepoError::Conflict);
        }
        let created = self.clone().with(user.email, Role::Donor, "active");
        let mut row = created.row(user.email).ok_or(RepoError::Conflict)?;
        row.name = user.name.to_string();
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, RepoError> {
        Ok(self.row(email))
    }

    async fn list(
        &self,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserRow>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|row| status.is_none_or(|s| row.status == s))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn update_profile(
        &self,
        email: &str,
        changes: &ProfileChanges<'_>,
    ) -> Result<Option<UserRow>, RepoError> {
        Ok(self.update(email, |row| {
            if let Some(name) = changes.name {
                row.name = name.to_string();
            }
            if let Some(avatar) = changes.avatar {
                row.avatar = avatar.map(str::to_string);
            }
        }))
    }

    async fn set_role(&self, email: &str, role: Role) -> Result<Option<UserRow>, RepoError> {
        Ok(self.update(email, |row| row.role = role.as_str().to_string()))
    }

    async fn set_status(&self, email: &str, status: &str) -> Result<Option<UserRow>, RepoError> {
        Ok(self.update(email, |row| row.status = status.to_string()))
    }

    async fn count(&self) -> Result<i64, RepoError> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }
}
