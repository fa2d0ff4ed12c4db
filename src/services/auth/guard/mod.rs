/*!
 * Request authorization guards
 *
 * Responsibility:
 * - Guard の契約 (GuardContext → GuardOutcome)
 * - role gate / ownership check / pipeline composer
 * - 失敗の分類: Authentication (401) / Authorization (403) / Infrastructure (500)
 *
 * HTTP への結線は middleware::guard 側の責務
 */
use std::{collections::HashMap, fmt};

use async_trait::async_trait;
use thiserror::Error;

use crate::services::auth::claims::Claims;
use crate::services::auth::lookup::LookupError;
use crate::services::auth::role::Role;
use crate::services::auth::verifier::AuthnError;

mod ownership;
mod pipeline;
mod role_gate;

pub use ownership::{RequireSelf, require_self};
pub use pipeline::{Pipeline, compose};
pub use role_gate::RequireRole;

/// Why a guard refused the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    PrincipalNotFound,
    RoleMismatch { required: Role, actual: Role },
    NotOwner,
    MissingIdentity(&'static str),
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrincipalNotFound => write!(f, "principal not found"),
            Self::RoleMismatch { required, actual } => {
                write!(f, "role mismatch (required {}, actual {})", required, actual)
            }
            Self::NotOwner => write!(f, "identity does not match the caller"),
            Self::MissingIdentity(name) => write!(f, "missing identity parameter '{}'", name),
        }
    }
}

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("principal lookup failed: {0}")]
    Lookup(#[from] LookupError),
}

#[derive(Debug)]
pub enum GuardOutcome {
    Allow,
    Deny(DenyReason),
    Error(GuardError),
}

#[cfg(test)]
impl GuardOutcome {
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            Self::Deny(reason) => Some(reason),
            _ => None,
        }
    }
}

impl GuardOutcome {
    pub fn into_result(self) -> Result<(), GuardFailure> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(GuardFailure::Authorization(reason)),
            Self::Error(err) => Err(GuardFailure::Infrastructure(err)),
        }
    }
}

/// Terminal failure of a guarded request.
#[derive(Debug, Error)]
pub enum GuardFailure {
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthnError),
    #[error("authorization refused: {0}")]
    Authorization(DenyReason),
    #[error("authorization infrastructure failure: {0}")]
    Infrastructure(GuardError),
}

/// What a guard gets to look at.
///
/// - `claims` are already verified
/// - `path` / `query` hold the matched route parameters and query string
#[derive(Debug, Clone, Copy)]
pub struct GuardContext<'a> {
    pub claims: &'a Claims,
    pub path: &'a HashMap<String, String>,
    pub query: &'a HashMap<String, String>,
}

impl<'a> GuardContext<'a> {
    pub fn new(
        claims: &'a Claims,
        path: &'a HashMap<String, String>,
        query: &'a HashMap<String, String>,
    ) -> Self {
        Self {
            claims,
            path,
            query,
        }
    }
}

#[async_trait]
pub trait Guard: Send + Sync {
    // For logs only
    fn name(&self) -> &'static str;

    async fn check(&self, ctx: &GuardContext<'_>) -> GuardOutcome;
}
