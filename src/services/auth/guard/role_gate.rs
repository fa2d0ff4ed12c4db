use std::sync::Arc;

use async_trait::async_trait;

use super::{DenyReason, Guard, GuardContext, GuardError, GuardOutcome};
use crate::services::auth::claims::Claims;
use crate::services::auth::lookup::PrincipalLookup;
use crate::services::auth::role::Role;

/// Confirm the caller's stored role is exactly `required`.
///
/// One read against the user store per call. An unknown email is a Deny
/// (generic 403), only a failing lookup is an Error.
pub async fn require_role(
    claims: &Claims,
    required: Role,
    lookup: &dyn PrincipalLookup,
) -> GuardOutcome {
    let principal = match lookup.find_principal(&claims.email).await {
        Ok(Some(principal)) => principal,
        Ok(None) => return GuardOutcome::Deny(DenyReason::PrincipalNotFound),
        Err(err) => return GuardOutcome::Error(GuardError::Lookup(err)),
    };

    if principal.role == required {
        GuardOutcome::Allow
    } else {
        GuardOutcome::Deny(DenyReason::RoleMismatch {
            required,
            actual: principal.role,
        })
    }
}

pub struct RequireRole {
    role: Role,
    lookup: Arc<dyn PrincipalLookup>,
}

impl RequireRole {
    pub fn new(role: Role, lookup: Arc<dyn PrincipalLookup>) -> Self {
        Self { role, lookup }
    }
}

#[async_trait]
impl Guard for RequireRole {
    fn name(&self) -> &'static str {
        match self.role {
            Role::Guest => "require_guest",
            Role::Donor => "require_donor",
            Role::Volunteer => "require_volunteer",
            Role::Admin => "require_admin",
        }
    }

    async fn check(&self, ctx: &GuardContext<'_>) -> GuardOutcome {
        require_role(ctx.claims, self.role, self.lookup.as_ref()).await
    }
}
