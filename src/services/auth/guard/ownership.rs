use async_trait::async_trait;

use super::{DenyReason, Guard, GuardContext, GuardOutcome};
use crate::services::auth::claims::Claims;

/// Allow only when `target` is the caller's own email.
pub fn require_self(claims: &Claims, target: &str) -> GuardOutcome {
    if claims.email == target {
        GuardOutcome::Allow
    } else {
        GuardOutcome::Deny(DenyReason::NotOwner)
    }
}

#[derive(Debug, Clone, Copy)]
enum IdentitySource {
    Path(&'static str),
    Query(&'static str),
}

/// Route-level ownership check reading the target identity from the request.
#[derive(Debug, Clone, Copy)]
pub struct RequireSelf {
    source: IdentitySource,
}

impl RequireSelf {
    pub fn path(param: &'static str) -> Self {
        Self {
            source: IdentitySource::Path(param),
        }
    }

    pub fn query(param: &'static str) -> Self {
        Self {
            source: IdentitySource::Query(param),
        }
    }
}

#[async_trait]
impl Guard for RequireSelf {
    fn name(&self) -> &'static str {
        "require_self"
    }

    async fn check(&self, ctx: &GuardContext<'_>) -> GuardOutcome {
        let (found, name) = match self.source {
            IdentitySource::Path(name) => (ctx.path.get(name), name),
            IdentitySource::Query(name) => (ctx.query.get(name), name),
        };

        match found {
            Some(target) => require_self(ctx.claims, target),
            None => GuardOutcome::Deny(DenyReason::MissingIdentity(name)),
        }
    }
}
