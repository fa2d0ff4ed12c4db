use std::{future::Future, sync::Arc};

use super::{Guard, GuardContext, GuardFailure, GuardOutcome};

/// Ordered guard sequence for one route group.
///
/// Guards run strictly in order and the first Deny/Error stops the chain.
/// Holds no per-request state, so a pipeline can be shared across requests.
#[derive(Clone, Default)]
pub struct Pipeline {
    guards: Vec<Arc<dyn Guard>>,
}

pub fn compose(guards: Vec<Arc<dyn Guard>>) -> Pipeline {
    Pipeline { guards }
}

impl Pipeline {
    pub fn names(&self) -> Vec<&'static str> {
        self.guards.iter().map(|g| g.name()).collect()
    }

    pub async fn evaluate(&self, ctx: &GuardContext<'_>) -> GuardOutcome {
        for guard in &self.guards {
            match guard.check(ctx).await {
                GuardOutcome::Allow => continue,
                GuardOutcome::Deny(reason) => {
                    tracing::debug!(guard = guard.name(), reason = %reason, "guard denied");
                    return GuardOutcome::Deny(reason);
                }
                GuardOutcome::Error(err) => {
                    tracing::debug!(guard = guard.name(), error = %err, "guard failed");
                    return GuardOutcome::Error(err);
                }
            }
        }
        GuardOutcome::Allow
    }

    /// Evaluate, then call `handler` exactly once if every guard allowed.
    pub async fn run<F, Fut, T>(&self, ctx: &GuardContext<'_>, handler: F) -> Result<T, GuardFailure>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.evaluate(ctx).await.into_result()?;
        Ok(handler().await)
    }
}
