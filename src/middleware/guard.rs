//! Route guards: token verification → guard pipeline → Claims を extensions に入れる
//!
//! Responsibility:
//! - `Authorization: Bearer <jwt>` の検証 (401)
//! - route group ごとの guard pipeline (role gate / ownership) の評価 (403 / 500)
//! - 全 guard が Allow の時だけ next handler を 1 回だけ呼ぶ
//!
//! 使い方：
//! ```ignore
//! let guards = Guards::from_state(&state);
//! let admin = guards.admin().apply(Router::new().route("/users", get(list_users)));
//! ```

use std::{collections::HashMap, sync::Arc};

use axum::{
    Router,
    body::Body,
    extract::{
        Query, RawPathParams, State,
        rejection::{QueryRejection, RawPathParamsRejection},
    },
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::{
    Claims, PrincipalLookup, Role, TokenVerifier,
    guard::{Guard, GuardContext, GuardFailure, Pipeline, RequireRole, RequireSelf, compose},
    verifier::AuthnError,
};
use crate::state::AppState;

/// Credential verifier + guard pipeline for one route group.
#[derive(Clone)]
pub struct RouteGuard {
    verifier: Arc<TokenVerifier>,
    pipeline: Pipeline,
}

impl RouteGuard {
    pub fn new(verifier: Arc<TokenVerifier>, pipeline: Pipeline) -> Self {
        Self { verifier, pipeline }
    }

    /// Verify the `Authorization` header only.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, AuthnError> {
        let raw = headers
            .get(header::AUTHORIZATION)
            .map(|v| v.to_str().map_err(|_| AuthnError::MalformedToken))
            .transpose()?;

        self.verifier.verify(raw)
    }

    /// Guard every route of `router` (route_layer: unmatched paths still 404).
    pub fn apply(self, router: Router<AppState>) -> Router<AppState> {
        tracing::debug!(guards = ?self.pipeline.names(), "route group guarded");
        router.route_layer(middleware::from_fn_with_state(self, guard_middleware))
    }
}

/// Builds the route guards used by the API from injected dependencies.
#[derive(Clone)]
pub struct Guards {
    verifier: Arc<TokenVerifier>,
    principals: Arc<dyn PrincipalLookup>,
}

impl Guards {
    pub fn new(verifier: Arc<TokenVerifier>, principals: Arc<dyn PrincipalLookup>) -> Self {
        Self {
            verifier,
            principals,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.verifier.clone(), state.principals.clone())
    }

    fn guarded(&self, guards: Vec<Arc<dyn Guard>>) -> RouteGuard {
        RouteGuard::new(self.verifier.clone(), compose(guards))
    }

    /// Valid token only.
    pub fn verified(&self) -> RouteGuard {
        self.guarded(Vec::new())
    }

    /// Valid token + exact stored role.
    pub fn role(&self, role: Role) -> RouteGuard {
        let gate = RequireRole::new(role, self.principals.clone());
        self.guarded(vec![Arc::new(gate) as Arc<dyn Guard>])
    }

    pub fn admin(&self) -> RouteGuard {
        self.role(Role::Admin)
    }

    pub fn volunteer(&self) -> RouteGuard {
        self.role(Role::Volunteer)
    }

    /// Valid token + path parameter `param` must be the caller's email.
    pub fn owner_of_path(&self, param: &'static str) -> RouteGuard {
        self.guarded(vec![Arc::new(RequireSelf::path(param)) as Arc<dyn Guard>])
    }

    /// Valid token + query parameter `param` must be the caller's email.
    pub fn owner_of_query(&self, param: &'static str) -> RouteGuard {
        self.guarded(vec![Arc::new(RequireSelf::query(param)) as Arc<dyn Guard>])
    }
}

async fn guard_middleware(
    State(guard): State<RouteGuard>,
    path: Result<RawPathParams, RawPathParamsRejection>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let path: HashMap<String, String> = path
        .map(|params| {
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .unwrap_or_default();
    let query = query.map(|Query(q)| q).unwrap_or_default();

    let claims = guard
        .authenticate(req.headers())
        .map_err(GuardFailure::from)?;
    let ctx = GuardContext::new(&claims, &path, &query);

    let res = guard
        .pipeline
        .run(&ctx, || {
            // middleware → extractor への受け渡し
            req.extensions_mut().insert(claims.clone());
            next.run(req)
        })
        .await?;

    Ok(res)
}
