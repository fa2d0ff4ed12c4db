/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - route group ごとに guard (verified / self / admin / volunteer) を route_layer で適用して merge
 * - 同じ path でも method ごとに別 group に置ける (例: GET /blog は public, POST /blog は admin)
 * - 未登録 method の 405 は guard の外で返す (merge 後の fallback は guard 付きの側が残るため)
 */
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::api::v1::handlers::{auth, blogs, donation_requests, health, stats, users};
use crate::error::AppError;
use crate::middleware::guard::Guards;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let guards = Guards::from_state(state);

    let public = Router::new()
        .route("/", get(health::banner))
        .route("/health", get(health::health))
        .route("/jwt", post(auth::issue_token))
        .route("/logout", post(auth::logout))
        .route("/blog", get(blogs::list_blogs))
        .route("/blog/{id}", get(blogs::get_blog))
        .route("/users", post(users::create_user))
        .route("/donation-requests", get(donation_requests::list_pending));

    // token only; ownership of stored rows is checked inside the handlers
    let verified = guards.verified().apply(
        Router::new()
            .route(
                "/donation-requests",
                post(donation_requests::create_request),
            )
            .route(
                "/donation-requests/{id}",
                get(donation_requests::get_request)
                    .patch(donation_requests::update_request)
                    .delete(donation_requests::delete_request),
            )
            .route(
                "/donation-requests/{id}/donate",
                post(donation_requests::donate),
            ),
    );

    let own = guards.owner_of_path("email").apply(
        Router::new()
            .route(
                "/users/{email}",
                get(users::get_user).patch(users::update_profile),
            )
            .route("/users/admin/{email}", get(users::admin_status))
            .route("/users/volunteer/{email}", get(users::volunteer_status))
            .route(
                "/my-donation-requests/{email}",
                get(donation_requests::my_requests),
            ),
    );

    let own_by_query = guards.owner_of_query("email").apply(Router::new().route(
        "/my-donation-requests",
        get(donation_requests::my_requests_by_query),
    ));

    let admin = guards.admin().apply(
        Router::new()
            .route("/blog", post(blogs::create_blog))
            .route("/blog/{id}", delete(blogs::delete_blog))
            .route("/blog/{id}/status", patch(blogs::update_blog_status))
            .route("/admin/blogs", get(blogs::list_all_blogs))
            .route("/users", get(users::list_users))
            .route("/users/{email}/role", patch(users::update_role))
            .route("/users/{email}/status", patch(users::update_status))
            .route(
                "/admin/donation-requests",
                get(donation_requests::list_all),
            )
            .route(
                "/admin/donation-requests/{id}/status",
                patch(donation_requests::update_status),
            )
            .route("/admin-stats", get(stats::admin_stats)),
    );

    let volunteer = guards.volunteer().apply(
        Router::new()
            .route(
                "/volunteer/donation-requests",
                get(donation_requests::list_all),
            )
            .route(
                "/volunteer/donation-requests/{id}/status",
                patch(donation_requests::update_status),
            ),
    );

    Router::new()
        .merge(public)
        .merge(verified)
        .merge(own)
        .merge(own_by_query)
        .merge(admin)
        .merge(volunteer)
        .method_not_allowed_fallback(method_not_allowed)
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use std::time::Duration;

    use super::*;
    use crate::services::auth::testing::{MemoryCache, MemoryPrincipals, MemoryUsers};
    use crate::services::auth::{CachedPrincipalLookup, PrincipalLookup, Role, TokenIssuer};

    const SECRET: &[u8] = b"routes-test-secret";

    fn app(principals: MemoryPrincipals) -> (Router, AppState) {
        app_with(Arc::new(principals), MemoryUsers::new())
    }

    fn app_with(principals: Arc<dyn PrincipalLookup>, users: MemoryUsers) -> (Router, AppState) {
        let state = AppState::for_tests(principals, SECRET).with_users(Arc::new(users));
        let router = routes(&state).with_state(state.clone());
        (router, state)
    }

    fn donation_request(requester: &str) -> Value {
        json!({
            "requester_name": "Karim",
            "requester_email": requester,
            "recipient_name": "Rahim",
            "recipient_district": "Dhaka",
            "recipient_upazila": "Savar",
            "hospital_name": "Dhaka Medical",
            "full_address": "Road 1",
            "blood_group": "O+",
            "donation_date": "2026-11-01",
            "donation_time": "10:30"
        })
    }

    /// Role cache primed with `d@x.com`, behind an admin `a@x.com`.
    async fn cached_roles() -> (Arc<CachedPrincipalLookup<MemoryCache>>, MemoryCache) {
        let principals = MemoryPrincipals::new()
            .with("a@x.com", Role::Admin)
            .with("d@x.com", Role::Donor);
        let cache = MemoryCache::default();
        let lookup = Arc::new(CachedPrincipalLookup::new(
            Arc::new(principals),
            cache.clone(),
            Duration::from_secs(60),
        ));

        lookup.find_principal("d@x.com").await.unwrap();
        assert_eq!(cache.entry("role:d@x.com").as_deref(), Some("donor"));
        (lookup, cache)
    }

    fn bearer(email: &str) -> String {
        let token = TokenIssuer::new(SECRET, 3600).issue(email).unwrap();
        format!("Bearer {token}")
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, header::HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    #[tokio::test]
    async fn health_is_public() {
        let (app, _) = app(MemoryPrincipals::new());

        let (status, _, body) = call(&app, Method::GET, "/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn jwt_issues_verifiable_token_and_cookie() {
        let (app, state) = app(MemoryPrincipals::new());

        let (status, headers, body) = call(
            &app,
            Method::POST,
            "/jwt",
            None,
            Some(json!({"email": "d@x.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["expires_in"], 3600);
        let token = body["token"].as_str().unwrap();
        assert_eq!(state.verifier.decode(token).unwrap().email, "d@x.com");

        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with(&format!("token={token};")));
        assert!(cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn jwt_rejects_invalid_email() {
        let (app, _) = app(MemoryPrincipals::new());

        let (status, _, body) = call(
            &app,
            Method::POST,
            "/jwt",
            None,
            Some(json!({"email": "not-an-email"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn logout_expires_cookie() {
        let (app, _) = app(MemoryPrincipals::new());

        let (status, headers, body) = call(&app, Method::POST, "/logout", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn admin_routes_need_a_token() {
        let (app, _) = app(MemoryPrincipals::new());

        let (status, _, _) = call(&app, Method::GET, "/users", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn volunteer_cannot_list_users() {
        let (app, _) = app(MemoryPrincipals::new().with("v@x.com", Role::Volunteer));
        let auth = bearer("v@x.com");

        let (status, _, _) = call(&app, Method::GET, "/users", Some(&auth), None).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_cannot_use_volunteer_status_route() {
        let (app, state) = app(MemoryPrincipals::new().with("a@x.com", Role::Admin));
        let auth = bearer("a@x.com");
        let id = state.id_codec.encode(1).unwrap();

        let (status, _, _) = call(
            &app,
            Method::PATCH,
            &format!("/volunteer/donation-requests/{id}/status"),
            Some(&auth),
            Some(json!({"status": "done"})),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn role_probe_answers_only_for_self() {
        let (app, _) = app(MemoryPrincipals::new().with("a@x.com", Role::Admin));
        let auth = bearer("a@x.com");

        let (own, _, body) = call(&app, Method::GET, "/users/admin/a@x.com", Some(&auth), None).await;
        let (other, _, _) = call(&app, Method::GET, "/users/admin/b@x.com", Some(&auth), None).await;

        assert_eq!(own, StatusCode::OK);
        assert_eq!(body["admin"], true);
        assert_eq!(other, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_user_is_not_a_volunteer() {
        let (app, _) = app(MemoryPrincipals::new());
        let auth = bearer("d@x.com");

        let (status, _, body) = call(
            &app,
            Method::GET,
            "/users/volunteer/d@x.com",
            Some(&auth),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["volunteer"], false);
    }

    #[tokio::test]
    async fn malformed_public_id_is_400() {
        let (app, _) = app(MemoryPrincipals::new());

        let (status, _, body) = call(&app, Method::GET, "/blog/!!!", None, None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_PUBLIC_ID");
    }

    #[tokio::test]
    async fn request_on_behalf_of_someone_else_is_403() {
        let (app, _) = app(MemoryPrincipals::new());
        let auth = bearer("a@x.com");

        let (status, _, _) = call(
            &app,
            Method::POST,
            "/donation-requests",
            Some(&auth),
            Some(donation_request("b@x.com")),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn status_update_cannot_start_a_donation() {
        let (app, state) = app(MemoryPrincipals::new().with("a@x.com", Role::Admin));
        let auth = bearer("a@x.com");
        let id = state.id_codec.encode(1).unwrap();

        let (status, _, _) = call(
            &app,
            Method::PATCH,
            &format!("/admin/donation-requests/{id}/status"),
            Some(&auth),
            Some(json!({"status": "inprogress"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn public_blog_listing_refuses_drafts() {
        let (app, _) = app(MemoryPrincipals::new());

        let (status, _, body) = call(&app, Method::GET, "/blog?status=draft", None, None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn draft_listing_is_admin_only() {
        let (app, _) = app(MemoryPrincipals::new().with("d@x.com", Role::Donor));
        let auth = bearer("d@x.com");

        let (anonymous, _, _) = call(&app, Method::GET, "/admin/blogs", None, None).await;
        let (donor, _, _) = call(&app, Method::GET, "/admin/blogs", Some(&auth), None).await;

        assert_eq!(anonymous, StatusCode::UNAUTHORIZED);
        assert_eq!(donor, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unregistered_method_is_405_not_401() {
        let (app, _) = app(MemoryPrincipals::new());

        let (status, _, body) = call(&app, Method::PUT, "/blog/abc", None, None).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"]["code"], "METHOD_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn blocked_user_cannot_create_a_request() {
        let users = MemoryUsers::new().with("b@x.com", Role::Donor, "blocked");
        let (app, _) = app_with(Arc::new(MemoryPrincipals::new()), users);
        let auth = bearer("b@x.com");

        let (status, _, _) = call(
            &app,
            Method::POST,
            "/donation-requests",
            Some(&auth),
            Some(donation_request("b@x.com")),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unregistered_user_cannot_create_a_request() {
        let (app, _) = app(MemoryPrincipals::new());
        let auth = bearer("new@x.com");

        let (status, _, _) = call(
            &app,
            Method::POST,
            "/donation-requests",
            Some(&auth),
            Some(donation_request("new@x.com")),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn blocked_user_cannot_donate() {
        let users = MemoryUsers::new().with("b@x.com", Role::Donor, "blocked");
        let (app, state) = app_with(Arc::new(MemoryPrincipals::new()), users);
        let auth = bearer("b@x.com");
        let id = state.id_codec.encode(1).unwrap();

        let (status, _, _) = call(
            &app,
            Method::POST,
            &format!("/donation-requests/{id}/donate"),
            Some(&auth),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn role_change_drops_the_cached_role() {
        let (lookup, cache) = cached_roles().await;
        let users = MemoryUsers::new()
            .with("a@x.com", Role::Admin, "active")
            .with("d@x.com", Role::Donor, "active");
        let (app, _) = app_with(lookup, users.clone());
        let auth = bearer("a@x.com");

        let (status, _, body) = call(
            &app,
            Method::PATCH,
            "/users/d@x.com/role",
            Some(&auth),
            Some(json!({"role": "volunteer"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "volunteer");
        assert_eq!(users.row("d@x.com").unwrap().role, "volunteer");
        assert_eq!(cache.entry("role:d@x.com"), None);
    }

    #[tokio::test]
    async fn status_change_drops_the_cached_role() {
        let (lookup, cache) = cached_roles().await;
        let users = MemoryUsers::new()
            .with("a@x.com", Role::Admin, "active")
            .with("d@x.com", Role::Donor, "active");
        let (app, _) = app_with(lookup, users.clone());
        let auth = bearer("a@x.com");

        let (status, _, _) = call(
            &app,
            Method::PATCH,
            "/users/d@x.com/status",
            Some(&auth),
            Some(json!({"status": "blocked"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(users.row("d@x.com").unwrap().status, "blocked");
        assert_eq!(cache.entry("role:d@x.com"), None);
    }

    #[tokio::test]
    async fn requester_listing_by_query_is_self_only() {
        let (app, _) = app(MemoryPrincipals::new());
        let auth = bearer("a@x.com");

        let (status, _, _) = call(
            &app,
            Method::GET,
            "/my-donation-requests?email=b@x.com",
            Some(&auth),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
