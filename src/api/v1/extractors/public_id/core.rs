/*
 * Responsibility
 *  - Path の唯一のパラメータを公開 ID として受け、IdCodec で内部 ID (i64) に戻す
 *  - 復号できない / 正規形でない ID は 400 INVALID_PUBLIC_ID
 */
use std::{fmt, marker::PhantomData};

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use super::types::Resource;
use crate::error::AppError;
use crate::state::AppState;

pub struct PublicId<R> {
    pub id: i64,
    resource: PhantomData<fn() -> R>,
}

impl<R: Resource> PublicId<R> {
    fn rejected(raw: &str, reason: &dyn fmt::Display) -> AppError {
        tracing::debug!(resource = R::NAME, public_id = %raw, reason = %reason, "public id rejected");
        AppError::bad_request("INVALID_PUBLIC_ID", format!("invalid {} id", R::NAME))
    }
}

impl<R: Resource> FromRequestParts<AppState> for PublicId<R> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| Self::rejected("", &e))?;

        let id = state
            .id_codec
            .decode(&raw)
            .map_err(|e| Self::rejected(&raw, &e))?;

        Ok(Self {
            id,
            resource: PhantomData,
        })
    }
}

impl<R: Resource> fmt::Debug for PublicId<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicId")
            .field("resource", &R::NAME)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{Router, body::Body, http::{Request, StatusCode}, routing::get};
    use tower::ServiceExt;

    use super::super::PublicBlogId;
    use crate::state::AppState;
    use crate::services::auth::testing::MemoryPrincipals;

    fn app() -> (Router, AppState) {
        let state = AppState::for_tests(Arc::new(MemoryPrincipals::new()), b"public-id-test");
        let app = Router::new()
            .route(
                "/blog/{id}",
                get(|blog: PublicBlogId| async move { blog.id.to_string() }),
            )
            .with_state(state.clone());
        (app, state)
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let res = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn canonical_id_decodes_to_internal_id() {
        let (app, state) = app();
        let public = state.id_codec.encode(42).unwrap();

        let (status, body) = get_body(app, &format!("/blog/{public}")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "42");
    }

    #[tokio::test]
    async fn undecodable_id_names_the_resource() {
        let (app, _) = app();

        let (status, body) = get_body(app, "/blog/42").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("INVALID_PUBLIC_ID"));
        assert!(body.contains("invalid blog id"));
    }
}
