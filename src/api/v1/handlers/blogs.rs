/*
 * Responsibility
 * - /blog 系 handler
 * - Path の {id} は公開 ID → PublicBlogId extractor で内部 ID に変換して受け取る
 * - public route は published のみ (draft は一覧にも詳細にも出さない)
 * - 作成/公開状態の変更/削除/draft を含む一覧は admin route group (guard 側で確認済み)
 */
use axum::{
    Json,
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::{
            blogs::{BlogResponse, BlogStatus, CreateBlogRequest, UpdateBlogStatusRequest},
            common::ListQuery,
        },
        extractors::{AuthClaims, public_id::PublicBlogId},
    },
    error::AppError,
    repos::blog_repo::{self, BlogRow},
    state::AppState,
};

fn row_to_response(state: &AppState, row: BlogRow) -> Result<BlogResponse, AppError> {
    Ok(BlogResponse {
        id: state.id_codec.encode(row.id)?,
        title: row.title,
        thumbnail: row.thumbnail,
        content: row.content,
        status: row.status,
        author_email: row.author_email,
        created_at: row.created_at,
    })
}

/// Anonymous readers only ever see published posts.
fn public_status(requested: Option<BlogStatus>) -> Result<BlogStatus, AppError> {
    match requested {
        None | Some(BlogStatus::Published) => Ok(BlogStatus::Published),
        Some(BlogStatus::Draft) => Err(AppError::invalid("drafts are not publicly listed")),
    }
}

async fn list_with_status(
    state: &AppState,
    status: Option<BlogStatus>,
    query: &ListQuery<BlogStatus>,
) -> Result<Json<Vec<BlogResponse>>, AppError> {
    let (limit, offset) = query.limit_offset();

    let rows = blog_repo::list(&state.db, status.map(|s| s.as_str()), limit, offset).await?;
    let res = rows
        .into_iter()
        .map(|row| row_to_response(state, row))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(res))
}

pub async fn list_blogs(
    State(state): State<AppState>,
    query: Result<Query<ListQuery<BlogStatus>>, QueryRejection>,
) -> Result<Json<Vec<BlogResponse>>, AppError> {
    let Query(query) = query?;
    let status = public_status(query.status)?;
    list_with_status(&state, Some(status), &query).await
}

/// Admin listing: drafts included, `?status=` filters.
pub async fn list_all_blogs(
    State(state): State<AppState>,
    query: Result<Query<ListQuery<BlogStatus>>, QueryRejection>,
) -> Result<Json<Vec<BlogResponse>>, AppError> {
    let Query(query) = query?;
    list_with_status(&state, query.status, &query).await
}

pub async fn get_blog(
    State(state): State<AppState>,
    blog_id: PublicBlogId,
) -> Result<Json<BlogResponse>, AppError> {
    // drafts answer 404 like missing posts
    let row = blog_repo::get(&state.db, blog_id.id)
        .await?
        .filter(|row| row.status == BlogStatus::Published.as_str())
        .ok_or(AppError::not_found("blog"))?;

    Ok(Json(row_to_response(&state, row)?))
}

pub async fn create_blog(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    req: Result<Json<CreateBlogRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BlogResponse>), AppError> {
    let Json(req) = req?;
    req.validate().map_err(AppError::invalid)?;

    let row = blog_repo::create(
        &state.db,
        req.title.trim(),
        req.thumbnail.as_deref(),
        &req.content,
        &claims.email,
    )
    .await?;
    tracing::info!(blog_id = row.id, author = %claims.email, "blog created");

    Ok((StatusCode::CREATED, Json(row_to_response(&state, row)?)))
}

pub async fn update_blog_status(
    State(state): State<AppState>,
    blog_id: PublicBlogId,
    req: Result<Json<UpdateBlogStatusRequest>, JsonRejection>,
) -> Result<Json<BlogResponse>, AppError> {
    let Json(req) = req?;

    let row = blog_repo::set_status(&state.db, blog_id.id, req.status.as_str())
        .await?
        .ok_or(AppError::not_found("blog"))?;

    Ok(Json(row_to_response(&state, row)?))
}

pub async fn delete_blog(
    State(state): State<AppState>,
    blog_id: PublicBlogId,
) -> Result<StatusCode, AppError> {
    if blog_repo::delete(&state.db, blog_id.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("blog"))
    }
}
