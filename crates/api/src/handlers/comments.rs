//! Handlers for `/titles/{title_id}/reviews/{review_id}/comments`.
//!
//! The review must belong to the title in the path; otherwise every
//! operation answers 404.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use yamdb_core::error::CoreError;
use yamdb_core::permissions::{check_object, check_request, Action, Policy};
use yamdb_core::types::DbId;
use yamdb_core::validation::validate_not_blank;
use yamdb_db::models::comment::{Comment, CommentView};
use yamdb_db::repositories::CommentRepo;

use crate::error::AppResult;
use crate::handlers::reviews::find_review;
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::Page;
use crate::state::AppState;

const POLICY: Policy = Policy::AuthorStaffOrReadOnly;

/// Request body for comment create and update.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<CommentView>>> {
    let review = find_review(&state, title_id, review_id).await?;
    let page = params.request(state.config.page_size);
    let (comments, count) = CommentRepo::list(&state.pool, review.id, page).await?;
    Ok(Json(Page::new(comments, count, page)))
}

/// POST /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn create_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
    Json(input): Json<CommentRequest>,
) -> AppResult<(StatusCode, Json<CommentView>)> {
    check_request(POLICY, Some(&user.actor()), Action::Create)?;
    validate_not_blank("text", &input.text)?;
    let review = find_review(&state, title_id, review_id).await?;

    let comment = CommentRepo::create(&state.pool, review.id, user.user_id, &input.text).await?;

    tracing::info!(comment_id = comment.id, review_id, author_id = user.user_id, "Comment created");

    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn get_comment(
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<Json<CommentView>> {
    let comment = find_comment(&state, title_id, review_id, comment_id).await?;
    Ok(Json(load_view(&state, comment.id).await?))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn update_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(DbId, DbId, DbId)>,
    Json(input): Json<CommentRequest>,
) -> AppResult<Json<CommentView>> {
    let comment = find_comment(&state, title_id, review_id, comment_id).await?;
    check_object(POLICY, Some(&user.actor()), Action::Update, comment.author_id)?;
    validate_not_blank("text", &input.text)?;

    if !CommentRepo::update_text(&state.pool, comment.id, &input.text).await? {
        return Err(CoreError::not_found("Comment", comment_id).into());
    }

    tracing::info!(comment_id, updated_by = user.user_id, "Comment updated");

    Ok(Json(load_view(&state, comment.id).await?))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn delete_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    let comment = find_comment(&state, title_id, review_id, comment_id).await?;
    check_object(POLICY, Some(&user.actor()), Action::Delete, comment.author_id)?;

    if !CommentRepo::delete(&state.pool, comment.id).await? {
        return Err(CoreError::not_found("Comment", comment_id).into());
    }

    tracing::info!(comment_id, deleted_by = user.user_id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn find_comment(
    state: &AppState,
    title_id: DbId,
    review_id: DbId,
    comment_id: DbId,
) -> AppResult<Comment> {
    let review = find_review(state, title_id, review_id).await?;
    Ok(CommentRepo::find(&state.pool, review.id, comment_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", comment_id))?)
}

async fn load_view(state: &AppState, comment_id: DbId) -> AppResult<CommentView> {
    Ok(CommentRepo::find_view(&state.pool, comment_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", comment_id))?)
}
