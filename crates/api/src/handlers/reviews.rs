//! Handlers for `/titles/{title_id}/reviews`.
//!
//! Anyone may read. Any authenticated user may post one review per title;
//! the author, moderators and admins may edit or delete it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use yamdb_core::error::CoreError;
use yamdb_core::permissions::{check_object, check_request, Action, Policy};
use yamdb_core::types::DbId;
use yamdb_core::validation::{validate_not_blank, validate_score};
use yamdb_db::models::review::{Review, ReviewView};
use yamdb_db::repositories::{ReviewRepo, TitleRepo};

use crate::error::{violated_unique_constraint, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::Page;
use crate::state::AppState;

const POLICY: Policy = Policy::AuthorStaffOrReadOnly;

/// Request body for `POST /titles/{title_id}/reviews`.
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub text: String,
    pub score: i32,
}

/// Request body for `PATCH /titles/{title_id}/reviews/{review_id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReviewRequest {
    pub text: Option<String>,
    pub score: Option<i32>,
}

/// GET /api/v1/titles/{title_id}/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(title_id): Path<DbId>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<ReviewView>>> {
    ensure_title(&state, title_id).await?;
    let page = params.request(state.config.page_size);
    let (reviews, count) = ReviewRepo::list(&state.pool, title_id, page).await?;
    Ok(Json(Page::new(reviews, count, page)))
}

/// POST /api/v1/titles/{title_id}/reviews
pub async fn create_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path(title_id): Path<DbId>,
    Json(input): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<ReviewView>)> {
    check_request(POLICY, Some(&user.actor()), Action::Create)?;
    validate_not_blank("text", &input.text)?;
    validate_score(input.score)?;
    ensure_title(&state, title_id).await?;

    if ReviewRepo::exists_for_author(&state.pool, title_id, user.user_id).await? {
        return Err(already_reviewed());
    }

    let review = ReviewRepo::create(&state.pool, title_id, user.user_id, &input.text, input.score)
        .await
        .map_err(duplicate_review_error)?;

    tracing::info!(review_id = review.id, title_id, author_id = user.user_id, "Review created");

    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn get_review(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<ReviewView>> {
    let review = find_review(&state, title_id, review_id).await?;
    Ok(Json(load_view(&state, review.id).await?))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn update_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateReviewRequest>,
) -> AppResult<Json<ReviewView>> {
    let review = find_review(&state, title_id, review_id).await?;
    check_object(POLICY, Some(&user.actor()), Action::Update, review.author_id)?;

    if let Some(text) = &input.text {
        validate_not_blank("text", text)?;
    }
    if let Some(score) = input.score {
        validate_score(score)?;
    }

    if !ReviewRepo::update(&state.pool, review.id, input.text.as_deref(), input.score).await? {
        return Err(CoreError::not_found("Review", review_id).into());
    }

    tracing::info!(review_id, updated_by = user.user_id, "Review updated");

    Ok(Json(load_view(&state, review.id).await?))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn delete_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let review = find_review(&state, title_id, review_id).await?;
    check_object(POLICY, Some(&user.actor()), Action::Delete, review.author_id)?;

    if !ReviewRepo::delete(&state.pool, review.id).await? {
        return Err(CoreError::not_found("Review", review_id).into());
    }

    tracing::info!(review_id, deleted_by = user.user_id, "Review deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn already_reviewed() -> AppError {
    AppError::BadRequest("You have already reviewed this title".into())
}

/// A concurrent second review loses on `uq_reviews_author_title`; report it
/// like the up-front check does.
fn duplicate_review_error(err: sqlx::Error) -> AppError {
    if violated_unique_constraint(&err) == Some("uq_reviews_author_title") {
        already_reviewed()
    } else {
        err.into()
    }
}

async fn ensure_title(state: &AppState, title_id: DbId) -> AppResult<()> {
    TitleRepo::find_by_id(&state.pool, title_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Title", title_id))?;
    Ok(())
}

/// Load a review, 404 unless it belongs to `title_id`.
pub(crate) async fn find_review(
    state: &AppState,
    title_id: DbId,
    review_id: DbId,
) -> AppResult<Review> {
    ensure_title(state, title_id).await?;
    Ok(ReviewRepo::find(&state.pool, title_id, review_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Review", review_id))?)
}

async fn load_view(state: &AppState, review_id: DbId) -> AppResult<ReviewView> {
    Ok(ReviewRepo::find_view(&state.pool, review_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Review", review_id))?)
}
