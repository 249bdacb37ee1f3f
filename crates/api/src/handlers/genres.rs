//! Handlers for the `/genres` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use yamdb_core::error::CoreError;
use yamdb_core::validation::{
    validate_max_len, validate_not_blank, validate_slug, CATALOGUE_NAME_MAX_LEN,
};
use yamdb_db::models::genre::{CreateGenre, Genre};
use yamdb_db::repositories::GenreRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::SearchParams;
use crate::response::Page;
use crate::state::AppState;

/// Request body for `POST /genres`.
#[derive(Debug, Deserialize)]
pub struct CreateGenreRequest {
    pub name: String,
    pub slug: String,
}

/// GET /api/v1/genres?search=&page=
///
/// Genres are listed alphabetically.
pub async fn list_genres(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Page<Genre>>> {
    let page = params.request(state.config.page_size);
    let (genres, count) = GenreRepo::list(&state.pool, params.term(), page).await?;
    Ok(Json(Page::new(genres, count, page)))
}

/// POST /api/v1/genres
pub async fn create_genre(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateGenreRequest>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    validate_not_blank("name", &input.name)?;
    validate_max_len("name", &input.name, CATALOGUE_NAME_MAX_LEN)?;
    validate_slug(&input.slug)?;

    let genre = GenreRepo::create(
        &state.pool,
        &CreateGenre {
            name: input.name,
            slug: input.slug,
        },
    )
    .await?;

    tracing::info!(slug = %genre.slug, created_by = admin.user_id, "Genre created");

    Ok((StatusCode::CREATED, Json(genre)))
}

/// DELETE /api/v1/genres/{slug}
pub async fn delete_genre(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    if !GenreRepo::delete_by_slug(&state.pool, &slug).await? {
        return Err(CoreError::not_found("Genre", &slug).into());
    }

    tracing::info!(slug = %slug, deleted_by = admin.user_id, "Genre deleted");

    Ok(StatusCode::NO_CONTENT)
}
