//! Handlers for the `/titles` resource.
//!
//! Writes reference the category and genres by slug; the handlers resolve
//! them to ids and reject unknown slugs before touching the title.

use std::collections::BTreeSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, Utc};
use serde::Deserialize;
use yamdb_core::error::CoreError;
use yamdb_core::pagination::PageRequest;
use yamdb_core::types::DbId;
use yamdb_core::validation::{
    validate_max_len, validate_not_blank, validate_year, TITLE_NAME_MAX_LEN,
};
use yamdb_db::models::title::{CreateTitle, TitleDetail, TitleFilter, UpdateTitle};
use yamdb_db::repositories::{CategoryRepo, GenreRepo, TitleRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::Page;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /titles`.
#[derive(Debug, Default, Deserialize)]
pub struct TitleListParams {
    pub page: Option<i64>,
    /// Category slug.
    pub category: Option<String>,
    /// Genre slug.
    pub genre: Option<String>,
    /// Case-insensitive name substring.
    pub name: Option<String>,
    pub year: Option<i32>,
}

/// Request body for `POST /titles`.
#[derive(Debug, Deserialize)]
pub struct CreateTitleRequest {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// Genre slugs.
    #[serde(default)]
    pub genre: Vec<String>,
}

/// Request body for `PATCH /titles/{id}`. A present `genre` list replaces
/// the title's genres.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTitleRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub genre: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/titles?category=&genre=&name=&year=&page=
pub async fn list_titles(
    State(state): State<AppState>,
    Query(params): Query<TitleListParams>,
) -> AppResult<Json<Page<TitleDetail>>> {
    let page = PageRequest::new(params.page, state.config.page_size);
    let filter = TitleFilter {
        category: non_empty(params.category),
        genre: non_empty(params.genre),
        name: non_empty(params.name),
        year: params.year,
    };

    let (titles, count) = TitleRepo::list(&state.pool, &filter, page).await?;
    Ok(Json(Page::new(titles, count, page)))
}

/// POST /api/v1/titles
pub async fn create_title(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateTitleRequest>,
) -> AppResult<(StatusCode, Json<TitleDetail>)> {
    validate_name(&input.name)?;
    validate_year(input.year, Utc::now().year())?;

    let category_id = match &input.category {
        Some(slug) => Some(resolve_category(&state, slug).await?),
        None => None,
    };
    let genre_ids = resolve_genres(&state, &input.genre).await?;

    let title = TitleRepo::create(
        &state.pool,
        &CreateTitle {
            name: input.name,
            year: input.year,
            description: input.description,
            category_id,
            genre_ids,
        },
    )
    .await?;

    tracing::info!(title_id = title.id, created_by = admin.user_id, "Title created");

    let detail = load_detail(&state, title.id).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/v1/titles/{id}
pub async fn get_title(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TitleDetail>> {
    Ok(Json(load_detail(&state, id).await?))
}

/// PATCH /api/v1/titles/{id}
pub async fn update_title(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTitleRequest>,
) -> AppResult<Json<TitleDetail>> {
    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    if let Some(year) = input.year {
        validate_year(year, Utc::now().year())?;
    }

    let category_id = match &input.category {
        Some(slug) => Some(resolve_category(&state, slug).await?),
        None => None,
    };
    let genre_ids = match &input.genre {
        Some(slugs) => Some(resolve_genres(&state, slugs).await?),
        None => None,
    };

    let update = UpdateTitle {
        name: input.name,
        year: input.year,
        description: input.description,
        category_id,
        genre_ids,
    };
    TitleRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| CoreError::not_found("Title", id))?;

    tracing::info!(title_id = id, updated_by = admin.user_id, "Title updated");

    Ok(Json(load_detail(&state, id).await?))
}

/// DELETE /api/v1/titles/{id}
pub async fn delete_title(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TitleRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Title", id).into());
    }

    tracing::info!(title_id = id, deleted_by = admin.user_id, "Title deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_name(name: &str) -> Result<(), CoreError> {
    validate_not_blank("name", name)?;
    validate_max_len("name", name, TITLE_NAME_MAX_LEN)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn load_detail(state: &AppState, id: DbId) -> AppResult<TitleDetail> {
    Ok(TitleRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Title", id))?)
}

async fn resolve_category(state: &AppState, slug: &str) -> AppResult<DbId> {
    CategoryRepo::find_by_slug(&state.pool, slug)
        .await?
        .map(|c| c.id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown category slug '{slug}'")))
}

/// Resolve genre slugs to ids. Duplicates collapse; any unknown slug fails
/// the whole request.
async fn resolve_genres(state: &AppState, slugs: &[String]) -> AppResult<Vec<DbId>> {
    let wanted: BTreeSet<&str> = slugs.iter().map(String::as_str).collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let unique: Vec<String> = wanted.iter().map(|s| s.to_string()).collect();
    let found = GenreRepo::find_by_slugs(&state.pool, &unique).await?;

    if found.len() != unique.len() {
        let known: BTreeSet<&str> = found.iter().map(|g| g.slug.as_str()).collect();
        let missing: Vec<&str> = wanted.difference(&known).copied().collect();
        return Err(AppError::BadRequest(format!(
            "Unknown genre slug(s): {}",
            missing.join(", ")
        )));
    }

    Ok(found.into_iter().map(|g| g.id).collect())
}
