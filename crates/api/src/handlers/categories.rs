//! Handlers for the `/categories` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use yamdb_core::error::CoreError;
use yamdb_core::validation::{
    validate_max_len, validate_not_blank, validate_slug, CATALOGUE_NAME_MAX_LEN,
};
use yamdb_db::models::category::{Category, CreateCategory};
use yamdb_db::repositories::CategoryRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::SearchParams;
use crate::response::Page;
use crate::state::AppState;

/// Request body for `POST /categories`.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: String,
}

/// GET /api/v1/categories?search=&page=
pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Page<Category>>> {
    let page = params.request(state.config.page_size);
    let (categories, count) = CategoryRepo::list(&state.pool, params.term(), page).await?;
    Ok(Json(Page::new(categories, count, page)))
}

/// POST /api/v1/categories
pub async fn create_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<Category>)> {
    validate_not_blank("name", &input.name)?;
    validate_max_len("name", &input.name, CATALOGUE_NAME_MAX_LEN)?;
    validate_slug(&input.slug)?;

    let category = CategoryRepo::create(
        &state.pool,
        &CreateCategory {
            name: input.name,
            slug: input.slug,
        },
    )
    .await?;

    tracing::info!(slug = %category.slug, created_by = admin.user_id, "Category created");

    Ok((StatusCode::CREATED, Json(category)))
}

/// DELETE /api/v1/categories/{slug}
///
/// Returns 409 while titles still belong to the category.
pub async fn delete_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    if !CategoryRepo::delete_by_slug(&state.pool, &slug).await? {
        return Err(CoreError::not_found("Category", &slug).into());
    }

    tracing::info!(slug = %slug, deleted_by = admin.user_id, "Category deleted");

    Ok(StatusCode::NO_CONTENT)
}
