//! Handlers for the `/users` resource.
//!
//! Account management is admin-only; every authenticated user can read and
//! edit their own profile at `/users/me`, except for the role.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use yamdb_core::error::CoreError;
use yamdb_core::roles::Role;
use yamdb_core::validation::{
    validate_email, validate_max_len, validate_username, PERSON_NAME_MAX_LEN,
};
use yamdb_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use yamdb_db::repositories::UserRepo;

use crate::error::AppResult;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::SearchParams;
use crate::response::Page;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Request body for `PATCH /users/{username}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

/// Request body for `PATCH /users/me`. A `role` key is silently ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

impl UpdateUserRequest {
    fn validate(&self) -> Result<(), CoreError> {
        if let Some(username) = &self.username {
            validate_username(username)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        validate_names(self.first_name.as_deref(), self.last_name.as_deref())
    }

    fn into_update(self) -> UpdateUser {
        UpdateUser {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role: self.role,
        }
    }
}

impl From<UpdateProfileRequest> for UpdateUserRequest {
    fn from(input: UpdateProfileRequest) -> Self {
        Self {
            username: input.username,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            bio: input.bio,
            role: None,
        }
    }
}

fn validate_names(first_name: Option<&str>, last_name: Option<&str>) -> Result<(), CoreError> {
    if let Some(first_name) = first_name {
        validate_max_len("first_name", first_name, PERSON_NAME_MAX_LEN)?;
    }
    if let Some(last_name) = last_name {
        validate_max_len("last_name", last_name, PERSON_NAME_MAX_LEN)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Admin handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users?search=&page=
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Page<UserResponse>>> {
    let page = params.request(state.config.page_size);
    let (users, count) = UserRepo::list(&state.pool, params.term(), page).await?;
    let results = users.iter().map(UserResponse::from).collect();
    Ok(Json(Page::new(results, count, page)))
}

/// POST /api/v1/users
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    validate_username(&input.username)?;
    validate_email(&input.email)?;
    validate_names(input.first_name.as_deref(), input.last_name.as_deref())?;

    let create = CreateUser {
        username: input.username,
        email: input.email,
        first_name: input.first_name,
        last_name: input.last_name,
        bio: input.bio,
        role: input.role,
    };
    let user = UserRepo::create(&state.pool, &create).await?;

    tracing::info!(user_id = user.id, created_by = admin.user_id, "User created");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// GET /api/v1/users/{username}
pub async fn get_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = find_user(&state, &username).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// PATCH /api/v1/users/{username}
pub async fn update_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    input.validate()?;
    let user = find_user(&state, &username).await?;

    let updated = UserRepo::update(&state.pool, user.id, &input.into_update())
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    tracing::info!(user_id = updated.id, updated_by = admin.user_id, "User updated");

    Ok(Json(UserResponse::from(&updated)))
}

/// DELETE /api/v1/users/{username}
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<StatusCode> {
    let user = find_user(&state, &username).await?;
    if !UserRepo::delete(&state.pool, user.id).await? {
        return Err(CoreError::not_found("User", &username).into());
    }

    tracing::info!(user_id = user.id, deleted_by = admin.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Own profile
// ---------------------------------------------------------------------------

/// GET /api/v1/users/me
pub async fn get_me(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &user.username))?;
    Ok(Json(UserResponse::from(&user)))
}

/// PATCH /api/v1/users/me
pub async fn update_me(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    let input = UpdateUserRequest::from(input);
    input.validate()?;

    let updated = UserRepo::update(&state.pool, user.user_id, &input.into_update())
        .await?
        .ok_or_else(|| CoreError::not_found("User", &user.username))?;
    Ok(Json(UserResponse::from(&updated)))
}

async fn find_user(state: &AppState, username: &str) -> AppResult<User> {
    Ok(UserRepo::find_by_username(&state.pool, username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", username))?)
}
