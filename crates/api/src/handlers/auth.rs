//! Handlers for the `/auth` resource (signup, token).

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use yamdb_core::confirmation::{
    generate_confirmation_code, hash_confirmation_code, verify_confirmation_code,
};
use yamdb_core::error::CoreError;
use yamdb_core::validation::{validate_email, validate_not_blank, validate_username};
use yamdb_db::models::user::{CreateUser, User};
use yamdb_db::repositories::UserRepo;
use yamdb_mail::confirmation_message;

use crate::auth::jwt::generate_access_token;
use crate::error::{violated_unique_constraint, AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
}

/// Echo of the registered pair, returned by signup.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

/// Request body for `POST /auth/token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Register a username/email pair and email a confirmation code. Repeating
/// the request with the same pair issues a fresh code; a pair that clashes
/// with another account on either field is rejected.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<Json<SignupResponse>> {
    validate_username(&input.username)?;
    validate_email(&input.email)?;

    let by_username = UserRepo::find_by_username(&state.pool, &input.username).await?;
    let by_email = UserRepo::find_by_email(&state.pool, &input.email).await?;

    let user = match (by_username, by_email) {
        (Some(existing), Some(same)) if existing.id == same.id => existing,
        (None, None) => {
            let user =
                UserRepo::create(&state.pool, &CreateUser::signup(&input.username, &input.email))
                    .await
                    .map_err(duplicate_signup_error)?;
            tracing::info!(user_id = user.id, username = %user.username, "User signed up");
            user
        }
        (Some(_), _) => {
            return Err(AppError::BadRequest(
                "A user with this username already exists with a different email".into(),
            ))
        }
        (None, Some(_)) => {
            return Err(AppError::BadRequest(
                "A user with this email already exists".into(),
            ))
        }
    };

    send_confirmation_code(&state, &user).await?;

    Ok(Json(SignupResponse {
        username: user.username,
        email: user.email,
    }))
}

/// POST /api/v1/auth/token
///
/// Exchange a confirmation code for an access token. The code is consumed.
pub async fn token(
    State(state): State<AppState>,
    Json(input): Json<TokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    validate_username(&input.username)?;
    validate_not_blank("confirmation_code", &input.confirmation_code)?;

    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &input.username))?;

    let valid = verify_confirmation_code(
        &input.confirmation_code,
        user.confirmation_code_hash.as_deref(),
        user.confirmation_code_expires_at,
        Utc::now(),
    );
    if !valid {
        return Err(AppError::BadRequest(
            "Invalid or expired confirmation code".into(),
        ));
    }

    // A concurrent exchange of the same code loses here.
    let consumed = UserRepo::consume_confirmation_code(
        &state.pool,
        user.id,
        &hash_confirmation_code(&input.confirmation_code),
    )
    .await?;
    if !consumed {
        return Err(AppError::BadRequest(
            "Invalid or expired confirmation code".into(),
        ));
    }

    let token = generate_access_token(user.id, user.role(), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, "Access token issued");

    Ok(Json(TokenResponse { token }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A concurrent signup that takes the username or email first surfaces as a
/// `uq_users_*` violation; answer it like the lookup above does.
fn duplicate_signup_error(err: sqlx::Error) -> AppError {
    match violated_unique_constraint(&err) {
        Some(constraint) if constraint.starts_with("uq_users_") => AppError::BadRequest(
            "A user with this username or email already exists".into(),
        ),
        _ => err.into(),
    }
}

/// Issue a fresh code for `user`, store its digest and mail the plaintext.
async fn send_confirmation_code(state: &AppState, user: &User) -> AppResult<()> {
    let code = generate_confirmation_code();
    let expires_at = Utc::now() + Duration::hours(state.config.confirmation_code_ttl_hours);

    UserRepo::set_confirmation_code(&state.pool, user.id, &code.hash, expires_at).await?;

    state
        .mailer
        .send(confirmation_message(&user.email, &user.username, &code.plaintext))
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to send confirmation code: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use sqlx::PgPool;

    use super::*;

    #[sqlx::test(migrations = "../../db/migrations")]
    async fn racing_signup_maps_to_bad_request(pool: PgPool) {
        UserRepo::create(&pool, &CreateUser::signup("racer", "racer@test.com"))
            .await
            .unwrap();
        let err = UserRepo::create(&pool, &CreateUser::signup("racer", "other@test.com"))
            .await
            .unwrap_err();

        let response = duplicate_signup_error(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
