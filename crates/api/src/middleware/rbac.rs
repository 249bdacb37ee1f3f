//! Route-level guards built on [`AuthUser`].
//!
//! Only whole-route rules live here. Author-or-staff checks need the review
//! or comment, so handlers run them after loading it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use yamdb_core::permissions::{check_request, Action, Policy};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Admin role or superuser; 401 without a token, 403 for anyone else.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        check_request(Policy::AdminOnly, Some(&user.actor()), Action::Read)?;
        Ok(RequireAdmin(user))
    }
}

/// Any signed-in user. Used by the `/users/me` endpoints.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
