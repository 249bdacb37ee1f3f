//! `create-superuser`: bootstrap an administrator account.

use sqlx::PgPool;
use yamdb_core::error::CoreError;
use yamdb_core::validation::{validate_email, validate_username};
use yamdb_db::models::user::User;
use yamdb_db::repositories::UserRepo;

#[derive(Debug, thiserror::Error)]
pub enum SuperuserError {
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create a superuser, or promote the existing account with `username`.
///
/// The account can then sign in through the regular confirmation-code flow.
pub async fn create_superuser(
    pool: &PgPool,
    username: &str,
    email: &str,
) -> Result<User, SuperuserError> {
    validate_username(username)?;
    validate_email(email)?;

    let user = UserRepo::upsert_superuser(pool, username, email).await?;
    tracing::info!(user_id = user.id, username = %user.username, "Superuser ready");
    Ok(user)
}
