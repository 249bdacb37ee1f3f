//! Field-level validation shared by the HTTP layer and the CSV loader.
//!
//! Every function returns `Err(CoreError::Validation)` with a message that
//! names the offending field.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidateEmail;

use crate::error::CoreError;

pub const USERNAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;
pub const PERSON_NAME_MAX_LEN: usize = 150;
pub const CATALOGUE_NAME_MAX_LEN: usize = 256;
pub const SLUG_MAX_LEN: usize = 50;
pub const TITLE_NAME_MAX_LEN: usize = 256;

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 10;

/// Username reserved for the `/users/me` endpoint.
pub const RESERVED_USERNAME: &str = "me";

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern is valid"));

/// Reject values longer than `max` characters (not bytes).
pub fn validate_max_len(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

pub fn validate_not_blank(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), CoreError> {
    validate_not_blank("username", username)?;
    validate_max_len("username", username, USERNAME_MAX_LEN)?;
    if username == RESERVED_USERNAME {
        return Err(CoreError::Validation(format!(
            "username '{RESERVED_USERNAME}' is reserved"
        )));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(CoreError::Validation(
            "username may contain only letters, digits and @/./+/-/_".into(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), CoreError> {
    validate_max_len("email", email, EMAIL_MAX_LEN)?;
    if !email.validate_email() {
        return Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    validate_max_len("slug", slug, SLUG_MAX_LEN)?;
    if !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(
            "slug may contain only latin letters, digits, hyphens and underscores".into(),
        ));
    }
    Ok(())
}

pub fn validate_score(score: i32) -> Result<(), CoreError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(CoreError::Validation(format!(
            "score must be between {MIN_SCORE} and {MAX_SCORE}, got {score}"
        )));
    }
    Ok(())
}

/// A title cannot be released in the future.
pub fn validate_year(year: i32, current_year: i32) -> Result<(), CoreError> {
    if year > current_year {
        return Err(CoreError::Validation(format!(
            "year {year} is in the future"
        )));
    }
    Ok(())
}
