//! Role-based permission predicates.
//!
//! Handlers describe the caller as an optional [`Actor`] (anonymous callers
//! are `None`) and the operation as an [`Action`], then ask a [`Policy`]
//! whether the request may proceed. Object-level checks additionally take
//! the id of the object's author.

use crate::error::CoreError;
use crate::roles::{is_admin, is_moderator, Role};
use crate::types::DbId;

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: Role,
    pub is_superuser: bool,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        is_admin(self.role, self.is_superuser)
    }

    pub fn is_moderator(&self) -> bool {
        is_moderator(self.role)
    }
}

/// What the request does to the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// GET / HEAD / OPTIONS.
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn is_safe(self) -> bool {
        self == Action::Read
    }
}

/// Access rules attached to each resource family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Categories, genres, titles: anyone reads, admins write.
    AdminOrReadOnly,
    /// User management: admins only, reads included.
    AdminOnly,
    /// Reviews and comments: anyone reads, any user creates, the author
    /// or staff (moderator, admin) modify.
    AuthorStaffOrReadOnly,
}

/// Request-level check, performed before any object is loaded.
pub fn check_request(
    policy: Policy,
    actor: Option<&Actor>,
    action: Action,
) -> Result<(), CoreError> {
    match policy {
        Policy::AdminOrReadOnly => {
            if action.is_safe() {
                return Ok(());
            }
            require_admin(actor)
        }
        Policy::AdminOnly => require_admin(actor),
        Policy::AuthorStaffOrReadOnly => {
            if action.is_safe() {
                return Ok(());
            }
            require_authenticated(actor).map(|_| ())
        }
    }
}

/// Object-level check for an object written by `author_id`.
///
/// Runs [`check_request`] first, so callers only need this one for
/// operations on an existing object.
pub fn check_object(
    policy: Policy,
    actor: Option<&Actor>,
    action: Action,
    author_id: DbId,
) -> Result<(), CoreError> {
    check_request(policy, actor, action)?;

    if policy != Policy::AuthorStaffOrReadOnly || action.is_safe() {
        return Ok(());
    }

    let actor = require_authenticated(actor)?;
    if actor.user_id == author_id || actor.is_moderator() || actor.is_admin() {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the author, a moderator or an admin may change this".into(),
        ))
    }
}

fn require_authenticated(actor: Option<&Actor>) -> Result<&Actor, CoreError> {
    actor.ok_or_else(|| CoreError::Unauthorized("Authentication credentials were not provided".into()))
}

fn require_admin(actor: Option<&Actor>) -> Result<(), CoreError> {
    let actor = require_authenticated(actor)?;
    if actor.is_admin() {
        Ok(())
    } else {
        Err(CoreError::Forbidden("Admin role required".into()))
    }
}
