pub mod auth;
pub mod categories;
pub mod genres;
pub mod health;
pub mod titles;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                      signup (public)
/// /auth/token                                       token exchange (public)
///
/// /users                                            list, create (admin only)
/// /users/me                                         own profile (any user)
/// /users/{username}                                 get, update, delete (admin only)
///
/// /categories                                       list (public), create (admin)
/// /categories/{slug}                                delete (admin)
/// /genres                                           list (public), create (admin)
/// /genres/{slug}                                    delete (admin)
///
/// /titles                                           list (public), create (admin)
/// /titles/{id}                                      get (public), update, delete (admin)
/// /titles/{id}/reviews                              list (public), create (any user)
/// /titles/{id}/reviews/{id}                         get (public), update, delete (author/staff)
/// /titles/{id}/reviews/{id}/comments                list (public), create (any user)
/// /titles/{id}/reviews/{id}/comments/{id}           get (public), update, delete (author/staff)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/categories", categories::router())
        .nest("/genres", genres::router())
        .nest("/titles", titles::router())
}
