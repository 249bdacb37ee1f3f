//! Route definitions for the `/titles` resource and its nested reviews
//! and comments.

use axum::routing::get;
use axum::Router;

use crate::handlers::{comments, reviews, titles};
use crate::state::AppState;

/// Routes mounted at `/titles`.
///
/// ```text
/// GET, POST                /                                          -> list, create
/// GET, PATCH, DELETE       /{id}                                      -> get, update, delete
/// GET, POST                /{title_id}/reviews                        -> list, create
/// GET, PATCH, DELETE       /{title_id}/reviews/{review_id}            -> get, update, delete
/// GET, POST                /{title_id}/reviews/{review_id}/comments   -> list, create
/// GET, PATCH, DELETE       /{title_id}/reviews/{review_id}/comments/{comment_id}
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(titles::list_titles).post(titles::create_title))
        .route(
            "/{title_id}",
            get(titles::get_title)
                .patch(titles::update_title)
                .delete(titles::delete_title),
        )
        .route(
            "/{title_id}/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route(
            "/{title_id}/reviews/{review_id}",
            get(reviews::get_review)
                .patch(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route(
            "/{title_id}/reviews/{review_id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/{title_id}/reviews/{review_id}/comments/{comment_id}",
            get(comments::get_comment)
                .patch(comments::update_comment)
                .delete(comments::delete_comment),
        )
}
