use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::handlers::posts::{
    group_posts, index, post_create, post_create_form, post_detail, post_edit, post_edit_form,
    profile,
};

/// Listing and post pages. Access rules live in the service, so create and
/// edit are mounted without an auth layer and anonymous visitors get a
/// login redirect instead of a 401.
pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/group/{slug}/", get(group_posts))
        .route("/profile/{username}/", get(profile))
        .route("/posts/{id}/", get(post_detail))
        .route("/create/", get(post_create_form).post(post_create))
        .route("/posts/{id}/edit/", get(post_edit_form).post(post_edit))
}
