//! Boundary between views and whatever renders them.
//!
//! A view answers with the template it wants and a typed context; the body
//! is `{"template": ..., "context": ...}` and the template name is repeated
//! in the `x-template` header.

use axum::{
    Json,
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub(crate) const TEMPLATE_HEADER: HeaderName = HeaderName::from_static("x-template");

pub(crate) const INDEX_TEMPLATE: &str = "posts/index.html";
pub(crate) const GROUP_LIST_TEMPLATE: &str = "posts/group_list.html";
pub(crate) const PROFILE_TEMPLATE: &str = "posts/profile.html";
pub(crate) const POST_DETAIL_TEMPLATE: &str = "posts/post_detail.html";
pub(crate) const CREATE_POST_TEMPLATE: &str = "posts/create_post.html";
pub(crate) const LOGIN_TEMPLATE: &str = "users/login.html";

#[derive(Debug)]
pub(crate) struct Rendered<C> {
    template: &'static str,
    context: C,
}

#[derive(Serialize)]
struct RenderedBody<'a, C> {
    template: &'static str,
    context: &'a C,
}

impl<C> Rendered<C> {
    pub(crate) fn new(template: &'static str, context: C) -> Self {
        Self { template, context }
    }
}

impl<C: Serialize> IntoResponse for Rendered<C> {
    fn into_response(self) -> Response {
        let body = RenderedBody {
            template: self.template,
            context: &self.context,
        };
        let mut response = (StatusCode::OK, Json(body)).into_response();
        response
            .headers_mut()
            .insert(TEMPLATE_HEADER, HeaderValue::from_static(self.template));
        response
    }
}

/// `302 Found` to `location`.
pub(crate) fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
