use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod render;
pub(crate) mod routes;


#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService>,
    pub(crate) blog_service: Arc<BlogService>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    pub(crate) fn new(
        auth_service: Arc<AuthService>,
        blog_service: Arc<BlogService>,
        jwt: Arc<JwtService>,
    ) -> Self {
        Self {
            auth_service,
            blog_service,
            jwt,
        }
    }
}
