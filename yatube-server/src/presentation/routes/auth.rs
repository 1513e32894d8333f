use axum::{
    Router,
    routing::{get, post},
};

use crate::presentation::AppState;
use crate::presentation::handlers::auth::{login, login_page, signup};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/signup/", post(signup))
        .route("/login/", get(login_page).post(login))
}
