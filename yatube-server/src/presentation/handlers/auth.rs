use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use cookie::{Cookie, SameSite, time::Duration};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::auth_service::AuthResult;
use crate::domain::user::{LoginRequest, SignupRequest, User};
use crate::presentation::AppState;
use crate::presentation::app_error::{AppError, AppResult};
use crate::presentation::middleware::auth::ACCESS_TOKEN_COOKIE;
use crate::presentation::render::{LOGIN_TEMPLATE, Rendered};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct SignupDto {
    #[validate(length(min = 3, max = 64))]
    pub(crate) username: String,
    #[validate(email)]
    pub(crate) email: String,
    #[validate(length(min = 8, max = 128))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct LoginDto {
    #[validate(length(min = 1, max = 64))]
    pub(crate) username: String,
    #[validate(length(min = 1))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginQuery {
    pub(crate) next: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthResponseDto {
    pub(crate) access_token: String,
    pub(crate) user: UserDto,
    /// Where the client should go after logging in, taken from `next`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) redirect_to: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LoginContext {
    pub(crate) next: Option<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

impl AuthResponseDto {
    fn new(result: AuthResult, redirect_to: Option<String>) -> Self {
        Self {
            access_token: result.access_token,
            user: result.user.into(),
            redirect_to,
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/signup/",
    tag = "auth",
    request_body = SignupDto,
    responses(
        (status = 201, description = "Signed up", body = AuthResponseDto),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username or email taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn signup(
    State(state): State<AppState>,
    Json(dto): Json<SignupDto>,
) -> AppResult<(StatusCode, Json<AuthResponseDto>)> {
    dto.validate()?;

    let result = state
        .auth_service
        .signup(SignupRequest {
            username: dto.username,
            email: dto.email,
            password: dto.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponseDto::new(result, None))))
}

#[utoipa::path(
    get,
    path = "/auth/login/",
    tag = "auth",
    params(
        ("next" = Option<String>, Query, description = "Path to return to after login")
    ),
    responses(
        (status = 200, description = "users/login.html", body = LoginContext)
    )
)]
pub(crate) async fn login_page(Query(query): Query<LoginQuery>) -> Rendered<LoginContext> {
    Rendered::new(
        LOGIN_TEMPLATE,
        LoginContext {
            next: safe_next(query.next),
        },
    )
}

#[utoipa::path(
    post,
    path = "/auth/login/",
    tag = "auth",
    params(
        ("next" = Option<String>, Query, description = "Path to return to after login")
    ),
    request_body = LoginDto,
    responses(
        (status = 200, description = "Logged in; sets the access_token cookie", body = AuthResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    Json(dto): Json<LoginDto>,
) -> AppResult<Response> {
    dto.validate()?;

    let result = state
        .auth_service
        .login(LoginRequest {
            username: dto.username,
            password: dto.password,
        })
        .await?;

    let cookie = session_cookie(&result.access_token, state.jwt.ttl_seconds())?;
    let body = AuthResponseDto::new(result, safe_next(query.next));

    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

fn session_cookie(token: &str, max_age: i64) -> AppResult<HeaderValue> {
    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age))
        .build();
    HeaderValue::from_str(&cookie.to_string()).map_err(|err| AppError::Internal(err.into()))
}

/// Only same-site absolute paths are followed after login. Browsers treat
/// `\` like `/`, so `/\host` would leave the site just as `//host` does.
fn safe_next(next: Option<String>) -> Option<String> {
    next.filter(|path| {
        path.starts_with('/')
            && !path[1..].starts_with(['/', '\\'])
            && !path.chars().any(|ch| ch.is_control())
    })
}
