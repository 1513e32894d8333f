use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use cookie::Cookie;

use crate::domain::actor::Actor;
use crate::presentation::AppState;

pub(crate) const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Resolves the request's actor from a bearer token or the access-token
/// cookie. Missing, malformed or expired tokens make the actor anonymous;
/// views decide what an anonymous actor may do.
impl FromRequestParts<AppState> for Actor {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor = bearer_token(&parts.headers)
            .map(str::to_string)
            .or_else(|| cookie_token(&parts.headers))
            .and_then(|token| state.jwt.verify_token(&token).ok())
            .map(|claims| Actor::authenticated(claims.user_id, claims.username))
            .unwrap_or(Actor::Anonymous);
        Ok(actor)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}
