use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

pub(crate) const LOGIN_PATH: &str = "/auth/login/";

/// Bytes left as-is in a username path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'@')
    .remove(b'+');

// `/` stays readable so `next=/create/` matches what browsers send back.
const NEXT_QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Named pages of the site, reversible into paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Route {
    Index,
    GroupPosts { slug: String },
    Profile { username: String },
    PostDetail { post_id: i64 },
    PostCreate,
    PostEdit { post_id: i64 },
}

impl Route {
    pub(crate) fn path(&self) -> String {
        match self {
            Self::Index => "/".to_string(),
            Self::GroupPosts { slug } => format!("/group/{slug}/"),
            Self::Profile { username } => format!("/profile/{}/", encode_segment(username)),
            Self::PostDetail { post_id } => format!("/posts/{post_id}/"),
            Self::PostCreate => "/create/".to_string(),
            Self::PostEdit { post_id } => format!("/posts/{post_id}/edit/"),
        }
    }

    /// Login page that sends the visitor back to `self` afterwards.
    pub(crate) fn login_redirect(&self) -> String {
        format!("{LOGIN_PATH}?next={}", encode_query_value(&self.path()))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, NEXT_QUERY_VALUE).to_string()
}

#[cfg(test)]
mod tests {
    use super::Route;

    #[test]
    fn routes_reverse_into_paths() {
        assert_eq!(Route::Index.path(), "/");
        assert_eq!(
            Route::GroupPosts {
                slug: "test-slug".to_string()
            }
            .path(),
            "/group/test-slug/"
        );
        assert_eq!(
            Route::Profile {
                username: "StasBasov".to_string()
            }
            .path(),
            "/profile/StasBasov/"
        );
        assert_eq!(Route::PostDetail { post_id: 5 }.path(), "/posts/5/");
        assert_eq!(Route::PostCreate.path(), "/create/");
        assert_eq!(Route::PostEdit { post_id: 5 }.path(), "/posts/5/edit/");
    }

    #[test]
    fn login_redirect_carries_next_path() {
        assert_eq!(
            Route::PostCreate.login_redirect(),
            "/auth/login/?next=/create/"
        );
        assert_eq!(
            Route::PostEdit { post_id: 12 }.login_redirect(),
            "/auth/login/?next=/posts/12/edit/"
        );
    }

    #[test]
    fn profile_path_escapes_non_ascii_usernames() {
        let path = Route::Profile {
            username: "Стас".to_string(),
        }
        .path();
        assert_eq!(path, "/profile/%D0%A1%D1%82%D0%B0%D1%81/");
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let path = Route::Profile {
            username: "a b/c?d".to_string(),
        }
        .path();
        assert_eq!(path, "/profile/a%20b%2Fc%3Fd/");

        let redirect = Route::Profile {
            username: "user@mail.ru".to_string(),
        }
        .login_redirect();
        assert_eq!(redirect, "/auth/login/?next=/profile/user%40mail.ru/");
    }
}
