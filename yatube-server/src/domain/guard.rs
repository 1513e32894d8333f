//! Ownership rules for creating and editing posts.
//!
//! Denials are not errors: anonymous visitors are sent to the login page
//! and authenticated non-authors are sent back to the post they tried to
//! edit. Neither path mutates anything.

use super::actor::{Actor, AuthenticatedUser};
use super::post::Post;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Access<'a> {
    Granted(&'a AuthenticatedUser),
    LoginRequired,
    NotAuthor,
}

pub(crate) fn authorize_create(actor: &Actor) -> Access<'_> {
    match actor.user() {
        Some(user) => Access::Granted(user),
        None => Access::LoginRequired,
    }
}

pub(crate) fn authorize_edit<'a>(actor: &'a Actor, post: &Post) -> Access<'a> {
    match actor.user() {
        None => Access::LoginRequired,
        Some(user) if post.is_authored_by(user.user_id) => Access::Granted(user),
        Some(_) => Access::NotAuthor,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{Access, authorize_create, authorize_edit};
    use crate::domain::actor::Actor;
    use crate::domain::post::Post;

    #[test]
    fn anonymous_actor_must_log_in_to_create() {
        assert_eq!(authorize_create(&Actor::Anonymous), Access::LoginRequired);
    }

    #[test]
    fn authenticated_actor_may_create() {
        let actor = Actor::authenticated(3, "HasNoName");
        match authorize_create(&actor) {
            Access::Granted(user) => assert_eq!(user.user_id, 3),
            other => panic!("expected Granted, got {other:?}"),
        }
    }

    #[test]
    fn edit_is_granted_only_to_the_author() {
        let post = Post::new(1, "Тестовый пост", 3, None, Utc::now()).expect("valid post");

        assert_eq!(
            authorize_edit(&Actor::Anonymous, &post),
            Access::LoginRequired
        );
        assert_eq!(
            authorize_edit(&Actor::authenticated(4, "NotAuthor"), &post),
            Access::NotAuthor
        );
        assert!(matches!(
            authorize_edit(&Actor::authenticated(3, "HasNoName"), &post),
            Access::Granted(_)
        ));
    }
}
