/// Identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Actor {
    Anonymous,
    Authenticated(AuthenticatedUser),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: i64,
    pub(crate) username: String,
}

impl Actor {
    pub(crate) fn authenticated(user_id: i64, username: impl Into<String>) -> Self {
        Self::Authenticated(AuthenticatedUser {
            user_id,
            username: username.into(),
        })
    }

    pub(crate) fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }
}
