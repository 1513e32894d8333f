use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::user::User;

/// A user together with the stored argon2 hash; only the login flow reads it.
#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
}

/// Usernames are matched exactly, the way they appear in `/profile/{username}/`.
#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn find_author(&self, username: &str) -> Result<Option<User>, DomainError>;
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError>;
}
