use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn new(
        id: i64,
        username: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }

        Ok(Self {
            id,
            username: normalize_username(&username.into())?,
            email: normalize_email(&email.into())?,
            created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SignupRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

impl SignupRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let password_len = self.password.chars().count();
        if !(8..=128).contains(&password_len) {
            return Err(DomainError::Validation {
                field: "password",
                message: "must be 8..128 chars",
            });
        }

        Ok(Self {
            username: normalize_username(&self.username)?,
            email: normalize_email(&self.email)?,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = self.username.trim();
        if username.is_empty() || username.len() > 64 {
            return Err(DomainError::Validation {
                field: "username",
                message: "must be 1..64 chars",
            });
        }
        if self.password.is_empty() {
            return Err(DomainError::Validation {
                field: "password",
                message: "must not be empty",
            });
        }

        Ok(Self {
            username: username.to_string(),
            password: self.password,
        })
    }
}

/// Usernames end up in profile paths, so only letters, digits and `@.+-_`
/// are accepted.
fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    if username.len() < 3 || username.len() > 64 {
        return Err(DomainError::Validation {
            field: "username",
            message: "must be 3..64 chars",
        });
    }
    let allowed = username
        .chars()
        .all(|ch| ch.is_alphanumeric() || matches!(ch, '@' | '.' | '+' | '-' | '_'));
    if !allowed {
        return Err(DomainError::Validation {
            field: "username",
            message: "may contain only letters, digits and @/./+/-/_",
        });
    }
    Ok(username.to_string())
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{LoginRequest, SignupRequest, User, normalize_email, normalize_username};

    #[test]
    fn user_new_rejects_non_positive_id() {
        let result = User::new(0, "StasBasov", "stas@example.com", Utc::now());
        assert!(result.is_err());
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        let value = normalize_email("  StAs@Example.COM ").expect("must be valid");
        assert_eq!(value, "stas@example.com");
    }

    #[test]
    fn username_rules_are_applied() {
        assert!(normalize_username("ab").is_err());
        assert!(normalize_username("has no name").is_err());
        assert!(normalize_username("with/slash").is_err());
        assert_eq!(
            normalize_username("  HasNoName ").expect("must be valid"),
            "HasNoName"
        );
        assert!(normalize_username("test-author").is_ok());
    }

    #[test]
    fn signup_password_length_is_checked() {
        let short = SignupRequest {
            username: "NotAuthor".to_string(),
            email: "not-author@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(short.validate().is_err());

        let ok = SignupRequest {
            username: " NotAuthor ".to_string(),
            email: "Not-Author@Example.com".to_string(),
            password: "very-secure-password".to_string(),
        };
        let validated = ok.validate().expect("must be valid");
        assert_eq!(validated.username, "NotAuthor");
        assert_eq!(validated.email, "not-author@example.com");
    }

    #[test]
    fn login_request_requires_password() {
        let req = LoginRequest {
            username: "HasNoName".to_string(),
            password: String::new(),
        };
        assert!(req.validate().is_err());
    }
}
