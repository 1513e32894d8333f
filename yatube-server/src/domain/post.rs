use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) author_id: i64,
    pub(crate) group_id: Option<i64>,
    pub(crate) created_at: DateTime<Utc>,
}

impl Post {
    pub(crate) fn new(
        id: i64,
        text: impl Into<String>,
        author_id: i64,
        group_id: Option<i64>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("author_id", author_id)?;
        if let Some(group_id) = group_id {
            validate_positive_i64("group_id", group_id)?;
        }
        let text = normalize_text(&text.into())?;

        Ok(Self {
            id,
            text,
            author_id,
            group_id,
            created_at,
        })
    }

    pub(crate) fn is_authored_by(&self, user_id: i64) -> bool {
        self.author_id == user_id
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

pub(crate) fn normalize_text(text: &str) -> Result<String, DomainError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::Validation {
            field: "text",
            message: "must not be empty",
        });
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{DomainError, Post, normalize_text};

    #[test]
    fn post_new_normalizes_and_builds_post() {
        let post = Post::new(1, "  Text  ", 10, Some(3), Utc::now()).expect("post should be created");

        assert_eq!(post.id, 1);
        assert_eq!(post.author_id, 10);
        assert_eq!(post.group_id, Some(3));
        assert_eq!(post.text, "Text");
    }

    #[test]
    fn post_new_accepts_missing_group() {
        let post = Post::new(1, "Text", 10, None, Utc::now()).expect("post should be created");
        assert_eq!(post.group_id, None);
    }

    #[test]
    fn post_new_rejects_non_positive_author_id() {
        let err = Post::new(1, "Text", 0, None, Utc::now()).expect_err("author_id must be > 0");
        assert_validation_field(err, "author_id");
    }

    #[test]
    fn post_new_rejects_non_positive_group_id() {
        let err = Post::new(1, "Text", 1, Some(-4), Utc::now()).expect_err("group_id must be > 0");
        assert_validation_field(err, "group_id");
    }

    #[test]
    fn normalize_text_rejects_blank_text() {
        let err = normalize_text(" \n\t ").expect_err("blank text must be rejected");
        assert_validation_field(err, "text");
    }

    #[test]
    fn is_authored_by_compares_author_id() {
        let post = Post::new(1, "Text", 7, None, Utc::now()).expect("post should be created");
        assert!(post.is_authored_by(7));
        assert!(!post.is_authored_by(8));
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
