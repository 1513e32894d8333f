use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Group {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) description: String,
}

impl Group {
    pub(crate) fn new(
        id: i64,
        title: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }
        let title = normalize_title(&title.into())?;
        let slug = slug.into();
        if !is_valid_slug(&slug) {
            return Err(DomainError::Validation {
                field: "slug",
                message: "must be 1..50 chars of [a-z0-9_-]",
            });
        }

        Ok(Self {
            id,
            title,
            slug,
            description: description.into().trim().to_string(),
        })
    }
}

/// Slugs appear verbatim in `/group/{slug}/`.
pub(crate) fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 50
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_')
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 200 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..200 chars",
        });
    }
    Ok(title.to_string())
}
