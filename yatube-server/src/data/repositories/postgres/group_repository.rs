use async_trait::async_trait;
use sqlx::PgPool;

use crate::data::group_repository::{GroupRepository, NewGroup};
use crate::domain::error::DomainError;
use crate::domain::group::Group;

#[derive(Debug, Clone)]
pub(crate) struct PostgresGroupRepository {
    pool: PgPool,
}

impl PostgresGroupRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct GroupRow {
    id: i64,
    title: String,
    slug: String,
    description: String,
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn create_group(&self, input: NewGroup) -> Result<Group, DomainError> {
        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            INSERT INTO post_groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, slug, description
            "#,
        )
        .bind(input.title)
        .bind(input.slug)
        .bind(input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(map_group_db_error)?;

        map_row_to_group(row)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        let row = sqlx::query_as::<_, GroupRow>(
            "SELECT id, title, slug, description FROM post_groups WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_group_db_error)?;

        row.map(map_row_to_group).transpose()
    }

    async fn list_groups(&self) -> Result<Vec<Group>, DomainError> {
        let rows = sqlx::query_as::<_, GroupRow>(
            "SELECT id, title, slug, description FROM post_groups ORDER BY title, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_group_db_error)?;

        rows.into_iter().map(map_row_to_group).collect()
    }
}

fn map_row_to_group(row: GroupRow) -> Result<Group, DomainError> {
    Group::new(row.id, row.title, row.slug, row.description)
        .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_group_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        return DomainError::AlreadyExists("group slug".to_string());
    }
    DomainError::Unexpected(err.to_string())
}
