use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::data::post_repository::{NewPost, PostPatch, PostRepository, PostScope, Slice};
use crate::domain::error::DomainError;
use crate::domain::post::Post;

const POST_COLUMNS: &str = "id, text, author_id, group_id, created_at";

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    text: String,
    author_id: i64,
    group_id: Option<i64>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "INSERT INTO posts (text, author_id, group_id) VALUES ($1, $2, $3) RETURNING {POST_COLUMNS}"
        ))
        .bind(input.text)
        .bind(input.author_id)
        .bind(input.group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "UPDATE posts SET text = $2, group_id = $3 WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.text)
        .bind(patch.group_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn list_posts(&self, scope: PostScope, slice: Slice) -> Result<Vec<Post>, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {POST_COLUMNS} FROM posts"));
        push_scope(&mut builder, scope);
        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(to_i64(slice.limit))
            .push(" OFFSET ")
            .push_bind(to_i64(slice.offset));

        let rows = builder
            .build_query_as::<PostRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn count_posts(&self, scope: PostScope) -> Result<u64, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts");
        push_scope(&mut builder, scope);

        let count: i64 = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        u64::try_from(count).map_err(|err| DomainError::Unexpected(err.to_string()))
    }
}

fn push_scope(builder: &mut QueryBuilder<'_, Postgres>, scope: PostScope) {
    match scope {
        PostScope::All => {}
        PostScope::Group(group_id) => {
            builder.push(" WHERE group_id = ").push_bind(group_id);
        }
        PostScope::Author(author_id) => {
            builder.push(" WHERE author_id = ").push_bind(author_id);
        }
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    Post::new(row.id, row.text, row.author_id, row.group_id, row.created_at)
        .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        let resource = match db_err.constraint() {
            Some("posts_group_id_fkey") => "group",
            _ => "author",
        };
        return DomainError::NotFound(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
