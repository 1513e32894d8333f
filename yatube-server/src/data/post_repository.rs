use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) text: String,
    pub(crate) author_id: i64,
    pub(crate) group_id: Option<i64>,
}

/// Fields an author may change; author and creation time are fixed.
#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) text: String,
    pub(crate) group_id: Option<i64>,
}

/// Filter applied to a listing, with group and author already resolved to ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum PostScope {
    All,
    Group(i64),
    Author(i64),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Slice {
    pub(crate) offset: u64,
    pub(crate) limit: u64,
}

/// Listings are ordered newest first; equal timestamps fall back to the
/// higher id first.
#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    async fn list_posts(&self, scope: PostScope, slice: Slice) -> Result<Vec<Post>, DomainError>;
    async fn count_posts(&self, scope: PostScope) -> Result<u64, DomainError>;
}
