//! Process-local record store, used when no `DATABASE_URL` is configured.
//!
//! Mirrors the Postgres constraints that the services rely on: unique
//! usernames, emails and slugs, and posts referencing existing authors and
//! groups.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::data::group_repository::{GroupRepository, NewGroup};
use crate::data::post_repository::{NewPost, PostPatch, PostRepository, PostScope, Slice};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::post::Post;
use crate::domain::user::User;

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<UserCredentials>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    last_user_id: i64,
    last_group_id: i64,
    last_post_id: i64,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts a post stamped with `created_at` instead of the current time,
    /// the way a bulk load leaves many rows with one timestamp.
    #[cfg(test)]
    pub(crate) async fn insert_post_at(
        &self,
        input: NewPost,
        created_at: DateTime<Utc>,
    ) -> Result<Post, DomainError> {
        self.state.write().await.insert_post(input, created_at)
    }
}

impl MemoryState {
    fn has_group(&self, group_id: Option<i64>) -> bool {
        group_id.is_none_or(|id| self.groups.iter().any(|group| group.id == id))
    }

    fn insert_post(
        &mut self,
        input: NewPost,
        created_at: DateTime<Utc>,
    ) -> Result<Post, DomainError> {
        if !self.users.iter().any(|creds| creds.user.id == input.author_id) {
            return Err(DomainError::NotFound("author".to_string()));
        }
        if !self.has_group(input.group_id) {
            return Err(DomainError::NotFound("group".to_string()));
        }

        let post = Post::new(
            self.last_post_id + 1,
            input.text,
            input.author_id,
            input.group_id,
            created_at,
        )?;
        self.last_post_id = post.id;
        self.posts.push(post.clone());
        Ok(post)
    }

    fn scoped(&self, scope: PostScope) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(move |post| match scope {
            PostScope::All => true,
            PostScope::Group(group_id) => post.group_id == Some(group_id),
            PostScope::Author(author_id) => post.author_id == author_id,
        })
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        self.state.write().await.insert_post(input, Utc::now())
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let state = self.state.read().await;
        Ok(state.posts.iter().find(|post| post.id == id).cloned())
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let mut state = self.state.write().await;
        if !state.has_group(patch.group_id) {
            return Err(DomainError::NotFound("group".to_string()));
        }

        let Some(post) = state.posts.iter_mut().find(|post| post.id == id) else {
            return Ok(None);
        };
        post.text = patch.text;
        post.group_id = patch.group_id;
        Ok(Some(post.clone()))
    }

    async fn list_posts(&self, scope: PostScope, slice: Slice) -> Result<Vec<Post>, DomainError> {
        let state = self.state.read().await;
        let mut posts: Vec<&Post> = state.scoped(scope).collect();
        posts.sort_by_key(|post| Reverse((post.created_at, post.id)));

        let offset = usize::try_from(slice.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(slice.limit).unwrap_or(usize::MAX);
        Ok(posts
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_posts(&self, scope: PostScope) -> Result<u64, DomainError> {
        let state = self.state.read().await;
        Ok(state.scoped(scope).count() as u64)
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create_group(&self, input: NewGroup) -> Result<Group, DomainError> {
        let mut state = self.state.write().await;
        if state.groups.iter().any(|group| group.slug == input.slug) {
            return Err(DomainError::AlreadyExists("group slug".to_string()));
        }

        let group = Group::new(
            state.last_group_id + 1,
            input.title,
            input.slug,
            input.description,
        )?;
        state.last_group_id = group.id;
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        let state = self.state.read().await;
        Ok(state.groups.iter().find(|group| group.slug == slug).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, DomainError> {
        let state = self.state.read().await;
        let mut groups = state.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.state.write().await;
        if state
            .users
            .iter()
            .any(|creds| creds.user.username == input.username)
        {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }
        if state.users.iter().any(|creds| creds.user.email == input.email) {
            return Err(DomainError::AlreadyExists("email".to_string()));
        }

        let user = User::new(
            state.last_user_id + 1,
            input.username,
            input.email,
            Utc::now(),
        )?;
        state.last_user_id = user.id;
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash: input.password_hash,
        });
        Ok(user)
    }

    async fn find_author(&self, username: &str) -> Result<Option<User>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|creds| creds.user.username == username)
            .map(|creds| creds.user.clone()))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|creds| creds.user.username == username)
            .cloned())
    }
}
