use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::listing_cache::ListingCache;
use crate::data::group_repository::{GroupRepository, NewGroup};
use crate::data::post_repository::{NewPost, PostPatch, PostRepository, PostScope, Slice};
use crate::data::user_repository::UserRepository;
use crate::domain::actor::Actor;
use crate::domain::error::DomainError;
use crate::domain::form::PostForm;
use crate::domain::group::{Group, is_valid_slug};
use crate::domain::guard::{Access, authorize_create, authorize_edit};
use crate::domain::pagination::{Page, Paginator};
use crate::domain::post::Post;
use crate::domain::route::Route;
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub(crate) struct GroupListing {
    pub(crate) group: Group,
    pub(crate) page: Page<Post>,
}

#[derive(Debug, Clone)]
pub(crate) struct ProfileListing {
    pub(crate) author: User,
    pub(crate) page: Page<Post>,
}

/// Result of a create/edit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FormOutcome {
    /// Show the form: a fresh GET, or a submission with field errors.
    Render(PostForm),
    Redirect(Route),
    /// Anonymous actor; send them to log in and come back to `next`.
    LoginRequired { next: Route },
}

pub(crate) struct BlogService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
    paginator: Paginator,
    index_cache: ListingCache,
}

impl BlogService {
    pub(crate) fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        users: Arc<dyn UserRepository>,
        paginator: Paginator,
        index_cache: ListingCache,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
            paginator,
            index_cache,
        }
    }

    pub(crate) async fn index(&self, requested: u64) -> Result<Page<Post>, DomainError> {
        if let Some(page) = self.index_cache.get(requested).await {
            return Ok(page);
        }
        let page = self.resolve_page(PostScope::All, requested).await?;
        self.index_cache.put(page.clone()).await;
        Ok(page)
    }

    pub(crate) async fn group_posts(
        &self,
        slug: &str,
        requested: u64,
    ) -> Result<GroupListing, DomainError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("group slug: {slug}")))?;
        let page = self.resolve_page(PostScope::Group(group.id), requested).await?;

        Ok(GroupListing { group, page })
    }

    pub(crate) async fn profile(
        &self,
        username: &str,
        requested: u64,
    ) -> Result<ProfileListing, DomainError> {
        let author = self
            .users
            .find_author(username)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("username: {username}")))?;
        let page = self.resolve_page(PostScope::Author(author.id), requested).await?;

        Ok(ProfileListing { author, page })
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .get_post(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))
    }

    pub(crate) async fn create_form(&self, actor: &Actor) -> Result<FormOutcome, DomainError> {
        if authorize_create(actor) == Access::LoginRequired {
            return Ok(FormOutcome::LoginRequired {
                next: Route::PostCreate,
            });
        }
        let groups = self.groups.list_groups().await?;
        Ok(FormOutcome::Render(PostForm::blank(&groups)))
    }

    pub(crate) async fn create_post(
        &self,
        actor: &Actor,
        raw: &HashMap<String, String>,
    ) -> Result<FormOutcome, DomainError> {
        let author = match authorize_create(actor) {
            Access::Granted(user) => user,
            Access::LoginRequired | Access::NotAuthor => {
                debug!("anonymous post creation redirected to login");
                return Ok(FormOutcome::LoginRequired {
                    next: Route::PostCreate,
                });
            }
        };

        let groups = self.groups.list_groups().await?;
        let form = PostForm::bind(raw, &groups);
        let Some(data) = form.cleaned() else {
            return Ok(FormOutcome::Render(form));
        };

        let post = self
            .posts
            .create_post(NewPost {
                text: data.text,
                author_id: author.user_id,
                group_id: data.group_id,
            })
            .await?;
        self.index_cache.invalidate().await;
        info!(post_id = post.id, author_id = post.author_id, "post created");

        Ok(FormOutcome::Redirect(Route::Profile {
            username: author.username.clone(),
        }))
    }

    pub(crate) async fn edit_form(
        &self,
        actor: &Actor,
        post_id: i64,
    ) -> Result<FormOutcome, DomainError> {
        let post = match self.editable_post(actor, post_id).await? {
            Ok(post) => post,
            Err(outcome) => return Ok(outcome),
        };
        let groups = self.groups.list_groups().await?;
        Ok(FormOutcome::Render(PostForm::for_post(&post, &groups)))
    }

    pub(crate) async fn edit_post(
        &self,
        actor: &Actor,
        post_id: i64,
        raw: &HashMap<String, String>,
    ) -> Result<FormOutcome, DomainError> {
        let post = match self.editable_post(actor, post_id).await? {
            Ok(post) => post,
            Err(outcome) => return Ok(outcome),
        };

        let groups = self.groups.list_groups().await?;
        let form = PostForm::bind(raw, &groups);
        let Some(data) = form.cleaned() else {
            return Ok(FormOutcome::Render(form));
        };

        self.posts
            .update_post(
                post.id,
                PostPatch {
                    text: data.text,
                    group_id: data.group_id,
                },
            )
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;
        self.index_cache.invalidate().await;
        info!(post_id, "post updated");

        Ok(FormOutcome::Redirect(Route::PostDetail { post_id }))
    }

    /// Administrative group creation; groups have no public form.
    pub(crate) async fn create_group(&self, input: NewGroup) -> Result<Group, DomainError> {
        if !is_valid_slug(&input.slug) {
            return Err(DomainError::Validation {
                field: "slug",
                message: "must be 1..50 chars of [a-z0-9_-]",
            });
        }
        let group = self.groups.create_group(input).await?;
        info!(group_id = group.id, slug = %group.slug, "group created");
        Ok(group)
    }

    pub(crate) async fn invalidate_cache(&self) {
        self.index_cache.invalidate().await;
    }

    /// Loads a post for editing, or the redirect to issue instead.
    ///
    /// Login is checked before the lookup so anonymous visitors are sent to
    /// log in even for ids that do not exist.
    async fn editable_post(
        &self,
        actor: &Actor,
        post_id: i64,
    ) -> Result<Result<Post, FormOutcome>, DomainError> {
        if actor.user().is_none() {
            return Ok(Err(FormOutcome::LoginRequired {
                next: Route::PostEdit { post_id },
            }));
        }

        let post = self.get_post(post_id).await?;
        match authorize_edit(actor, &post) {
            Access::Granted(_) => Ok(Ok(post)),
            Access::LoginRequired => Ok(Err(FormOutcome::LoginRequired {
                next: Route::PostEdit { post_id },
            })),
            Access::NotAuthor => {
                debug!(post_id, "edit by non-author redirected to post detail");
                Ok(Err(FormOutcome::Redirect(Route::PostDetail { post_id })))
            }
        }
    }

    async fn resolve_page(&self, scope: PostScope, requested: u64) -> Result<Page<Post>, DomainError> {
        let total = self.posts.count_posts(scope).await?;
        let window = self.paginator.window(total, requested);
        let items = if window.len == 0 {
            Vec::new()
        } else {
            self.posts
                .list_posts(
                    scope,
                    Slice {
                        offset: window.offset,
                        limit: window.len,
                    },
                )
                .await?
        };

        Ok(Page { items, window })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;

    use super::{BlogService, FormOutcome};
    use crate::application::listing_cache::ListingCache;
    use crate::data::group_repository::{GroupRepository, NewGroup};
    use crate::data::post_repository::{NewPost, PostRepository, PostScope};
    use crate::data::repositories::memory::MemoryStore;
    use crate::data::user_repository::{NewUser, UserRepository};
    use crate::domain::actor::Actor;
    use crate::domain::error::DomainError;
    use crate::domain::group::Group;
    use crate::domain::pagination::{Page, Paginator};
    use crate::domain::post::Post;
    use crate::domain::route::Route;
    use crate::domain::user::User;

    struct Fixture {
        store: MemoryStore,
        service: BlogService,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_cache(ListingCache::disabled())
        }

        fn with_cache(cache: ListingCache) -> Self {
            let store = MemoryStore::new();
            let service = BlogService::new(
                Arc::new(store.clone()),
                Arc::new(store.clone()),
                Arc::new(store.clone()),
                Paginator::new(10).expect("valid page size"),
                cache,
            );
            Self { store, service }
        }

        async fn user(&self, username: &str) -> User {
            self.store
                .create_user(NewUser {
                    username: username.to_string(),
                    email: format!("{}@example.com", username.to_lowercase()),
                    password_hash: "hash".to_string(),
                })
                .await
                .expect("user must be created")
        }

        async fn group(&self, slug: &str) -> Group {
            self.store
                .create_group(NewGroup {
                    title: format!("Группа {slug}"),
                    slug: slug.to_string(),
                    description: "Тестовое описание".to_string(),
                })
                .await
                .expect("group must be created")
        }

        async fn post(&self, author: &User, group: Option<&Group>) -> Post {
            self.store
                .create_post(NewPost {
                    text: "Тестовый пост".to_string(),
                    author_id: author.id,
                    group_id: group.map(|group| group.id),
                })
                .await
                .expect("post must be created")
        }
    }

    fn actor(user: &User) -> Actor {
        Actor::authenticated(user.id, user.username.clone())
    }

    fn form(text: &str, group: Option<&Group>) -> HashMap<String, String> {
        let mut raw = HashMap::new();
        raw.insert("text".to_string(), text.to_string());
        raw.insert(
            "group".to_string(),
            group.map(|group| group.id.to_string()).unwrap_or_default(),
        );
        raw
    }

    #[tokio::test]
    async fn thirteen_posts_paginate_on_all_three_listings() {
        let fx = Fixture::new();
        let author = fx.user("StasBasov").await;
        let group = fx.group("test-slug").await;
        for _ in 0..13 {
            fx.post(&author, Some(&group)).await;
        }

        for (requested, expected) in [(1, 10), (2, 3), (3, 3)] {
            let index = fx.service.index(requested).await.expect("index");
            let by_group = fx
                .service
                .group_posts("test-slug", requested)
                .await
                .expect("group listing");
            let by_author = fx
                .service
                .profile("StasBasov", requested)
                .await
                .expect("profile listing");

            assert_eq!(index.len(), expected, "index page {requested}");
            assert_eq!(by_group.page.len(), expected, "group page {requested}");
            assert_eq!(by_author.page.len(), expected, "profile page {requested}");
        }
    }

    #[tokio::test]
    async fn listings_are_newest_first() {
        let fx = Fixture::new();
        let author = fx.user("StasBasov").await;
        let first = fx.post(&author, None).await;
        let second = fx.post(&author, None).await;

        let page = fx.service.index(1).await.expect("index");
        let ids: Vec<_> = page.items.iter().map(|post| post.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn posts_sharing_a_timestamp_are_listed_by_descending_id() {
        let fx = Fixture::new();
        let author = fx.user("StasBasov").await;
        let group = fx.group("test-slug").await;
        let created_at = Utc::now();
        let mut ids = Vec::new();
        for n in 0..13 {
            let post = fx
                .store
                .insert_post_at(
                    NewPost {
                        text: format!("Тестовый пост {n}"),
                        author_id: author.id,
                        group_id: Some(group.id),
                    },
                    created_at,
                )
                .await
                .expect("post must be created");
            ids.push(post.id);
        }
        ids.reverse();

        let first = fx.service.index(1).await.expect("page 1");
        let second = fx.service.index(2).await.expect("page 2");
        let by_group = fx.service.group_posts("test-slug", 2).await.expect("group page 2");
        let by_author = fx.service.profile("StasBasov", 1).await.expect("profile page 1");

        let page_ids =
            |page: &Page<Post>| page.items.iter().map(|post| post.id).collect::<Vec<_>>();
        assert_eq!(page_ids(&first), &ids[..10]);
        assert_eq!(page_ids(&second), &ids[10..]);
        assert_eq!(page_ids(&by_group.page), &ids[10..]);
        assert_eq!(page_ids(&by_author.page), &ids[..10]);
    }

    #[tokio::test]
    async fn group_listing_excludes_other_groups() {
        let fx = Fixture::new();
        let author = fx.user("StasBasov").await;
        let group = fx.group("test-slug").await;
        let other = fx.group("new_slug").await;
        let post = fx.post(&author, Some(&group)).await;

        let listing = fx.service.group_posts("new_slug", 1).await.expect("listing");
        assert_eq!(listing.group, other);
        assert!(!listing.page.items.contains(&post));

        let listing = fx.service.group_posts("test-slug", 1).await.expect("listing");
        assert_eq!(listing.page.items, vec![post]);
    }

    #[tokio::test]
    async fn profile_listing_excludes_other_authors() {
        let fx = Fixture::new();
        let author = fx.user("HasNoName").await;
        let other = fx.user("NotAuthor").await;
        let own = fx.post(&author, None).await;
        fx.post(&other, None).await;

        let listing = fx.service.profile("HasNoName", 1).await.expect("listing");
        assert_eq!(listing.author, author);
        assert_eq!(listing.page.items, vec![own]);
    }

    #[tokio::test]
    async fn unknown_slug_username_and_post_are_not_found() {
        let fx = Fixture::new();

        let err = fx.service.group_posts("missing", 1).await.expect_err("no group");
        assert!(matches!(err, DomainError::NotFound(_)));
        let err = fx.service.profile("nobody", 1).await.expect_err("no user");
        assert!(matches!(err, DomainError::NotFound(_)));
        let err = fx.service.get_post(404).await.expect_err("no post");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn anonymous_create_redirects_to_login_without_writing() {
        let fx = Fixture::new();
        let group = fx.group("test-slug").await;

        let outcome = fx
            .service
            .create_post(&Actor::Anonymous, &form("Тестовый пост контент 2", Some(&group)))
            .await
            .expect("create");

        assert_eq!(
            outcome,
            FormOutcome::LoginRequired {
                next: Route::PostCreate
            }
        );
        assert_eq!(fx.store.count_posts(PostScope::All).await.ok(), Some(0));
    }

    #[tokio::test]
    async fn create_persists_post_for_actor_and_redirects_to_profile() {
        let fx = Fixture::new();
        let author = fx.user("test-author").await;
        let group = fx.group("test-slug").await;

        let outcome = fx
            .service
            .create_post(&actor(&author), &form("Тестовый пост", Some(&group)))
            .await
            .expect("create");

        assert_eq!(
            outcome,
            FormOutcome::Redirect(Route::Profile {
                username: "test-author".to_string()
            })
        );
        let page = fx.service.index(1).await.expect("index");
        assert_eq!(page.window.total, 1);
        let post = &page.items[0];
        assert_eq!(post.text, "Тестовый пост");
        assert_eq!(post.author_id, author.id);
        assert_eq!(post.group_id, Some(group.id));
    }

    #[tokio::test]
    async fn invalid_create_renders_form_and_does_not_write() {
        let fx = Fixture::new();
        let author = fx.user("test-author").await;

        let outcome = fx
            .service
            .create_post(&actor(&author), &form("   ", None))
            .await
            .expect("create");

        let FormOutcome::Render(form) = outcome else {
            panic!("expected form to be rendered again");
        };
        assert!(!form.is_valid());
        assert_eq!(fx.store.count_posts(PostScope::All).await.ok(), Some(0));
    }

    #[tokio::test]
    async fn create_form_requires_login() {
        let fx = Fixture::new();
        let outcome = fx.service.create_form(&Actor::Anonymous).await.expect("form");
        assert_eq!(
            outcome,
            FormOutcome::LoginRequired {
                next: Route::PostCreate
            }
        );
    }

    #[tokio::test]
    async fn author_edit_moves_post_between_groups() {
        let fx = Fixture::new();
        let author = fx.user("test-author").await;
        let old_group = fx.group("test-slug").await;
        let new_group = fx.group("test-slug2").await;
        let post = fx.post(&author, Some(&old_group)).await;

        let outcome = fx
            .service
            .edit_post(
                &actor(&author),
                post.id,
                &form("Отредактированный текст поста", Some(&new_group)),
            )
            .await
            .expect("edit");

        assert_eq!(outcome, FormOutcome::Redirect(Route::PostDetail { post_id: post.id }));
        let edited = fx.service.get_post(post.id).await.expect("post");
        assert_eq!(edited.text, "Отредактированный текст поста");
        assert_eq!(edited.author_id, post.author_id);
        assert_eq!(edited.created_at, post.created_at);
        assert_eq!(edited.group_id, Some(new_group.id));

        let old = fx.service.group_posts("test-slug", 1).await.expect("old group");
        let new = fx.service.group_posts("test-slug2", 1).await.expect("new group");
        assert_eq!(old.page.window.total, 0);
        assert_eq!(new.page.window.total, 1);
    }

    #[tokio::test]
    async fn non_author_edit_redirects_to_detail_and_keeps_post() {
        let fx = Fixture::new();
        let author = fx.user("HasNoName").await;
        let stranger = fx.user("NotAuthor").await;
        let post = fx.post(&author, None).await;

        let outcome = fx
            .service
            .edit_post(&actor(&stranger), post.id, &form("Чужой текст", None))
            .await
            .expect("edit");
        assert_eq!(outcome, FormOutcome::Redirect(Route::PostDetail { post_id: post.id }));
        assert_eq!(fx.service.get_post(post.id).await.expect("post"), post);

        let outcome = fx.service.edit_form(&actor(&stranger), post.id).await.expect("form");
        assert_eq!(outcome, FormOutcome::Redirect(Route::PostDetail { post_id: post.id }));
    }

    #[tokio::test]
    async fn anonymous_edit_redirects_to_login_even_for_missing_post() {
        let fx = Fixture::new();

        let outcome = fx
            .service
            .edit_post(&Actor::Anonymous, 77, &form("text", None))
            .await
            .expect("edit");
        assert_eq!(
            outcome,
            FormOutcome::LoginRequired {
                next: Route::PostEdit { post_id: 77 }
            }
        );
    }

    #[tokio::test]
    async fn authenticated_edit_of_missing_post_is_not_found() {
        let fx = Fixture::new();
        let author = fx.user("HasNoName").await;

        let err = fx
            .service
            .edit_form(&actor(&author), 77)
            .await
            .expect_err("post is missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn edit_form_is_prefilled_for_author() {
        let fx = Fixture::new();
        let author = fx.user("HasNoName").await;
        let group = fx.group("some-slug").await;
        let post = fx.post(&author, Some(&group)).await;

        let FormOutcome::Render(form) = fx.service.edit_form(&actor(&author), post.id).await.expect("form")
        else {
            panic!("expected form");
        };
        assert_eq!(form.field("text").map(|f| f.value.as_str()), Some("Тестовый пост"));
        assert_eq!(
            form.field("group").map(|f| f.value.clone()),
            Some(group.id.to_string())
        );
    }

    #[tokio::test]
    async fn cached_index_is_refreshed_after_create() {
        let fx = Fixture::with_cache(ListingCache::new(Duration::from_secs(60)));
        let author = fx.user("StasBasov").await;

        assert_eq!(fx.service.index(1).await.expect("index").len(), 0);

        // Written behind the service's back: the cached page is still served.
        fx.post(&author, None).await;
        assert_eq!(fx.service.index(1).await.expect("index").len(), 0);

        fx.service
            .create_post(&actor(&author), &form("Новый пост", None))
            .await
            .expect("create");
        assert_eq!(fx.service.index(1).await.expect("index").len(), 2);

        fx.post(&author, None).await;
        fx.service.invalidate_cache().await;
        assert_eq!(fx.service.index(1).await.expect("index").len(), 3);
    }

    #[tokio::test]
    async fn create_group_checks_slug_and_uniqueness() {
        let fx = Fixture::new();
        let new_group = |slug: &str| NewGroup {
            title: "Лев Толстой".to_string(),
            slug: slug.to_string(),
            description: "Группа любителей".to_string(),
        };

        let group = fx
            .service
            .create_group(new_group("leo"))
            .await
            .expect("group must be created");
        assert_eq!(group.slug, "leo");

        let err = fx
            .service
            .create_group(new_group("Not A Slug"))
            .await
            .expect_err("slug is invalid");
        assert!(matches!(err, DomainError::Validation { field: "slug", .. }));

        let err = fx
            .service
            .create_group(new_group("leo"))
            .await
            .expect_err("slug is taken");
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }
}
