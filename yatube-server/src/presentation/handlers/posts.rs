use std::collections::HashMap;

use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::blog_service::{FormOutcome, GroupListing, ProfileListing};
use crate::domain::actor::Actor;
use crate::domain::form::{BoundField, Choice, FieldKind, PostForm};
use crate::domain::group::Group;
use crate::domain::pagination::{Page, requested_page};
use crate::domain::post::Post;
use crate::domain::user::User;
use crate::presentation::AppState;
use crate::presentation::app_error::{AppError, AppResult};
use crate::presentation::render::{
    CREATE_POST_TEMPLATE, GROUP_LIST_TEMPLATE, INDEX_TEMPLATE, POST_DETAIL_TEMPLATE,
    PROFILE_TEMPLATE, Rendered, found,
};

#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    pub(crate) page: Option<String>,
}

impl PageQuery {
    fn requested(&self) -> u64 {
        requested_page(self.page.as_deref())
    }
}

/// Fields accepted by `/create/` and `/posts/{id}/edit/`; documentation only,
/// the handlers bind the raw form map.
#[derive(Debug, ToSchema)]
pub(crate) struct PostFormSubmission {
    pub(crate) text: String,
    /// Group id; empty for no group.
    pub(crate) group: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) author_id: i64,
    pub(crate) group_id: Option<i64>,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct GroupDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) description: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorDto {
    pub(crate) id: i64,
    pub(crate) username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PageDto {
    pub(crate) object_list: Vec<PostDto>,
    pub(crate) number: u64,
    pub(crate) num_pages: u64,
    pub(crate) count: u64,
    pub(crate) per_page: u32,
    pub(crate) has_next: bool,
    pub(crate) has_previous: bool,
    pub(crate) next_page_number: Option<u64>,
    pub(crate) previous_page_number: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct FormFieldDto {
    pub(crate) name: String,
    /// `char` or `choice`.
    pub(crate) kind: String,
    pub(crate) required: bool,
    pub(crate) value: String,
    pub(crate) errors: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ChoiceDto {
    pub(crate) value: String,
    pub(crate) label: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostFormDto {
    pub(crate) fields: Vec<FormFieldDto>,
    pub(crate) group_choices: Vec<ChoiceDto>,
    pub(crate) is_valid: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct IndexContext {
    pub(crate) page_obj: PageDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct GroupListContext {
    pub(crate) group: GroupDto,
    pub(crate) page_obj: PageDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProfileContext {
    pub(crate) author: AuthorDto,
    pub(crate) page_obj: PageDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailContext {
    pub(crate) post: PostDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostFormContext {
    pub(crate) form: PostFormDto,
    pub(crate) is_edit: bool,
    pub(crate) post_id: Option<i64>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            text: post.text,
            author_id: post.author_id,
            group_id: post.group_id,
            created_at: post.created_at,
        }
    }
}

impl From<Group> for GroupDto {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        }
    }
}

impl From<User> for AuthorDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

impl From<Page<Post>> for PageDto {
    fn from(page: Page<Post>) -> Self {
        let page = page.map(PostDto::from);
        Self {
            number: page.number(),
            num_pages: page.window.num_pages,
            count: page.window.total,
            per_page: page.window.per_page,
            has_next: page.has_next(),
            has_previous: page.has_previous(),
            next_page_number: page.next_page_number(),
            previous_page_number: page.previous_page_number(),
            object_list: page.items,
        }
    }
}

impl From<BoundField> for FormFieldDto {
    fn from(field: BoundField) -> Self {
        let kind = match field.kind {
            FieldKind::Char => "char",
            FieldKind::Choice => "choice",
        };
        Self {
            name: field.name.to_string(),
            kind: kind.to_string(),
            required: field.required,
            value: field.value,
            errors: field.errors.into_iter().map(str::to_string).collect(),
        }
    }
}

impl From<Choice> for ChoiceDto {
    fn from(choice: Choice) -> Self {
        Self {
            value: choice.value,
            label: choice.label,
        }
    }
}

impl From<PostForm> for PostFormDto {
    fn from(form: PostForm) -> Self {
        let is_valid = form.is_valid();
        Self {
            fields: form.fields.into_iter().map(FormFieldDto::from).collect(),
            group_choices: form.group_choices.into_iter().map(ChoiceDto::from).collect(),
            is_valid,
        }
    }
}

impl From<GroupListing> for GroupListContext {
    fn from(listing: GroupListing) -> Self {
        Self {
            group: listing.group.into(),
            page_obj: listing.page.into(),
        }
    }
}

impl From<ProfileListing> for ProfileContext {
    fn from(listing: ProfileListing) -> Self {
        Self {
            author: listing.author.into(),
            page_obj: listing.page.into(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "posts",
    params(
        ("page" = Option<String>, Query, description = "Page number, 1-based; out-of-range values are clipped")
    ),
    responses(
        (status = 200, description = "posts/index.html", body = IndexContext),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Rendered<IndexContext>> {
    let page = state.blog_service.index(query.requested()).await?;

    Ok(Rendered::new(
        INDEX_TEMPLATE,
        IndexContext {
            page_obj: page.into(),
        },
    ))
}

#[utoipa::path(
    get,
    path = "/group/{slug}/",
    tag = "posts",
    params(
        ("slug" = String, Path, description = "Group slug"),
        ("page" = Option<String>, Query, description = "Page number, 1-based")
    ),
    responses(
        (status = 200, description = "posts/group_list.html", body = GroupListContext),
        (status = 404, description = "Unknown slug")
    )
)]
pub(crate) async fn group_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Rendered<GroupListContext>> {
    let listing = state
        .blog_service
        .group_posts(&slug, query.requested())
        .await?;

    Ok(Rendered::new(GROUP_LIST_TEMPLATE, listing.into()))
}

#[utoipa::path(
    get,
    path = "/profile/{username}/",
    tag = "posts",
    params(
        ("username" = String, Path, description = "Author username"),
        ("page" = Option<String>, Query, description = "Page number, 1-based")
    ),
    responses(
        (status = 200, description = "posts/profile.html", body = ProfileContext),
        (status = 404, description = "Unknown username")
    )
)]
pub(crate) async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Rendered<ProfileContext>> {
    let listing = state
        .blog_service
        .profile(&username, query.requested())
        .await?;

    Ok(Rendered::new(PROFILE_TEMPLATE, listing.into()))
}

#[utoipa::path(
    get,
    path = "/posts/{id}/",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "posts/post_detail.html", body = PostDetailContext),
        (status = 404, description = "Unknown post")
    )
)]
pub(crate) async fn post_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Rendered<PostDetailContext>> {
    let post = state.blog_service.get_post(parse_post_id(&id)?).await?;

    Ok(Rendered::new(
        POST_DETAIL_TEMPLATE,
        PostDetailContext { post: post.into() },
    ))
}

#[utoipa::path(
    get,
    path = "/create/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "posts/create_post.html with is_edit=false", body = PostFormContext),
        (status = 302, description = "Anonymous visitor sent to login")
    )
)]
pub(crate) async fn post_create_form(
    State(state): State<AppState>,
    actor: Actor,
) -> AppResult<Response> {
    let outcome = state.blog_service.create_form(&actor).await?;
    Ok(form_response(outcome, None))
}

#[utoipa::path(
    post,
    path = "/create/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body(content = PostFormSubmission, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Created, redirect to the author's profile; or login redirect"),
        (status = 200, description = "Form re-rendered with field errors", body = PostFormContext)
    )
)]
pub(crate) async fn post_create(
    State(state): State<AppState>,
    actor: Actor,
    Form(raw): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    let outcome = state.blog_service.create_post(&actor, &raw).await?;
    Ok(form_response(outcome, None))
}

#[utoipa::path(
    get,
    path = "/posts/{id}/edit/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "posts/create_post.html with is_edit=true", body = PostFormContext),
        (status = 302, description = "Login redirect, or non-author sent to post detail"),
        (status = 404, description = "Unknown post")
    )
)]
pub(crate) async fn post_edit_form(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let post_id = parse_post_id(&id)?;
    let outcome = state.blog_service.edit_form(&actor, post_id).await?;
    Ok(form_response(outcome, Some(post_id)))
}

#[utoipa::path(
    post,
    path = "/posts/{id}/edit/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body(content = PostFormSubmission, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Updated or refused, redirect to post detail; or login redirect"),
        (status = 200, description = "Form re-rendered with field errors", body = PostFormContext),
        (status = 404, description = "Unknown post")
    )
)]
pub(crate) async fn post_edit(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Form(raw): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    let post_id = parse_post_id(&id)?;
    let outcome = state.blog_service.edit_post(&actor, post_id, &raw).await?;
    Ok(form_response(outcome, Some(post_id)))
}

/// Ids that are not integers name no post at all.
fn parse_post_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(AppError::NotFound)
}

fn form_response(outcome: FormOutcome, editing: Option<i64>) -> Response {
    match outcome {
        FormOutcome::Render(form) => Rendered::new(
            CREATE_POST_TEMPLATE,
            PostFormContext {
                form: form.into(),
                is_edit: editing.is_some(),
                post_id: editing,
            },
        )
        .into_response(),
        FormOutcome::Redirect(route) => found(route.to_string()),
        FormOutcome::LoginRequired { next } => found(next.login_redirect()),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_post_id;

    #[test]
    fn post_id_must_be_a_positive_integer() {
        assert_eq!(parse_post_id("12").ok(), Some(12));
        assert!(parse_post_id("abc").is_err());
        assert!(parse_post_id("0").is_err());
        assert!(parse_post_id("-1").is_err());
    }
}
