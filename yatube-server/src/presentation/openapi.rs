use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::auth::{
    AuthResponseDto, LoginContext, LoginDto, SignupDto, UserDto,
};
use crate::presentation::handlers::posts::{
    AuthorDto, ChoiceDto, FormFieldDto, GroupDto, GroupListContext, IndexContext, PageDto,
    PostDetailContext, PostDto, PostFormContext, PostFormDto, PostFormSubmission, ProfileContext,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::auth::signup,
        crate::presentation::handlers::auth::login_page,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::posts::index,
        crate::presentation::handlers::posts::group_posts,
        crate::presentation::handlers::posts::profile,
        crate::presentation::handlers::posts::post_detail,
        crate::presentation::handlers::posts::post_create_form,
        crate::presentation::handlers::posts::post_create,
        crate::presentation::handlers::posts::post_edit_form,
        crate::presentation::handlers::posts::post_edit
    ),
    components(
        schemas(
            SignupDto,
            LoginDto,
            AuthResponseDto,
            UserDto,
            LoginContext,
            PostDto,
            GroupDto,
            AuthorDto,
            PageDto,
            FormFieldDto,
            ChoiceDto,
            PostFormDto,
            PostFormSubmission,
            IndexContext,
            GroupListContext,
            ProfileContext,
            PostDetailContext,
            PostFormContext
        )
    ),
    tags(
        (name = "auth", description = "Signup and login"),
        (name = "posts", description = "Post listings, detail and forms")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
