use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::app_error::ErrorBody;
use crate::presentation::http::handlers::auth::{
    ForgotPasswordDto, RefreshTokenDto, ResetPasswordDto, SigninDto, SigninResponseDto, SignupDto,
    TokenPairDto, UserDto,
};
use crate::presentation::http::handlers::health::HealthDto;
use crate::presentation::http::handlers::posts::{
    CreatePostDto, PageQuery, PostDto, SearchQuery, UpdatePostDto, VisibilityDto,
};
use crate::presentation::http::response::PaginationInfoDto;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "snippet-server",
        description = "Paste and snippet sharing API. Successful responses are wrapped as \
                       {status, message, info?, data?}; failures as {error, message}."
    ),
    paths(
        crate::presentation::http::handlers::health::healthz,
        crate::presentation::http::handlers::auth::signup,
        crate::presentation::http::handlers::auth::signin,
        crate::presentation::http::handlers::auth::refresh_token,
        crate::presentation::http::handlers::auth::forgot_password,
        crate::presentation::http::handlers::auth::reset_password,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::list_public_posts,
        crate::presentation::http::handlers::posts::search_posts,
        crate::presentation::http::handlers::posts::list_user_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::delete_post
    ),
    components(
        schemas(
            ErrorBody,
            PaginationInfoDto,
            HealthDto,
            SignupDto,
            SigninDto,
            RefreshTokenDto,
            ForgotPasswordDto,
            ResetPasswordDto,
            UserDto,
            TokenPairDto,
            SigninResponseDto,
            VisibilityDto,
            CreatePostDto,
            UpdatePostDto,
            PageQuery,
            SearchQuery,
            PostDto
        )
    ),
    tags(
        (name = "health", description = "Liveness and database reachability"),
        (name = "auth", description = "Accounts, sessions and password reset"),
        (name = "posts", description = "Snippet endpoints")
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
                    .bearer_format("PASETO-style v2.local")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
