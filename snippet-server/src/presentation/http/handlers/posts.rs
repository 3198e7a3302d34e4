use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::application::post_service::ListPostsResult;
use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest, Visibility};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::auth::{
    AuthenticatedUser, MaybeUser, POST_PASSWORD_HEADER,
};
use crate::presentation::http::response::{ApiResponse, Empty};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum VisibilityDto {
    Private,
    #[default]
    Public,
    Unlisted,
}

impl From<VisibilityDto> for Visibility {
    fn from(dto: VisibilityDto) -> Self {
        match dto {
            VisibilityDto::Private => Visibility::Private,
            VisibilityDto::Public => Visibility::Public,
            VisibilityDto::Unlisted => Visibility::Unlisted,
        }
    }
}

impl From<Visibility> for VisibilityDto {
    fn from(visibility: Visibility) -> Self {
        match visibility {
            Visibility::Private => VisibilityDto::Private,
            Visibility::Public => VisibilityDto::Public,
            Visibility::Unlisted => VisibilityDto::Unlisted,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) content: String,
    /// Required (at least 3 characters) when `has_password` is set; ignored otherwise.
    pub(crate) password: Option<String>,
    #[serde(default)]
    pub(crate) has_password: bool,
    #[serde(default)]
    pub(crate) visibility: VisibilityDto,
    pub(crate) expiration_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub(crate) delete_after_view: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdatePostDto {
    #[validate(length(max = 255))]
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct PageQuery {
    pub(crate) page: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct SearchQuery {
    pub(crate) q: Option<String>,
    pub(crate) page: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: Uuid,
    pub(crate) owner_id: Option<Uuid>,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) has_password: bool,
    pub(crate) visibility: VisibilityDto,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) expiration_at: Option<DateTime<Utc>>,
    pub(crate) delete_after_view: bool,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            owner_id: post.owner_id,
            title: post.title,
            content: post.content,
            has_password: post.has_password,
            visibility: post.visibility.into(),
            created_at: post.created_at,
            expiration_at: post.expiration_at,
            delete_after_view: post.delete_after_view,
        }
    }
}

fn listing(result: ListPostsResult) -> ApiResponse<Vec<PostDto>> {
    ApiResponse::new(StatusCode::OK, "Posts retrieved successfully")
        .with_data(result.posts.into_iter().map(PostDto::from).collect())
        .with_info(result.pagination)
}

#[utoipa::path(
    post,
    path = "/api/v1/post/create",
    tag = "posts",
    security(
        (),
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created; the post is returned in `data`", body = PostDto),
        (status = 400, description = "Validation error, password too short or delete-after-view conflict"),
        (status = 401, description = "Private posts require an account, or the token is invalid"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    caller: MaybeUser,
    Json(dto): Json<CreatePostDto>,
) -> AppResult<ApiResponse<PostDto>> {
    dto.validate()?;
    let req = CreatePostRequest {
        title: dto.title,
        content: dto.content,
        password: dto.password,
        has_password: dto.has_password,
        visibility: dto.visibility.into(),
        expiration_at: dto.expiration_at,
        delete_after_view: dto.delete_after_view,
    };

    let post = state.post_service.create_post(caller.user_id(), req).await?;
    Ok(ApiResponse::new(StatusCode::CREATED, "Post created successfully").with_data(post.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/post/all",
    tag = "posts",
    params(
        ("page" = Option<String>, Query, description = "1-based page number, 10 posts per page")
    ),
    responses(
        (status = 200, description = "Public posts in `data`, links in `info`", body = [PostDto]),
        (status = 400, description = "Invalid page"),
        (status = 404, description = "Page out of range"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_public_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<PostDto>>> {
    let result = state
        .post_service
        .list_public_posts(query.page.as_deref())
        .await?;
    Ok(listing(result))
}

#[utoipa::path(
    get,
    path = "/api/v1/post/search",
    tag = "posts",
    params(
        ("q" = String, Query, description = "Case-insensitive text to look for in title or content"),
        ("page" = Option<String>, Query, description = "1-based page number, 10 posts per page")
    ),
    responses(
        (status = 200, description = "Matching public posts in `data`, links in `info`", body = [PostDto]),
        (status = 400, description = "Empty query or invalid page"),
        (status = 404, description = "Page out of range"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn search_posts(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ApiResponse<Vec<PostDto>>> {
    let result = state
        .post_service
        .search_posts(query.q.as_deref().unwrap_or_default(), query.page.as_deref())
        .await?;
    Ok(listing(result))
}

#[utoipa::path(
    get,
    path = "/api/v1/post/user/all",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("page" = Option<String>, Query, description = "1-based page number, 10 posts per page")
    ),
    responses(
        (status = 200, description = "Caller's posts in `data`, links in `info`", body = [PostDto]),
        (status = 400, description = "Invalid page"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Page out of range"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_user_posts(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<PostDto>>> {
    let result = state
        .post_service
        .list_user_posts(auth.user_id, query.page.as_deref())
        .await?;
    Ok(listing(result))
}

#[utoipa::path(
    get,
    path = "/api/v1/post/{id}",
    tag = "posts",
    security(
        (),
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Post id"),
        ("x-post-password" = Option<String>, Header, description = "Password of a protected post")
    ),
    responses(
        (status = 200, description = "Post in `data`", body = PostDto),
        (status = 401, description = "Wrong post password or invalid token"),
        (status = 404, description = "Post not found, expired or private"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> AppResult<ApiResponse<PostDto>> {
    let password = headers
        .get(POST_PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok());

    let post = state
        .post_service
        .get_post(caller.user_id(), id, password)
        .await?;
    Ok(ApiResponse::new(StatusCode::OK, "Post retrieved successfully").with_data(post.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/post/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated; the post is returned in `data`", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdatePostDto>,
) -> AppResult<ApiResponse<PostDto>> {
    dto.validate()?;
    let req = UpdatePostRequest {
        title: dto.title,
        content: dto.content,
    };

    let post = state
        .post_service
        .update_post(auth.user_id, id, req)
        .await?;
    Ok(ApiResponse::new(StatusCode::OK, "Post updated successfully").with_data(post.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/post/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Empty>> {
    state.post_service.delete_post(auth.user_id, id).await?;
    Ok(ApiResponse::new(StatusCode::OK, "Post deleted successfully"))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{CreatePostDto, PostDto, VisibilityDto};
    use crate::domain::post::{Post, Visibility};

    #[test]
    fn create_dto_defaults_to_public_without_extras() {
        let dto: CreatePostDto =
            serde_json::from_str(r#"{"title":"hello","content":"world"}"#).expect("valid json");
        assert_eq!(dto.visibility, VisibilityDto::Public);
        assert!(!dto.has_password);
        assert!(!dto.delete_after_view);
        assert!(dto.expiration_at.is_none());
    }

    #[test]
    fn unknown_visibility_is_rejected() {
        let parsed = serde_json::from_str::<CreatePostDto>(
            r#"{"title":"hello","content":"world","visibility":"secret"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn post_dto_never_exposes_password_hash() {
        let post = Post {
            id: Uuid::new_v4(),
            owner_id: None,
            title: "title".to_string(),
            content: "content".to_string(),
            password_hash: Some("$argon2id$secret".to_string()),
            has_password: true,
            visibility: Visibility::Unlisted,
            created_at: Utc::now(),
            expiration_at: None,
            delete_after_view: false,
        };

        let json = serde_json::to_string(&PostDto::from(post)).expect("serializable");
        assert!(!json.contains("argon2"));
        assert!(json.contains(r#""has_password":true"#));
        assert!(json.contains(r#""visibility":"unlisted""#));
    }
}
