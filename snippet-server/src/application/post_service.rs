use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::data::post_repository::{NewPost, PageRequest, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::pagination::{PaginationInfo, calculate_pagination};
use crate::domain::post::{
    CreatePostRequest, MIN_POST_PASSWORD_CHARS, Post, UpdatePostRequest, Visibility,
};
use crate::infrastructure::password::PasswordHasher;

const USER_POSTS_PATH: &str = "/post/user/all";
const PUBLIC_POSTS_PATH: &str = "/post/all";
const SEARCH_PATH: &str = "/post/search";

#[derive(Debug, Clone)]
pub(crate) struct ListPostsResult {
    pub(crate) posts: Vec<Post>,
    pub(crate) pagination: PaginationInfo,
}

pub(crate) struct PostService<R: PostRepository> {
    repo: R,
    hasher: Arc<dyn PasswordHasher>,
}

impl<R> PostService<R>
where
    R: PostRepository + Clone + 'static,
{
    pub(crate) fn new(repo: R, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repo, hasher }
    }

    pub(crate) async fn create_post(
        &self,
        caller: Option<Uuid>,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        if caller.is_none() && req.visibility == Visibility::Private {
            return Err(DomainError::AccountRequired);
        }
        if req.delete_after_view && req.expiration_at.is_some() {
            return Err(DomainError::DeleteAfterViewConflict);
        }

        let password_hash = if req.has_password {
            let password = req.password.as_deref().unwrap_or_default();
            if password.chars().count() < MIN_POST_PASSWORD_CHARS {
                return Err(DomainError::PasswordTooShort {
                    min: MIN_POST_PASSWORD_CHARS,
                });
            }
            Some(self.hasher.hash(password)?)
        } else {
            None
        };

        let new_post = NewPost {
            owner_id: caller,
            title: req.title,
            content: req.content,
            password_hash,
            has_password: req.has_password,
            visibility: req.visibility,
            expiration_at: req.expiration_at,
            delete_after_view: req.delete_after_view,
        };

        let post = self.repo.insert_post(new_post).await.map_err(|err| match err {
            DomainError::Unexpected(detail) => {
                error!(error = %detail, "failed to persist post");
                DomainError::Unexpected(detail)
            }
            other => other,
        })?;

        debug!(post_id = %post.id, visibility = %post.visibility, "post created");
        Ok(post)
    }

    pub(crate) async fn list_user_posts(
        &self,
        owner_id: Uuid,
        page: Option<&str>,
    ) -> Result<ListPostsResult, DomainError> {
        let count = self.repo.count_by_owner(owner_id).await?;
        let page = calculate_pagination(count, page)?;
        let posts = self
            .repo
            .find_all_by_owner(owner_id, page_request(page.limit, page.offset))
            .await?;

        let pagination = PaginationInfo::build(&page, count, posts.len(), USER_POSTS_PATH);
        Ok(ListPostsResult { posts, pagination })
    }

    pub(crate) async fn list_public_posts(
        &self,
        page: Option<&str>,
    ) -> Result<ListPostsResult, DomainError> {
        let count = self.repo.count_public().await?;
        let page = calculate_pagination(count, page)?;
        let posts = self
            .repo
            .find_all_public(page_request(page.limit, page.offset))
            .await?;

        let pagination = PaginationInfo::build(&page, count, posts.len(), PUBLIC_POSTS_PATH);
        Ok(ListPostsResult { posts, pagination })
    }

    pub(crate) async fn search_posts(
        &self,
        query: &str,
        page: Option<&str>,
    ) -> Result<ListPostsResult, DomainError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::Validation {
                field: "q",
                message: "must not be empty",
            });
        }

        let count = self.repo.count_search(query).await?;
        let page = calculate_pagination(count, page)?;
        let posts = self
            .repo
            .search_public(query, page_request(page.limit, page.offset))
            .await?;

        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let path = format!("{SEARCH_PATH}?q={encoded}");
        let pagination = PaginationInfo::build(&page, count, posts.len(), &path);
        Ok(ListPostsResult { posts, pagination })
    }

    pub(crate) async fn delete_post(&self, caller: Uuid, post_id: Uuid) -> Result<(), DomainError> {
        self.find_owned(caller, post_id).await?;

        let deleted = self.repo.delete_post(post_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }
        Ok(())
    }

    pub(crate) async fn update_post(
        &self,
        caller: Uuid,
        post_id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        self.find_owned(caller, post_id).await?;

        let patch = PostPatch {
            title: req.title,
            content: req.content,
        };
        self.repo
            .update_post(post_id, patch)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {post_id}")))
    }

    /// Reads a single post on behalf of `caller` (`None` for anonymous readers).
    ///
    /// Checks run in a fixed order: expiration, delete-after-view scheduling,
    /// visibility, then the post password. Expired posts are gone for everyone,
    /// and private posts look missing to anyone but their owner.
    pub(crate) async fn get_post(
        &self,
        caller: Option<Uuid>,
        post_id: Uuid,
        password: Option<&str>,
    ) -> Result<Post, DomainError> {
        let post = self
            .repo
            .find_post_by_id(post_id)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {post_id}")))?;

        if post.is_expired_at(Utc::now()) {
            self.spawn_delete(post.id, "expired");
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }

        let outcome = self.authorize_read(&post, caller, password);
        if post.delete_after_view {
            self.spawn_delete(post.id, "delete_after_view");
        }

        outcome.map(|()| post)
    }

    async fn find_owned(&self, caller: Uuid, post_id: Uuid) -> Result<Post, DomainError> {
        let post = self
            .repo
            .find_post_by_id(post_id)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {post_id}")))?;

        if !post.is_owned_by(Some(caller)) {
            return Err(DomainError::Forbidden);
        }
        Ok(post)
    }

    fn authorize_read(
        &self,
        post: &Post,
        caller: Option<Uuid>,
        password: Option<&str>,
    ) -> Result<(), DomainError> {
        if post.visibility == Visibility::Private && !post.is_owned_by(caller) {
            return Err(DomainError::NotFound(format!("post id: {}", post.id)));
        }

        if post.has_password {
            let password_hash = post.password_hash.as_deref().unwrap_or_default();
            self.hasher
                .verify(password.unwrap_or_default(), password_hash)
                .map_err(|err| match err {
                    DomainError::InvalidCredentials => DomainError::Unauthorized,
                    other => other,
                })?;
        }
        Ok(())
    }

    /// Best-effort removal that is not part of the read's result. A failed delete
    /// leaves the row behind; the next read will schedule it again.
    fn spawn_delete(&self, post_id: Uuid, reason: &'static str) {
        let repo = self.repo.clone();
        tokio::spawn(async move {
            match repo.delete_post(post_id).await {
                Ok(true) => debug!(%post_id, reason, "post removed"),
                Ok(false) => debug!(%post_id, reason, "post already removed"),
                Err(err) => warn!(%post_id, reason, error = %err, "background post delete failed"),
            }
        });
    }
}

fn page_request(limit: i64, offset: i64) -> PageRequest {
    PageRequest { limit, offset }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::PostService;
    use crate::application::test_support::PlainPasswordHasher;
    use crate::data::post_repository::{NewPost, PageRequest, PostPatch, PostRepository};
    use crate::domain::error::DomainError;
    use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest, Visibility};
    use crate::infrastructure::password::PasswordHasher;

    #[derive(Clone)]
    struct FakePostRepo {
        created_input: Arc<Mutex<Option<NewPost>>>,
        post_for_get: Arc<Mutex<Option<Post>>>,
        update_call: Arc<Mutex<Option<(Uuid, PostPatch)>>>,
        deleted_ids: Arc<Mutex<Vec<Uuid>>>,
        list_result: Arc<Mutex<Vec<Post>>>,
        count_result: Arc<Mutex<i64>>,
        page_requests: Arc<Mutex<Vec<PageRequest>>>,
        search_queries: Arc<Mutex<Vec<String>>>,
        fail_insert: Arc<Mutex<bool>>,
    }

    impl FakePostRepo {
        fn new() -> Self {
            Self {
                created_input: Arc::new(Mutex::new(None)),
                post_for_get: Arc::new(Mutex::new(None)),
                update_call: Arc::new(Mutex::new(None)),
                deleted_ids: Arc::new(Mutex::new(Vec::new())),
                list_result: Arc::new(Mutex::new(Vec::new())),
                count_result: Arc::new(Mutex::new(0)),
                page_requests: Arc::new(Mutex::new(Vec::new())),
                search_queries: Arc::new(Mutex::new(Vec::new())),
                fail_insert: Arc::new(Mutex::new(false)),
            }
        }

        fn with_post(post: Post) -> Self {
            let repo = Self::new();
            *repo
                .post_for_get
                .lock()
                .expect("post_for_get mutex poisoned") = Some(post);
            repo
        }

        fn with_listing(posts: Vec<Post>, count: i64) -> Self {
            let repo = Self::new();
            *repo.list_result.lock().expect("list_result mutex poisoned") = posts;
            *repo.count_result.lock().expect("count_result mutex poisoned") = count;
            repo
        }

        fn deleted(&self) -> Vec<Uuid> {
            self.deleted_ids
                .lock()
                .expect("deleted_ids mutex poisoned")
                .clone()
        }

        fn listing(&self, page: PageRequest) -> Vec<Post> {
            self.page_requests
                .lock()
                .expect("page_requests mutex poisoned")
                .push(page);
            self.list_result
                .lock()
                .expect("list_result mutex poisoned")
                .clone()
        }

        fn count(&self) -> i64 {
            *self.count_result.lock().expect("count_result mutex poisoned")
        }
    }

    #[async_trait]
    impl PostRepository for FakePostRepo {
        async fn insert_post(&self, input: NewPost) -> Result<Post, DomainError> {
            if *self.fail_insert.lock().expect("fail_insert mutex poisoned") {
                return Err(DomainError::Unexpected("connection reset".to_string()));
            }
            *self
                .created_input
                .lock()
                .expect("created_input mutex poisoned") = Some(input.clone());
            Ok(Post {
                id: Uuid::new_v4(),
                owner_id: input.owner_id,
                title: input.title,
                content: input.content,
                password_hash: input.password_hash,
                has_password: input.has_password,
                visibility: input.visibility,
                created_at: Utc::now(),
                expiration_at: input.expiration_at,
                delete_after_view: input.delete_after_view,
            })
        }

        async fn find_post_by_id(&self, _id: Uuid) -> Result<Option<Post>, DomainError> {
            Ok(self
                .post_for_get
                .lock()
                .expect("post_for_get mutex poisoned")
                .clone())
        }

        async fn find_all_by_owner(
            &self,
            _owner_id: Uuid,
            page: PageRequest,
        ) -> Result<Vec<Post>, DomainError> {
            Ok(self.listing(page))
        }

        async fn find_all_public(&self, page: PageRequest) -> Result<Vec<Post>, DomainError> {
            Ok(self.listing(page))
        }

        async fn count_by_owner(&self, _owner_id: Uuid) -> Result<i64, DomainError> {
            Ok(self.count())
        }

        async fn count_public(&self) -> Result<i64, DomainError> {
            Ok(self.count())
        }

        async fn search_public(
            &self,
            query: &str,
            page: PageRequest,
        ) -> Result<Vec<Post>, DomainError> {
            self.search_queries
                .lock()
                .expect("search_queries mutex poisoned")
                .push(query.to_string());
            Ok(self.listing(page))
        }

        async fn count_search(&self, _query: &str) -> Result<i64, DomainError> {
            Ok(self.count())
        }

        async fn update_post(
            &self,
            id: Uuid,
            patch: PostPatch,
        ) -> Result<Option<Post>, DomainError> {
            *self.update_call.lock().expect("update_call mutex poisoned") =
                Some((id, patch.clone()));
            let mut post = self
                .post_for_get
                .lock()
                .expect("post_for_get mutex poisoned")
                .clone();
            if let Some(post) = post.as_mut() {
                if let Some(title) = patch.title {
                    post.title = title;
                }
                if let Some(content) = patch.content {
                    post.content = content;
                }
            }
            Ok(post)
        }

        async fn delete_post(&self, id: Uuid) -> Result<bool, DomainError> {
            self.deleted_ids
                .lock()
                .expect("deleted_ids mutex poisoned")
                .push(id);
            Ok(true)
        }
    }

    fn service(repo: &FakePostRepo) -> PostService<FakePostRepo> {
        PostService::new(repo.clone(), Arc::new(PlainPasswordHasher))
    }

    async fn settle_background_tasks() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn create_private_post_requires_an_account() {
        let repo = FakePostRepo::new();
        let service = service(&repo);

        let err = service
            .create_post(None, create_request(Visibility::Private))
            .await
            .expect_err("anonymous private post must fail");
        assert!(matches!(err, DomainError::AccountRequired));

        let owner = Uuid::new_v4();
        let created = service
            .create_post(Some(owner), create_request(Visibility::Private))
            .await
            .expect("owner may create private post");
        assert_eq!(created.owner_id, Some(owner));
        assert_eq!(created.visibility, Visibility::Private);
    }

    #[tokio::test]
    async fn anonymous_public_post_has_no_owner() {
        let repo = FakePostRepo::new();
        let service = service(&repo);

        service
            .create_post(None, create_request(Visibility::Unlisted))
            .await
            .expect("anonymous unlisted post is allowed");

        let input = repo
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .clone()
            .expect("repo input must be captured");
        assert!(input.owner_id.is_none());
    }

    #[tokio::test]
    async fn delete_after_view_conflicts_with_expiration() {
        let repo = FakePostRepo::new();
        let service = service(&repo);

        for visibility in [Visibility::Public, Visibility::Unlisted, Visibility::Private] {
            let mut req = create_request(visibility);
            req.delete_after_view = true;
            req.expiration_at = Some(Utc::now() + Duration::hours(1));
            req.has_password = true;
            req.password = Some("secret".to_string());

            let err = service
                .create_post(Some(Uuid::new_v4()), req)
                .await
                .expect_err("must conflict");
            assert!(matches!(err, DomainError::DeleteAfterViewConflict));
        }
        assert!(repo
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .is_none());
    }

    #[tokio::test]
    async fn short_post_password_is_rejected() {
        let repo = FakePostRepo::new();
        let service = service(&repo);

        let mut req = create_request(Visibility::Public);
        req.has_password = true;
        req.password = Some("12".to_string());

        let err = service
            .create_post(None, req)
            .await
            .expect_err("password too short");
        assert!(matches!(err, DomainError::PasswordTooShort { min: 3 }));
    }

    #[tokio::test]
    async fn post_password_is_hashed_and_dropped_when_unused() {
        let repo = FakePostRepo::new();
        let service = service(&repo);

        let mut req = create_request(Visibility::Public);
        req.has_password = true;
        req.password = Some("open-sesame".to_string());
        service
            .create_post(None, req)
            .await
            .expect("create must succeed");
        let input = repo
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .clone()
            .expect("repo input must be captured");
        assert_eq!(input.password_hash.as_deref(), Some("plain:open-sesame"));

        let mut req = create_request(Visibility::Public);
        req.password = Some("ignored".to_string());
        service
            .create_post(None, req)
            .await
            .expect("create must succeed");
        let input = repo
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .clone()
            .expect("repo input must be captured");
        assert!(input.password_hash.is_none());
        assert!(!input.has_password);
    }

    #[tokio::test]
    async fn create_post_hides_persistence_failures() {
        let repo = FakePostRepo::new();
        *repo.fail_insert.lock().expect("fail_insert mutex poisoned") = true;
        let service = service(&repo);

        let err = service
            .create_post(None, create_request(Visibility::Public))
            .await
            .expect_err("insert must fail");
        assert!(matches!(err, DomainError::Unexpected(_)));
    }

    #[tokio::test]
    async fn get_post_returns_not_found_when_missing() {
        let repo = FakePostRepo::new();
        let service = service(&repo);

        let err = service
            .get_post(None, Uuid::new_v4(), None)
            .await
            .expect_err("post must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn expired_post_is_gone_even_for_its_owner() {
        let owner = Uuid::new_v4();
        let mut post = sample_post(Some(owner), Visibility::Private);
        post.expiration_at = Some(Utc::now() - Duration::minutes(1));
        post.has_password = true;
        post.password_hash = Some(PlainPasswordHasher.hash("secret").expect("plain hash"));
        let post_id = post.id;

        let repo = FakePostRepo::with_post(post);
        let service = service(&repo);

        let err = service
            .get_post(Some(owner), post_id, Some("secret"))
            .await
            .expect_err("expired post must be hidden");
        assert!(matches!(err, DomainError::NotFound(_)));

        settle_background_tasks().await;
        assert_eq!(repo.deleted(), vec![post_id]);
    }

    #[tokio::test]
    async fn private_post_is_not_found_for_other_callers() {
        let post = sample_post(Some(Uuid::new_v4()), Visibility::Private);
        let post_id = post.id;
        let repo = FakePostRepo::with_post(post);
        let service = service(&repo);

        for caller in [None, Some(Uuid::new_v4())] {
            let err = service
                .get_post(caller, post_id, None)
                .await
                .expect_err("must be hidden");
            assert!(matches!(err, DomainError::NotFound(_)));
        }
    }

    #[tokio::test]
    async fn private_password_post_does_not_ask_strangers_for_password() {
        let mut post = sample_post(Some(Uuid::new_v4()), Visibility::Private);
        post.has_password = true;
        post.password_hash = Some(PlainPasswordHasher.hash("secret").expect("plain hash"));
        let post_id = post.id;
        let repo = FakePostRepo::with_post(post);
        let service = service(&repo);

        let err = service
            .get_post(Some(Uuid::new_v4()), post_id, Some("wrong"))
            .await
            .expect_err("must be hidden");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn password_protected_post_checks_supplied_password() {
        let mut post = sample_post(None, Visibility::Unlisted);
        post.has_password = true;
        post.password_hash = Some(PlainPasswordHasher.hash("secret").expect("plain hash"));
        let post_id = post.id;
        let repo = FakePostRepo::with_post(post);
        let service = service(&repo);

        for password in [None, Some("wrong")] {
            let err = service
                .get_post(None, post_id, password)
                .await
                .expect_err("wrong password must fail");
            assert!(matches!(err, DomainError::Unauthorized));
        }

        let post = service
            .get_post(None, post_id, Some("secret"))
            .await
            .expect("right password must succeed");
        assert_eq!(post.id, post_id);
        settle_background_tasks().await;
        assert!(repo.deleted().is_empty());
    }

    #[tokio::test]
    async fn delete_after_view_post_is_removed_after_read() {
        let mut post = sample_post(None, Visibility::Public);
        post.delete_after_view = true;
        let post_id = post.id;
        let repo = FakePostRepo::with_post(post);
        let service = service(&repo);

        let post = service
            .get_post(None, post_id, None)
            .await
            .expect("first read must succeed");
        assert_eq!(post.id, post_id);

        settle_background_tasks().await;
        assert_eq!(repo.deleted(), vec![post_id]);
    }

    #[tokio::test]
    async fn delete_after_view_is_scheduled_even_when_read_is_rejected() {
        let mut post = sample_post(None, Visibility::Public);
        post.delete_after_view = true;
        post.has_password = true;
        post.password_hash = Some(PlainPasswordHasher.hash("secret").expect("plain hash"));
        let post_id = post.id;
        let repo = FakePostRepo::with_post(post);
        let service = service(&repo);

        let err = service
            .get_post(None, post_id, Some("wrong"))
            .await
            .expect_err("wrong password must fail");
        assert!(matches!(err, DomainError::Unauthorized));

        settle_background_tasks().await;
        assert_eq!(repo.deleted(), vec![post_id]);
    }

    #[tokio::test]
    async fn delete_post_checks_existence_then_ownership() {
        let repo = FakePostRepo::new();
        let service = service(&repo);
        let err = service
            .delete_post(Uuid::new_v4(), Uuid::new_v4())
            .await
            .expect_err("must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));

        let post = sample_post(Some(Uuid::new_v4()), Visibility::Public);
        let post_id = post.id;
        let repo = FakePostRepo::with_post(post);
        let service = self::service(&repo);
        let err = service
            .delete_post(Uuid::new_v4(), post_id)
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
        assert!(repo.deleted().is_empty());
    }

    #[tokio::test]
    async fn anonymous_post_cannot_be_deleted_by_anyone() {
        let post = sample_post(None, Visibility::Public);
        let post_id = post.id;
        let repo = FakePostRepo::with_post(post);
        let service = service(&repo);

        let err = service
            .delete_post(Uuid::new_v4(), post_id)
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[tokio::test]
    async fn owner_can_delete_post() {
        let owner = Uuid::new_v4();
        let post = sample_post(Some(owner), Visibility::Public);
        let post_id = post.id;
        let repo = FakePostRepo::with_post(post);
        let service = service(&repo);

        service
            .delete_post(owner, post_id)
            .await
            .expect("owner delete must succeed");
        assert_eq!(repo.deleted(), vec![post_id]);
    }

    #[tokio::test]
    async fn update_post_applies_only_supplied_fields() {
        let owner = Uuid::new_v4();
        let post = sample_post(Some(owner), Visibility::Public);
        let post_id = post.id;
        let repo = FakePostRepo::with_post(post);
        let service = service(&repo);

        let req = UpdatePostRequest {
            title: Some("  new title  ".to_string()),
            content: Some("   ".to_string()),
        };
        let updated = service
            .update_post(owner, post_id, req)
            .await
            .expect("update must succeed");
        assert_eq!(updated.title, "new title");
        assert_eq!(updated.content, "content");

        let (id, patch) = repo
            .update_call
            .lock()
            .expect("update_call mutex poisoned")
            .clone()
            .expect("update call must be captured");
        assert_eq!(id, post_id);
        assert_eq!(patch.title.as_deref(), Some("new title"));
        assert!(patch.content.is_none());
    }

    #[tokio::test]
    async fn update_post_returns_forbidden_for_non_owner() {
        let post = sample_post(Some(Uuid::new_v4()), Visibility::Public);
        let post_id = post.id;
        let repo = FakePostRepo::with_post(post);
        let service = service(&repo);

        let err = service
            .update_post(Uuid::new_v4(), post_id, UpdatePostRequest::default())
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
        assert!(repo
            .update_call
            .lock()
            .expect("update_call mutex poisoned")
            .is_none());
    }

    #[tokio::test]
    async fn public_listing_builds_links_for_middle_page() {
        let posts = (0..10)
            .map(|_| sample_post(None, Visibility::Public))
            .collect::<Vec<_>>();
        let repo = FakePostRepo::with_listing(posts, 25);
        let service = service(&repo);

        let result = service
            .list_public_posts(Some("2"))
            .await
            .expect("listing must succeed");

        assert_eq!(result.posts.len(), 10);
        assert_eq!(result.pagination.count, 25);
        assert_eq!(result.pagination.pages, 3);
        assert_eq!(result.pagination.next.as_deref(), Some("/post/all?page=3"));
        assert_eq!(result.pagination.prev.as_deref(), Some("/post/all?page=1"));

        let requests = repo
            .page_requests
            .lock()
            .expect("page_requests mutex poisoned")
            .clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].limit, 10);
        assert_eq!(requests[0].offset, 10);
    }

    #[tokio::test]
    async fn user_listing_past_last_page_is_not_found() {
        let repo = FakePostRepo::with_listing(Vec::new(), 0);
        let service = service(&repo);

        let err = service
            .list_user_posts(Uuid::new_v4(), None)
            .await
            .expect_err("empty listing has no page 1");
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(repo
            .page_requests
            .lock()
            .expect("page_requests mutex poisoned")
            .is_empty());
    }

    #[tokio::test]
    async fn user_listing_uses_owner_path() {
        let owner = Uuid::new_v4();
        let posts = (0..10)
            .map(|_| sample_post(Some(owner), Visibility::Private))
            .collect::<Vec<_>>();
        let repo = FakePostRepo::with_listing(posts, 11);
        let service = service(&repo);

        let result = service
            .list_user_posts(owner, Some("1"))
            .await
            .expect("listing must succeed");
        assert_eq!(
            result.pagination.next.as_deref(),
            Some("/post/user/all?page=2")
        );
        assert!(result.pagination.prev.is_none());
    }

    #[tokio::test]
    async fn search_trims_query_and_encodes_links() {
        let posts = (0..10)
            .map(|_| sample_post(None, Visibility::Public))
            .collect::<Vec<_>>();
        let repo = FakePostRepo::with_listing(posts, 15);
        let service = service(&repo);

        let result = service
            .search_posts("  hello world ", None)
            .await
            .expect("search must succeed");
        assert_eq!(
            result.pagination.next.as_deref(),
            Some("/post/search?q=hello+world&page=2")
        );

        let queries = repo
            .search_queries
            .lock()
            .expect("search_queries mutex poisoned")
            .clone();
        assert_eq!(queries, vec!["hello world".to_string()]);
    }

    #[tokio::test]
    async fn blank_search_is_rejected() {
        let repo = FakePostRepo::new();
        let service = service(&repo);

        let err = service
            .search_posts("   ", None)
            .await
            .expect_err("blank query must fail");
        assert!(matches!(err, DomainError::Validation { field: "q", .. }));
    }

    fn create_request(visibility: Visibility) -> CreatePostRequest {
        CreatePostRequest {
            title: "title".to_string(),
            content: "content".to_string(),
            password: None,
            has_password: false,
            visibility,
            expiration_at: None,
            delete_after_view: false,
        }
    }

    fn sample_post(owner_id: Option<Uuid>, visibility: Visibility) -> Post {
        Post {
            id: Uuid::new_v4(),
            owner_id,
            title: "title".to_string(),
            content: "content".to_string(),
            password_hash: None,
            has_password: false,
            visibility,
            created_at: Utc::now(),
            expiration_at: None,
            delete_after_view: false,
        }
    }
}
