use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use sqlx::PgPool;

use crate::application::auth_service::AuthService;
use crate::application::comment_service::CommentService;
use crate::application::follow_service::FollowService;
use crate::application::group_service::GroupService;
use crate::application::post_service::PostService;
use crate::data::comment_repository::{CommentRepository, PostgresCommentRepository};
use crate::data::follow_repository::{FollowRepository, PostgresFollowRepository};
use crate::data::group_repository::{GroupRepository, PostgresGroupRepository};
use crate::data::post_repository::{PostRepository, PostgresPostRepository};
use crate::data::user_repository::{PostgresUserRepository, UserRepository};
use crate::infrastructure::cache::PageCache;
use crate::infrastructure::media::MediaStore;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::forms::UploadLimit;

/// One handle per record store.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            groups: Arc::new(PostgresGroupRepository::new(pool.clone())),
            posts: Arc::new(PostgresPostRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
            follows: Arc::new(PostgresFollowRepository::new(pool.clone())),
        }
    }
}

/// Everything the handlers pull out of app data.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub posts: PostService,
    pub groups: GroupService,
    pub comments: CommentService,
    pub follows: FollowService,
    pub index_cache: PageCache,
    pub upload_limit: UploadLimit,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        media: Arc<dyn MediaStore>,
        keys: JwtKeys,
        index_cache_ttl: Duration,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            auth: AuthService::new(Arc::clone(&repos.users), keys),
            posts: PostService::new(
                Arc::clone(&repos.posts),
                Arc::clone(&repos.users),
                Arc::clone(&repos.groups),
                Arc::clone(&repos.comments),
                media,
            ),
            groups: GroupService::new(Arc::clone(&repos.groups)),
            comments: CommentService::new(Arc::clone(&repos.posts), Arc::clone(&repos.comments)),
            follows: FollowService::new(Arc::clone(&repos.users), Arc::clone(&repos.follows)),
            index_cache: PageCache::new(index_cache_ttl),
            upload_limit: UploadLimit(max_upload_bytes),
        }
    }

    /// Register every service as app data for the extractors.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.posts.clone()))
            .app_data(web::Data::new(self.groups.clone()))
            .app_data(web::Data::new(self.comments.clone()))
            .app_data(web::Data::new(self.follows.clone()))
            .app_data(web::Data::new(self.index_cache.clone()))
            .app_data(web::Data::new(self.upload_limit));
    }
}
