use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::data::comment_repository::CommentRepository;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::CommentView;
use crate::domain::error::{DomainError, FieldErrors};
use crate::domain::pagination::{POSTS_PER_PAGE, Page, PageWindow};
use crate::domain::post::{Post, PostCard, PostChanges, PostScope};
use crate::domain::user::User;
use crate::infrastructure::media::{ImageUpload, MediaStore};

/// A validated post submission.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostCard,
    pub posts_count: u64,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorPage {
    pub author: User,
    pub page: Page<PostCard>,
    pub posts_count: u64,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    comments: Arc<dyn CommentRepository>,
    media: Arc<dyn MediaStore>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        comments: Arc<dyn CommentRepository>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            posts,
            users,
            groups,
            comments,
            media,
        }
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    /// One page of `scope`, newest first. `page` is clamped into range.
    pub async fn list(
        &self,
        scope: PostScope,
        page: Option<i64>,
    ) -> Result<Page<PostCard>, DomainError> {
        let count = self.posts.count(scope).await?;
        let window = PageWindow::resolve(page, count, POSTS_PER_PAGE);
        let items = if count == 0 {
            Vec::new()
        } else {
            self.posts
                .list(scope, window.limit(), window.offset())
                .await?
        };
        Ok(Page::new(items, window))
    }

    pub async fn author_page(
        &self,
        username: &str,
        page: Option<i64>,
    ) -> Result<AuthorPage, DomainError> {
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(username.to_string()))?;
        let page = self.list(PostScope::Author(author.id), page).await?;
        let posts_count = page.count;
        Ok(AuthorPage {
            author,
            page,
            posts_count,
        })
    }

    pub async fn detail(&self, id: Uuid) -> Result<PostDetail, DomainError> {
        let post = self
            .posts
            .find_card(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))?;
        let posts_count = self.posts.count(PostScope::Author(post.author.id)).await?;
        let comments = self.comments.list_for_post(id).await?;
        Ok(PostDetail {
            post,
            posts_count,
            comments,
        })
    }

    #[instrument(skip(self, draft), fields(text_len = draft.text.len()))]
    pub async fn create_post(&self, author_id: Uuid, draft: PostDraft) -> Result<Post, DomainError> {
        self.ensure_group(draft.group_id).await?;
        let image = match &draft.image {
            Some(upload) => Some(self.media.save(upload).await?),
            None => None,
        };
        let post = Post::new(author_id, draft.text, draft.group_id, image.clone());
        match self.posts.create(post).await {
            Ok(post) => Ok(post),
            Err(err) => {
                self.discard_image(image.as_deref()).await;
                Err(err)
            }
        }
    }

    /// Apply an author's changes. Authorization happens before this call.
    #[instrument(skip(self, draft))]
    pub async fn update_post(&self, post_id: Uuid, draft: PostDraft) -> Result<Post, DomainError> {
        self.ensure_group(draft.group_id).await?;
        let image = match &draft.image {
            Some(upload) => Some(self.media.save(upload).await?),
            None => None,
        };
        let changes = PostChanges {
            text: draft.text,
            group_id: draft.group_id,
            image: image.clone(),
        };
        let post = match self.posts.update(post_id, changes).await {
            Ok(Some(post)) => post,
            result => {
                self.discard_image(image.as_deref()).await;
                return Err(result.err().unwrap_or(DomainError::PostNotFound(post_id)));
            }
        };
        info!(post_id = %post.id, "post edited by author");
        Ok(post)
    }

    /// Remove an image stored for a write that did not happen.
    async fn discard_image(&self, reference: Option<&str>) {
        let Some(reference) = reference else {
            return;
        };
        if let Err(err) = self.media.remove(reference).await {
            warn!(image = %reference, error = %err, "orphaned image left in media store");
        }
    }

    async fn ensure_group(&self, group_id: Option<Uuid>) -> Result<(), DomainError> {
        let Some(group_id) = group_id else {
            return Ok(());
        };
        if self.groups.find_by_id(group_id).await?.is_none() {
            let mut errors = FieldErrors::new();
            errors.add(
                "group",
                "Select a valid choice. That choice is not one of the available choices.",
            );
            return Err(DomainError::Validation(errors));
        }
        Ok(())
    }
}
