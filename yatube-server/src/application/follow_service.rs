use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::data::follow_repository::FollowRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::follow::Follow;
use crate::domain::user::User;

#[derive(Clone)]
pub struct FollowService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl FollowService {
    pub fn new(users: Arc<dyn UserRepository>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { users, follows }
    }

    pub async fn author(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(username.to_string()))
    }

    /// Idempotent; returns true if a new edge was created.
    #[instrument(skip(self))]
    pub async fn follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let created = self.follows.create(Follow::new(user_id, author_id)?).await?;
        if !created {
            debug!("already following");
        }
        Ok(created)
    }

    /// Removing a missing edge is a no-op.
    #[instrument(skip(self))]
    pub async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        self.follows.delete(user_id, author_id).await
    }

    pub async fn is_following(
        &self,
        viewer: Option<Uuid>,
        author_id: Uuid,
    ) -> Result<bool, DomainError> {
        match viewer {
            Some(user_id) => self.follows.exists(user_id, author_id).await,
            None => Ok(false),
        }
    }
}
