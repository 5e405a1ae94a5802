use std::sync::Arc;

use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::{error::DomainError, user::User};
use crate::infrastructure::security::{JwtKeys, hash_password, verify_password};

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    /// Resolve a session token to its user. Any failure means "anonymous".
    pub async fn user_for_token(&self, token: &str) -> Option<User> {
        let claims = self.keys.verify_token(token).ok()?;
        let user_id = Uuid::parse_str(&claims.sub).ok()?;
        match self.repo.find_by_id(user_id).await {
            Ok(user) => user,
            Err(err) => {
                error!(user_id = %user_id, error = %err, "session lookup failed, treating actor as anonymous");
                None
            }
        }
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<User, DomainError> {
        let hash =
            hash_password(&password).map_err(|err| DomainError::Internal(err.to_string()))?;
        let user = User::new(username, email.to_lowercase(), hash);
        self.repo.create(user).await
    }

    /// Check credentials and issue a session token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String), DomainError> {
        let user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !valid {
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, "user logged in");
        Ok((user, token))
    }

    pub fn issue_token(&self, user: &User) -> Result<String, DomainError> {
        self.keys
            .generate_token(user.id)
            .map_err(|err| DomainError::Internal(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryStore::new()),
            JwtKeys::new("test-secret".into(), 1),
        )
    }

    #[tokio::test]
    async fn register_then_login() {
        let auth = service();
        let user = auth
            .register("leo".into(), "Leo@Example.com".into(), "war-and-peace".into())
            .await
            .unwrap();
        assert_eq!(user.email, "leo@example.com");

        let (logged_in, token) = auth.login("leo", "war-and-peace").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(auth.user_for_token(&token).await.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = service();
        auth.register("leo".into(), "leo@example.com".into(), "right".into())
            .await
            .unwrap();
        assert!(matches!(
            auth.login("leo", "wrong").await,
            Err(DomainError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody", "right").await,
            Err(DomainError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn garbage_token_is_anonymous() {
        assert!(service().user_for_token("not-a-jwt").await.is_none());
    }

    struct UnreachableUsers;

    #[async_trait::async_trait]
    impl UserRepository for UnreachableUsers {
        async fn create(&self, _: User) -> Result<User, DomainError> {
            Err(DomainError::Internal("database down".into()))
        }
        async fn find_by_username(&self, _: &str) -> Result<Option<User>, DomainError> {
            Err(DomainError::Internal("database down".into()))
        }
        async fn find_by_id(&self, _: Uuid) -> Result<Option<User>, DomainError> {
            Err(DomainError::Internal("database down".into()))
        }
    }

    #[tokio::test]
    async fn database_failure_during_session_lookup_is_anonymous() {
        let keys = JwtKeys::new("test-secret".into(), 1);
        let token = keys.generate_token(Uuid::new_v4()).unwrap();
        let auth = AuthService::new(Arc::new(UnreachableUsers), keys);
        assert!(auth.user_for_token(&token).await.is_none());
    }
}
