//! Fixtures for HTTP-level tests: the full app wired to in-memory stores.

use std::sync::Arc;
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, Error};
use uuid::Uuid;

use crate::data::group_repository::GroupRepository;
use crate::data::memory::MemoryStore;
use crate::data::post_repository::PostRepository;
use crate::domain::group::Group;
use crate::domain::post::Post;
use crate::domain::user::User;
use crate::infrastructure::media::memory::MemoryMediaStore;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::middleware::SESSION_COOKIE;
use crate::presentation::routes::build_app;
use crate::state::{AppState, Repositories};

pub const BOUNDARY: &str = "----yatube-test-boundary";
pub const MAX_UPLOAD: usize = 64 * 1024;

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub media: Arc<MemoryMediaStore>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let media = Arc::new(MemoryMediaStore::default());
        let repos = Repositories {
            users: store.clone(),
            groups: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            follows: store.clone(),
        };
        let state = AppState::new(
            repos,
            media.clone(),
            JwtKeys::new("test-secret".into(), 1),
            Duration::from_secs(20),
            MAX_UPLOAD,
        );
        Self {
            store,
            media,
            state,
        }
    }

    pub async fn user(&self, username: &str) -> User {
        self.state
            .auth
            .register(
                username.into(),
                format!("{}@example.com", username),
                "correct-horse".into(),
            )
            .await
            .unwrap()
    }

    /// Session cookie for an already registered user.
    pub fn session(&self, user: &User) -> Cookie<'static> {
        let token = self.state.auth.issue_token(user).unwrap();
        Cookie::new(SESSION_COOKIE, token)
    }

    pub async fn group(&self, title: &str, slug: &str) -> Group {
        GroupRepository::create(
            &*self.store,
            Group::new(title.into(), slug.into(), format!("about {}", title)),
        )
        .await
        .unwrap()
    }

    pub async fn post(&self, author: &User, text: &str, group_id: Option<Uuid>) -> Post {
        PostRepository::create(
            &*self.store,
            Post::new(author.id, text.into(), group_id, None),
        )
        .await
        .unwrap()
    }
}

/// The full application over `state`.
pub fn app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    build_app(state)
}

/// A `multipart/form-data` body with text fields and an optional file part
/// named `image`. Returns the content type header value and the body.
pub fn multipart(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}
