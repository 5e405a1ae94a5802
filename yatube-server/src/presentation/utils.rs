use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{Ready, ready};

use crate::domain::access::{Actor, AuthenticatedUser, Decision, Denial};
use crate::domain::error::DomainError;
use crate::presentation::middleware::RequestId;
use crate::presentation::urls;

/// The actor resolved by `ActorMiddleware`; anonymous when nothing was resolved.
impl FromRequest for Actor {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(req.extensions().get::<Actor>().cloned().unwrap_or_default()))
    }
}

/// Turn an authorization decision into the user to act as, or the redirect
/// every protected page answers a denial with.
pub fn enforce(decision: Decision, req: &HttpRequest) -> Result<AuthenticatedUser, DomainError> {
    match decision {
        Decision::Allow(user) => Ok(user),
        Decision::Deny(Denial::Anonymous) => Err(DomainError::Unauthorized {
            next: full_path(req),
        }),
        Decision::Deny(Denial::NotAuthor { post_id }) => Err(DomainError::Forbidden {
            redirect_to: urls::post_detail(post_id),
        }),
        Decision::Deny(Denial::SelfFollow { username }) => Err(DomainError::Forbidden {
            redirect_to: urls::profile(&username),
        }),
    }
}

/// Path plus query string, as the client asked for it.
pub fn full_path(req: &HttpRequest) -> String {
    req.uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| req.path().to_owned())
}

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}
