use actix_web::{HttpRequest, HttpResponse, get, web};
use tracing::info;

use crate::application::follow_service::FollowService;
use crate::application::post_service::PostService;
use crate::domain::access::{Actor, Capability, authorize};
use crate::domain::error::DomainError;
use crate::domain::post::PostScope;
use crate::presentation::dto::{PageQuery, PostListContext};
use crate::presentation::render::{redirect, render_page, templates};
use crate::presentation::urls;
use crate::presentation::utils::{enforce, request_id};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(follow_index)
        .service(profile_follow)
        .service(profile_unfollow);
}

/// Posts by every author the actor follows, newest first.
#[get("/follow/")]
async fn follow_index(
    req: HttpRequest,
    actor: Actor,
    posts: web::Data<PostService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let user = enforce(authorize(&actor, Capability::ViewFeed), &req)?;
    let page_obj = posts
        .list(PostScope::FollowedBy(user.id), query.number())
        .await?;

    render_page(
        templates::FOLLOW,
        &PostListContext {
            page_obj,
            show_link: true,
        },
    )
}

#[get("/profile/{username}/follow/")]
async fn profile_follow(
    req: HttpRequest,
    actor: Actor,
    follows: web::Data<FollowService>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    enforce(authorize(&actor, Capability::SignedIn), &req)?;
    let author = follows.author(&path.into_inner()).await?;
    let user = enforce(
        authorize(
            &actor,
            Capability::Follow {
                author_id: author.id,
                username: &author.username,
            },
        ),
        &req,
    )?;

    if follows.follow(user.id, author.id).await? {
        info!(
            request_id = %request_id(&req),
            username = %user.username,
            author = %author.username,
            "author followed"
        );
    }

    Ok(redirect(urls::profile(&author.username)))
}

#[get("/profile/{username}/unfollow/")]
async fn profile_unfollow(
    req: HttpRequest,
    actor: Actor,
    follows: web::Data<FollowService>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let user = enforce(authorize(&actor, Capability::Unfollow), &req)?;
    let author = follows.author(&path.into_inner()).await?;

    if follows.unfollow(user.id, author.id).await? {
        info!(
            request_id = %request_id(&req),
            username = %user.username,
            author = %author.username,
            "author unfollowed"
        );
    }

    Ok(redirect(urls::profile(&author.username)))
}
