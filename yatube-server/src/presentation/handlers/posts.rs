use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::comment_service::CommentService;
use crate::application::follow_service::FollowService;
use crate::application::group_service::GroupService;
use crate::application::post_service::PostService;
use crate::domain::access::{Actor, Capability, authorize};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostScope};
use crate::domain::user::Author;
use crate::infrastructure::cache::PageCache;
use crate::presentation::dto::{
    GroupListContext, PageQuery, PostDetailContext, PostFormContext, PostListContext,
    ProfileContext,
};
use crate::presentation::forms::{CommentForm, PostForm, PostFormView, UploadLimit};
use crate::presentation::render::{page_response, redirect, render, render_page, templates};
use crate::presentation::urls;
use crate::presentation::utils::{enforce, full_path, request_id};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(group_posts)
        .service(profile)
        .service(post_detail)
        .service(post_create_form)
        .service(post_create)
        .service(post_edit_form)
        .service(post_edit)
        .service(add_comment);
}

/// Home page. Served from the shared page cache while the entry is fresh.
#[get("/")]
async fn index(
    req: HttpRequest,
    cache: web::Data<PageCache>,
    posts: web::Data<PostService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let key = full_path(&req);
    if let Some(body) = cache.get(&key).await {
        return Ok(page_response(body));
    }

    let page_obj = posts.list(PostScope::All, query.number()).await?;
    let body = render(
        templates::INDEX,
        &PostListContext {
            page_obj,
            show_link: true,
        },
    )?;
    cache.insert(key, body.clone()).await;

    Ok(page_response(body))
}

#[get("/group/{slug}/")]
async fn group_posts(
    groups: web::Data<GroupService>,
    posts: web::Data<PostService>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let group = groups.get_by_slug(&path.into_inner()).await?;
    let page_obj = posts.list(PostScope::Group(group.id), query.number()).await?;

    render_page(templates::GROUP_LIST, &GroupListContext { group, page_obj })
}

#[get("/profile/{username}/")]
async fn profile(
    actor: Actor,
    posts: web::Data<PostService>,
    follows: web::Data<FollowService>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let author_page = posts.author_page(&path.into_inner(), query.number()).await?;
    let following = follows
        .is_following(actor.user().map(|u| u.id), author_page.author.id)
        .await?;

    render_page(
        templates::PROFILE,
        &ProfileContext {
            author: Author::from(&author_page.author),
            page_obj: author_page.page,
            posts_count: author_page.posts_count,
            show_link: false,
            following,
        },
    )
}

#[get("/posts/{id}/")]
async fn post_detail(
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let detail = posts.detail(path.into_inner()).await?;

    render_page(
        templates::POST_DETAIL,
        &PostDetailContext {
            post: detail.post,
            posts_count: detail.posts_count,
            comments: detail.comments,
            comment_form: CommentForm::default(),
        },
    )
}

async fn render_post_form(
    groups: &GroupService,
    form: PostFormView,
    post: Option<&Post>,
) -> Result<HttpResponse, DomainError> {
    render_page(
        templates::CREATE_POST,
        &PostFormContext {
            form,
            groups: groups.list().await?,
            is_edit: post.is_some(),
            post_id: post.map(|p| p.id),
        },
    )
}

#[get("/create/")]
async fn post_create_form(
    req: HttpRequest,
    actor: Actor,
    groups: web::Data<GroupService>,
) -> Result<HttpResponse, DomainError> {
    enforce(authorize(&actor, Capability::CreatePost), &req)?;
    render_post_form(&groups, PostFormView::default(), None).await
}

#[post("/create/")]
async fn post_create(
    req: HttpRequest,
    actor: Actor,
    posts: web::Data<PostService>,
    groups: web::Data<GroupService>,
    limit: web::Data<UploadLimit>,
    payload: Multipart,
) -> Result<HttpResponse, DomainError> {
    let user = enforce(authorize(&actor, Capability::CreatePost), &req)?;
    let form = PostForm::from_multipart(payload, limit.0).await?;

    let draft = match form.clean() {
        Ok(draft) => draft,
        Err(errors) => {
            return render_post_form(&groups, PostFormView::bound(&form, errors), None).await;
        }
    };

    match posts.create_post(user.id, draft).await {
        Ok(post) => {
            info!(
                request_id = %request_id(&req),
                username = %user.username,
                post_id = %post.id,
                "post created"
            );
            Ok(redirect(urls::profile(&user.username)))
        }
        Err(DomainError::Validation(errors)) => {
            render_post_form(&groups, PostFormView::bound(&form, errors), None).await
        }
        Err(e) => Err(e),
    }
}

#[get("/posts/{id}/edit/")]
async fn post_edit_form(
    req: HttpRequest,
    actor: Actor,
    posts: web::Data<PostService>,
    groups: web::Data<GroupService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    enforce(authorize(&actor, Capability::SignedIn), &req)?;
    let post = posts.get_post(path.into_inner()).await?;
    enforce(
        authorize(
            &actor,
            Capability::EditPost {
                post_id: post.id,
                author_id: post.author_id,
            },
        ),
        &req,
    )?;

    render_post_form(&groups, PostFormView::from_post(&post), Some(&post)).await
}

#[post("/posts/{id}/edit/")]
async fn post_edit(
    req: HttpRequest,
    actor: Actor,
    posts: web::Data<PostService>,
    groups: web::Data<GroupService>,
    limit: web::Data<UploadLimit>,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> Result<HttpResponse, DomainError> {
    enforce(authorize(&actor, Capability::SignedIn), &req)?;
    let post = posts.get_post(path.into_inner()).await?;
    let user = enforce(
        authorize(
            &actor,
            Capability::EditPost {
                post_id: post.id,
                author_id: post.author_id,
            },
        ),
        &req,
    )?;

    let form = PostForm::from_multipart(payload, limit.0).await?;
    let draft = match form.clean() {
        Ok(draft) => draft,
        Err(errors) => {
            return render_post_form(&groups, PostFormView::bound(&form, errors), Some(&post))
                .await;
        }
    };

    match posts.update_post(post.id, draft).await {
        Ok(updated) => {
            info!(
                request_id = %request_id(&req),
                username = %user.username,
                post_id = %updated.id,
                "post updated"
            );
            Ok(redirect(urls::post_detail(updated.id)))
        }
        Err(DomainError::Validation(errors)) => {
            render_post_form(&groups, PostFormView::bound(&form, errors), Some(&post)).await
        }
        Err(e) => Err(e),
    }
}

#[post("/posts/{id}/comment/")]
async fn add_comment(
    req: HttpRequest,
    actor: Actor,
    posts: web::Data<PostService>,
    comments: web::Data<CommentService>,
    path: web::Path<Uuid>,
    form: Option<web::Form<CommentForm>>,
) -> Result<HttpResponse, DomainError> {
    let user = enforce(authorize(&actor, Capability::Comment), &req)?;
    let post_id = path.into_inner();
    // a body that is not a urlencoded form counts as an empty comment
    let form = form.map(web::Form::into_inner).unwrap_or_default();

    match form.clean() {
        Ok(text) => {
            let comment = comments.add_comment(post_id, user.id, text).await?;
            info!(
                request_id = %request_id(&req),
                username = %user.username,
                comment_id = %comment.id,
                "comment added"
            );
        }
        Err(errors) => {
            // still 404 for a missing post, otherwise back to the page unchanged
            posts.get_post(post_id).await?;
            debug!(post_id = %post_id, ?errors, "empty comment ignored");
        }
    }

    Ok(redirect(urls::post_detail(post_id)))
}
