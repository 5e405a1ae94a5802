//! Page rendering boundary. Templates live outside this service; a rendered
//! page is the template name plus the context handed to it.

use actix_web::HttpResponse;
use actix_web::http::header::{ContentType, LOCATION};
use serde::Serialize;

use crate::domain::error::DomainError;

pub mod templates {
    pub const INDEX: &str = "posts/index.html";
    pub const GROUP_LIST: &str = "posts/group_list.html";
    pub const PROFILE: &str = "posts/profile.html";
    pub const POST_DETAIL: &str = "posts/post_detail.html";
    pub const CREATE_POST: &str = "posts/create_post.html";
    pub const FOLLOW: &str = "posts/follow.html";
    pub const ABOUT_AUTHOR: &str = "about/author.html";
    pub const ABOUT_TECH: &str = "about/tech.html";
    pub const SIGNUP: &str = "users/signup.html";
    pub const LOGIN: &str = "users/login.html";
    pub const LOGGED_OUT: &str = "users/logged_out.html";
}

#[derive(Serialize)]
struct RenderedPage<'a, C: Serialize> {
    template: &'a str,
    context: &'a C,
}

pub fn render<C: Serialize>(template: &str, context: &C) -> Result<String, DomainError> {
    serde_json::to_string(&RenderedPage { template, context })
        .map_err(|e| DomainError::Internal(format!("failed to render {}: {}", template, e)))
}

/// Wrap an already rendered body, e.g. one served from the page cache.
pub fn page_response(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body)
}

pub fn render_page<C: Serialize>(template: &str, context: &C) -> Result<HttpResponse, DomainError> {
    render(template, context).map(page_response)
}

pub fn redirect(location: impl Into<String>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location.into()))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn rendered_page_names_template_and_context() {
        let body = render(templates::INDEX, &json!({ "show_link": true })).unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["template"], "posts/index.html");
        assert_eq!(value["context"]["show_link"], true);
    }
}
