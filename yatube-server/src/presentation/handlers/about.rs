use actix_web::{HttpResponse, get, web};

use crate::domain::error::DomainError;
use crate::presentation::dto::EmptyContext;
use crate::presentation::render::{render_page, templates};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(author)
        .service(tech);
}

#[get("/about/author/")]
async fn author() -> Result<HttpResponse, DomainError> {
    render_page(templates::ABOUT_AUTHOR, &EmptyContext {})
}

#[get("/about/tech/")]
async fn tech() -> Result<HttpResponse, DomainError> {
    render_page(templates::ABOUT_TECH, &EmptyContext {})
}

#[cfg(test)]
mod tests {
    use actix_web::test;
    use serde_json::Value;

    use crate::test_utils::{TestApp, app};

    #[actix_web::test]
    async fn static_pages_render_their_templates() {
        let t = TestApp::new();
        let app = test::init_service(app(t.state.clone())).await;

        for (uri, template) in [
            ("/about/author/", "about/author.html"),
            ("/about/tech/", "about/tech.html"),
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["template"], template);
        }
    }
}
