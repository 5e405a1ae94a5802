use actix_web::cookie::{Cookie, time::Duration};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::{info, warn};

use crate::application::auth_service::AuthService;
use crate::domain::error::{DomainError, FieldErrors};
use crate::presentation::dto::{EmptyContext, LoginContext, NextQuery, SignupContext};
use crate::presentation::forms::{LoginForm, SignupForm};
use crate::presentation::middleware::SESSION_COOKIE;
use crate::presentation::render::{redirect, render_page, templates};
use crate::presentation::urls;
use crate::presentation::utils::request_id;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(signup_form)
        .service(signup)
        .service(login_form)
        .service(login)
        .service(logout);
}

fn session_cookie(token: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .max_age(Duration::seconds(max_age_secs))
        .finish()
}

/// Redirect that also starts the session.
fn signed_in(auth: &AuthService, token: String, location: &str) -> Result<HttpResponse, DomainError> {
    let mut resp = redirect(location);
    resp.add_cookie(&session_cookie(token, auth.keys().ttl_seconds()))
        .map_err(|err| DomainError::Internal(err.to_string()))?;
    Ok(resp)
}

#[get("/auth/signup/")]
async fn signup_form() -> Result<HttpResponse, DomainError> {
    render_page(templates::SIGNUP, &SignupContext::default())
}

#[post("/auth/signup/")]
async fn signup(
    req: HttpRequest,
    auth: web::Data<AuthService>,
    form: web::Form<SignupForm>,
) -> Result<HttpResponse, DomainError> {
    let form = form.into_inner();
    let rerender = |errors: FieldErrors| {
        render_page(
            templates::SIGNUP,
            &SignupContext {
                username: form.username.clone(),
                email: form.email.clone(),
                errors,
            },
        )
    };

    if let Err(errors) = form.clean() {
        return rerender(errors);
    }

    let user = match auth
        .register(form.username.clone(), form.email.clone(), form.password.clone())
        .await
    {
        Ok(user) => user,
        Err(DomainError::UserAlreadyExists(reason)) => {
            let mut errors = FieldErrors::new();
            let field = if reason.starts_with("email") { "email" } else { "username" };
            errors.add(field, format!("A user with that {} already exists.", field));
            return rerender(errors);
        }
        Err(err) => return Err(err),
    };

    info!(request_id = %request_id(&req), user_id = %user.id, username = %user.username, "user registered");
    let token = auth.issue_token(&user)?;
    signed_in(&auth, token, urls::INDEX)
}

#[get("/auth/login/")]
async fn login_form(query: web::Query<NextQuery>) -> Result<HttpResponse, DomainError> {
    render_page(
        templates::LOGIN,
        &LoginContext {
            next: query.into_inner().next,
            ..LoginContext::default()
        },
    )
}

#[post("/auth/login/")]
async fn login(
    req: HttpRequest,
    auth: web::Data<AuthService>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, DomainError> {
    let form = form.into_inner();
    let rerender = |errors: FieldErrors| {
        render_page(
            templates::LOGIN,
            &LoginContext {
                username: form.username.clone(),
                next: form.next.clone(),
                errors,
            },
        )
    };

    if let Err(errors) = form.clean() {
        return rerender(errors);
    }

    match auth.login(form.username.trim(), &form.password).await {
        Ok((_, token)) => signed_in(&auth, token, urls::safe_next(form.next.as_deref())),
        Err(DomainError::InvalidCredentials) => {
            warn!(request_id = %request_id(&req), username = %form.username, "failed login");
            let mut errors = FieldErrors::new();
            errors.add(
                FieldErrors::NON_FIELD,
                "Please enter a correct username and password. Note that both fields may be case-sensitive.",
            );
            rerender(errors)
        }
        Err(err) => Err(err),
    }
}

#[get("/auth/logout/")]
async fn logout() -> Result<HttpResponse, DomainError> {
    let mut resp = render_page(templates::LOGGED_OUT, &EmptyContext {})?;
    let mut cookie = session_cookie(String::new(), 0);
    cookie.make_removal();
    resp.add_cookie(&cookie)
        .map_err(|err| DomainError::Internal(err.to_string()))?;
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::http::header::LOCATION;
    use actix_web::test;
    use serde_json::Value;

    use super::SESSION_COOKIE;
    use crate::test_utils::{TestApp, app};

    #[actix_web::test]
    async fn signup_starts_a_session() {
        let t = TestApp::new();
        let app = test::init_service(app(t.state.clone())).await;

        let req = test::TestRequest::get().uri("/auth/signup/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["template"], "users/signup.html");

        let req = test::TestRequest::post()
            .uri("/auth/signup/")
            .set_form([
                ("username", "leo"),
                ("email", "leo@example.com"),
                ("password", "war-and-peace"),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "/");
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .unwrap();
        assert!(cookie.http_only().unwrap_or(false));

        let req = test::TestRequest::get()
            .uri("/follow/")
            .cookie(cookie.into_owned())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn duplicate_signup_is_a_field_error() {
        let t = TestApp::new();
        t.user("leo").await;
        let app = test::init_service(app(t.state.clone())).await;

        let req = test::TestRequest::post()
            .uri("/auth/signup/")
            .set_form([
                ("username", "leo"),
                ("email", "other@example.com"),
                ("password", "war-and-peace"),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["template"], "users/signup.html");
        assert!(body["context"]["errors"]["username"].is_array());
        assert_eq!(body["context"]["username"], "leo");
    }

    #[actix_web::test]
    async fn login_honours_local_next_only() {
        let t = TestApp::new();
        t.user("leo").await;
        let app = test::init_service(app(t.state.clone())).await;

        let req = test::TestRequest::get()
            .uri("/auth/login/?next=/create/")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["template"], "users/login.html");
        assert_eq!(body["context"]["next"], "/create/");

        let req = test::TestRequest::post()
            .uri("/auth/login/")
            .set_form([
                ("username", "leo"),
                ("password", "correct-horse"),
                ("next", "/create/"),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "/create/");

        let req = test::TestRequest::post()
            .uri("/auth/login/")
            .set_form([
                ("username", "leo"),
                ("password", "correct-horse"),
                ("next", "https://evil.example/"),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "/");

        let req = test::TestRequest::post()
            .uri("/auth/login/")
            .set_form([
                ("username", "leo"),
                ("password", "correct-horse"),
                ("next", "/\\evil.example"),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "/");
    }

    #[actix_web::test]
    async fn bad_credentials_rerender_login() {
        let t = TestApp::new();
        t.user("leo").await;
        let app = test::init_service(app(t.state.clone())).await;

        let req = test::TestRequest::post()
            .uri("/auth/login/")
            .set_form([("username", "leo"), ("password", "wrong")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.response().cookies().next().is_none());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["template"], "users/login.html");
        assert!(body["context"]["errors"]["__all__"].is_array());
    }

    #[actix_web::test]
    async fn logout_clears_the_session() {
        let t = TestApp::new();
        let leo = t.user("leo").await;
        let app = test::init_service(app(t.state.clone())).await;

        let req = test::TestRequest::get()
            .uri("/auth/logout/")
            .cookie(t.session(&leo))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .unwrap();
        assert_eq!(cookie.value(), "");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["template"], "users/logged_out.html");
    }
}
