use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, Error, HttpRequest, HttpResponse, web};

use crate::domain::error::not_found_page;
use crate::presentation::handlers;
use crate::presentation::middleware::{ActorMiddleware, RequestIdMiddleware, TimingMiddleware};
use crate::presentation::utils::full_path;
use crate::state::AppState;

/// The application with its middleware chain and full route table.
/// CORS is left to the caller since it depends on deployment config.
pub fn build_app(
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
    App::new()
        .wrap(TimingMiddleware)
        .wrap(ActorMiddleware)
        .wrap(RequestIdMiddleware)
        .wrap(Logger::default())
        .wrap(
            DefaultHeaders::new()
                .add(("X-Content-Type-Options", "nosniff"))
                .add(("Referrer-Policy", "same-origin"))
                .add(("Permissions-Policy", "geolocation=()"))
                .add(("Cross-Origin-Opener-Policy", "same-origin")),
        )
        .configure(|cfg| state.register(cfg))
        .configure(configure)
        .default_service(web::to(not_found))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(handlers::health::configure)
        .configure(handlers::posts::configure)
        .configure(handlers::follow::configure)
        .configure(handlers::about::configure)
        .configure(handlers::auth::configure);
}

/// Fallback for any path no handler claims.
async fn not_found(req: HttpRequest) -> HttpResponse {
    not_found_page(&full_path(&req))
}
