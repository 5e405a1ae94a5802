use std::collections::BTreeMap;

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::presentation::urls;

/// Field name -> messages, rendered next to the offending form inputs.
/// The `__all__` key holds errors that belong to the form as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub const NON_FIELD: &'static str = "__all__";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("group not found: {0}")]
    GroupNotFound(String),
    #[error("post not found: {0}")]
    PostNotFound(Uuid),
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),
    #[error("a user cannot follow themself")]
    SelfFollow,
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("login required for {next}")]
    Unauthorized { next: String },
    #[error("forbidden, redirecting to {redirect_to}")]
    Forbidden { redirect_to: String },
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::UserNotFound(_)
            | DomainError::GroupNotFound(_)
            | DomainError::PostNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Unauthorized { .. } | DomainError::Forbidden { .. } => StatusCode::FOUND,
            DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            DomainError::UserAlreadyExists(_) => StatusCode::CONFLICT,
            DomainError::SelfFollow | DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            DomainError::UserNotFound(resource) | DomainError::GroupNotFound(resource) => {
                not_found_page(resource)
            }
            DomainError::PostNotFound(id) => not_found_page(&id.to_string()),
            DomainError::Unauthorized { next } => HttpResponse::Found()
                .insert_header((LOCATION, urls::login(next)))
                .finish(),
            DomainError::Forbidden { redirect_to } => HttpResponse::Found()
                .insert_header((LOCATION, redirect_to.as_str()))
                .finish(),
            DomainError::Internal(_) => {
                // the cause is already logged where it happened
                let body = ErrorBody {
                    error: "internal server error",
                    details: None,
                };
                HttpResponse::build(self.status_code()).json(body)
            }
            _ => {
                let message = self.to_string();
                let details = match self {
                    DomainError::Validation(errors) => Some(json!({ "errors": errors })),
                    _ => None,
                };
                let body = ErrorBody {
                    error: message.as_str(),
                    details,
                };
                HttpResponse::build(self.status_code()).json(body)
            }
        }
    }
}

/// The generic not-found page, shared by missing records and unknown routes.
pub fn not_found_page(resource: &str) -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "template": "core/404.html",
        "context": { "path": resource },
    }))
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Internal(format!("database error: {}", err))
    }
}
