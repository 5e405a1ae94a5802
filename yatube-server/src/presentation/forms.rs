//! Typed form inputs. Each form validates into either a value the services
//! accept or a [`FieldErrors`] list the page re-renders with.

use std::borrow::Cow;

use actix_multipart::{Multipart, MultipartError};
use futures_util::StreamExt;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::application::post_service::PostDraft;
use crate::domain::error::{DomainError, FieldErrors};
use crate::domain::post::Post;
use crate::infrastructure::media::ImageUpload;

const REQUIRED: &str = "This field is required.";
const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";
const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
const MAX_TEXT_FIELD_BYTES: usize = 1024 * 1024;

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed(REQUIRED)));
    }
    Ok(())
}

fn valid_username(value: &str) -> Result<(), ValidationError> {
    let ok = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if !ok {
        return Err(ValidationError::new("username").with_message(Cow::Borrowed(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        )));
    }
    Ok(())
}

fn message_for(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "email" => "Enter a valid email address.".to_string(),
        "length" => "Ensure this value has a valid length.".to_string(),
        code => format!("Invalid value ({}).", code),
    }
}

fn to_field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    for (field, list) in errors.field_errors() {
        for error in list.iter() {
            out.add(&field, message_for(error));
        }
    }
    out
}

fn malformed(err: MultipartError) -> DomainError {
    let mut errors = FieldErrors::new();
    errors.add(
        FieldErrors::NON_FIELD,
        format!("Malformed form submission: {}", err),
    );
    DomainError::Validation(errors)
}

/// Largest accepted image upload, in bytes.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

/// A file part exactly as it arrived.
#[derive(Debug, Clone, Default)]
pub struct RawUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub oversized: bool,
}

/// Post create/edit submission (`multipart/form-data`: text, group, image).
#[derive(Debug, Clone, Default, Validate)]
pub struct PostForm {
    #[validate(custom(function = "non_blank"))]
    pub text: String,
    /// Group id, or empty for "no group".
    pub group: String,
    pub image: Option<RawUpload>,
}

impl PostForm {
    pub async fn from_multipart(
        mut payload: Multipart,
        max_upload: usize,
    ) -> Result<Self, DomainError> {
        let mut form = PostForm::default();

        while let Some(item) = payload.next().await {
            let mut field = item.map_err(malformed)?;
            let (name, filename) = match field.content_disposition() {
                Some(cd) => (
                    cd.get_name().map(str::to_owned),
                    cd.get_filename().map(str::to_owned),
                ),
                None => (None, None),
            };
            let is_image = name.as_deref() == Some("image");
            let limit = if is_image { max_upload } else { MAX_TEXT_FIELD_BYTES };

            let mut bytes = Vec::new();
            let mut oversized = false;
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(malformed)?;
                if oversized || bytes.len() + chunk.len() > limit {
                    oversized = true;
                    continue;
                }
                bytes.extend_from_slice(&chunk);
            }

            if oversized && !is_image {
                let mut errors = FieldErrors::new();
                errors.add(FieldErrors::NON_FIELD, "Form field too large.");
                return Err(DomainError::Validation(errors));
            }

            match name.as_deref() {
                Some("text") => form.text = String::from_utf8_lossy(&bytes).into_owned(),
                Some("group") => form.group = String::from_utf8_lossy(&bytes).trim().to_string(),
                Some("image") => {
                    let filename = filename.unwrap_or_default();
                    // browsers send an empty part when no file was chosen
                    if !(filename.is_empty() && bytes.is_empty()) {
                        form.image = Some(RawUpload {
                            filename,
                            bytes,
                            oversized,
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    pub fn clean(&self) -> Result<PostDraft, FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => to_field_errors(&e),
        };

        let group_id = match self.group.trim() {
            "" => None,
            raw => match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("group", INVALID_CHOICE);
                    None
                }
            },
        };

        let image = match &self.image {
            Some(upload) => match clean_image(upload) {
                Ok(image) => Some(image),
                Err(message) => {
                    errors.add("image", message);
                    None
                }
            },
            None => None,
        };

        errors.into_result()?;
        Ok(PostDraft {
            text: self.text.trim().to_string(),
            group_id,
            image,
        })
    }
}

fn clean_image(upload: &RawUpload) -> Result<ImageUpload, &'static str> {
    if upload.oversized {
        return Err("The uploaded file is too large.");
    }
    if upload.bytes.is_empty() {
        return Err("The submitted file is empty.");
    }
    let extension = match image::guess_format(&upload.bytes) {
        Ok(ImageFormat::Png) => "png",
        Ok(ImageFormat::Jpeg) => "jpg",
        Ok(ImageFormat::Gif) => "gif",
        Ok(ImageFormat::WebP) => "webp",
        _ => return Err(INVALID_IMAGE),
    };
    Ok(ImageUpload {
        filename: upload.filename.clone(),
        extension,
        bytes: upload.bytes.clone(),
    })
}

/// What the post form template shows: current values and their errors.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostFormView {
    pub text: String,
    pub group: Option<String>,
    pub image: Option<String>,
    pub errors: FieldErrors,
}

impl PostFormView {
    pub fn bound(form: &PostForm, errors: FieldErrors) -> Self {
        Self {
            text: form.text.clone(),
            group: Some(form.group.clone()).filter(|g| !g.is_empty()),
            image: None,
            errors,
        }
    }

    pub fn from_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id.map(|id| id.to_string()),
            image: post.image.clone(),
            errors: FieldErrors::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(custom(function = "non_blank"))]
    pub text: String,
}

impl CommentForm {
    pub fn clean(&self) -> Result<String, FieldErrors> {
        self.validate().map_err(|e| to_field_errors(&e))?;
        Ok(self.text.trim().to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 150), custom(function = "valid_username"))]
    pub username: String,
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "This password is too short. It must contain at least 8 characters."))]
    pub password: String,
}

impl SignupForm {
    pub fn clean(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(|e| to_field_errors(&e))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(custom(function = "non_blank"))]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "non_blank"))]
    pub password: String,
    pub next: Option<String>,
}

impl LoginForm {
    pub fn clean(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(|e| to_field_errors(&e))
    }
}
