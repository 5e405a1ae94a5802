use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::comment::CommentView;
use crate::domain::error::FieldErrors;
use crate::domain::group::Group;
use crate::domain::pagination::{Page, parse_page_number};
use crate::domain::post::PostCard;
use crate::domain::user::Author;
use crate::presentation::forms::{CommentForm, PostFormView};

// ======================= QUERIES =======================

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn number(&self) -> Option<i64> {
        parse_page_number(self.page.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// ======================= POSTS =======================

#[derive(Debug, Serialize)]
pub struct PostListContext {
    pub page_obj: Page<PostCard>,
    pub show_link: bool,
}

#[derive(Debug, Serialize)]
pub struct GroupListContext {
    pub group: Group,
    pub page_obj: Page<PostCard>,
}

#[derive(Debug, Serialize)]
pub struct ProfileContext {
    pub author: Author,
    pub page_obj: Page<PostCard>,
    pub posts_count: u64,
    pub show_link: bool,
    pub following: bool,
}

#[derive(Debug, Serialize)]
pub struct PostDetailContext {
    pub post: PostCard,
    pub posts_count: u64,
    pub comments: Vec<CommentView>,
    pub comment_form: CommentForm,
}

#[derive(Debug, Serialize)]
pub struct PostFormContext {
    pub form: PostFormView,
    pub groups: Vec<Group>,
    pub is_edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<Uuid>,
}

// ======================= AUTH =======================

#[derive(Debug, Default, Serialize)]
pub struct SignupContext {
    pub username: String,
    pub email: String,
    pub errors: FieldErrors,
}

#[derive(Debug, Default, Serialize)]
pub struct LoginContext {
    pub username: String,
    pub next: Option<String>,
    pub errors: FieldErrors,
}

#[derive(Debug, Serialize)]
pub struct EmptyContext {}
