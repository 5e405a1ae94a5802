use uuid::Uuid;

pub const INDEX: &str = "/";
pub const LOGIN: &str = "/auth/login/";

/// Login entry point carrying the path to come back to.
pub fn login(next: &str) -> String {
    format!("{}?next={}", LOGIN, encode_next(next))
}

/// Percent-encode a return path, leaving `/` readable.
fn encode_next(next: &str) -> String {
    urlencoding::encode(next).replace("%2F", "/")
}

pub fn profile(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

pub fn post_detail(post_id: Uuid) -> String {
    format!("/posts/{}/", post_id)
}

/// Only same-site absolute paths are accepted as post-login targets.
/// Browsers read `\` as `/`, so any backslash or control character is refused.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if is_local_path(path) => path,
        _ => INDEX,
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.chars().any(|c| c == '\\' || c.is_control())
}
