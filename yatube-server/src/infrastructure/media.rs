use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Subdirectory of the media root holding post images.
const POST_IMAGES_DIR: &str = "posts";

/// An uploaded image that already passed form validation.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist the image and return the reference stored on the post.
    async fn save(&self, upload: &ImageUpload) -> Result<String, DomainError>;
    /// Drop a stored image, e.g. when the post that would reference it was not written.
    async fn remove(&self, reference: &str) -> Result<(), DomainError>;
}

pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

/// `posts/<uuid>_<stem>.<ext>` with the stem reduced to safe characters.
pub fn image_reference(upload: &ImageUpload) -> String {
    let stem: String = upload
        .filename
        .rsplit_once('.')
        .map_or(upload.filename.as_str(), |(stem, _)| stem)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(64)
        .collect();
    let id = Uuid::new_v4().simple();
    if stem.is_empty() {
        format!("{}/{}.{}", POST_IMAGES_DIR, id, upload.extension)
    } else {
        format!("{}/{}_{}.{}", POST_IMAGES_DIR, id, stem, upload.extension)
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn save(&self, upload: &ImageUpload) -> Result<String, DomainError> {
        let reference = image_reference(upload);
        let path = self.root.join(&reference);

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                error!("failed to create media dir {}: {}", dir.display(), e);
                DomainError::Internal(e.to_string())
            })?;
        }
        tokio::fs::write(&path, &upload.bytes).await.map_err(|e| {
            error!("failed to write image {}: {}", path.display(), e);
            DomainError::Internal(e.to_string())
        })?;

        info!(image = %reference, bytes = upload.bytes.len(), "image stored");
        Ok(reference)
    }

    async fn remove(&self, reference: &str) -> Result<(), DomainError> {
        let path = self.root.join(reference);
        tokio::fs::remove_file(&path).await.map_err(|e| {
            error!("failed to remove image {}: {}", path.display(), e);
            DomainError::Internal(e.to_string())
        })?;
        info!(image = %reference, "image removed");
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> ImageUpload {
        ImageUpload {
            filename: name.into(),
            extension: "gif",
            bytes: vec![0x47, 0x49, 0x46],
        }
    }

    #[test]
    fn reference_keeps_a_sanitized_stem() {
        let reference = image_reference(&upload("../small pic.gif"));
        assert!(reference.starts_with("posts/"));
        assert!(reference.ends_with("_smallpic.gif"));
        assert!(!reference.contains(".."));
    }

    #[test]
    fn reference_without_stem() {
        let reference = image_reference(&upload(".gif"));
        assert!(reference.starts_with("posts/"));
        assert!(reference.ends_with(".gif"));
    }
}
