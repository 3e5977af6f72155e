use std::path::{Component, Path, PathBuf};

use anyhow::Context as _;
use uuid::Uuid;

use crate::domain::image::DecodedImage;
use crate::domain::repository::ImageStore;
use crate::error::ApiError;

/// Subdirectory of the media root holding recipe images.
pub const RECIPE_IMAGE_DIR: &str = "recipes";

/// Writes images under `<root>/recipes/<uuid>.<ext>`.
#[derive(Clone)]
pub struct FsImageStore {
    pub root: PathBuf,
}

impl FsImageStore {
    /// Resolve a stored relative path, refusing anything that escapes the root.
    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let path = Path::new(relative);
        path.components()
            .all(|c| matches!(c, Component::Normal(_)))
            .then(|| self.root.join(path))
    }
}

impl ImageStore for FsImageStore {
    async fn save(&self, image: &DecodedImage) -> Result<String, ApiError> {
        let dir = self.root.join(RECIPE_IMAGE_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create media dir {}", dir.display()))?;
        let file_name = format!("{}.{}", Uuid::new_v4(), image.extension);
        let path = dir.join(&file_name);
        tokio::fs::write(&path, &image.bytes)
            .await
            .with_context(|| format!("write image {}", path.display()))?;
        Ok(format!("{RECIPE_IMAGE_DIR}/{file_name}"))
    }

    async fn remove(&self, relative: &str) -> Result<(), ApiError> {
        let path = self
            .resolve(relative)
            .with_context(|| format!("refusing to remove {relative}"))?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("remove image {}", path.display()))
                .into()),
        }
    }
}

/// Render a stored path as a URL under `media_url`.
pub fn media_url(media_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        media_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
