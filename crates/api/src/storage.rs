//! Local filesystem storage for uploaded images.
//!
//! Images are written as `<directory>/<uuid>.<ext>` under the upload root and
//! referenced from the database by that relative path. The same root is
//! served read-only under `/uploads`.

use std::path::{Component, Path, PathBuf};

use catalog_core::upload::{prepare_image, ImagePolicy, PreparedImage, UploadError, UploadedFile};

/// URL prefix the upload root is served under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Sub-directory of the upload root per entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageDirectory {
    Products,
    Categories,
}

impl ImageDirectory {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageDirectory::Products => "products",
            ImageDirectory::Categories => "categories",
        }
    }
}

/// Validates, writes and removes uploaded images under one root directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    policy: ImagePolicy,
}

impl ImageStore {
    pub fn new(root: PathBuf, policy: ImagePolicy) -> Self {
        Self { root, policy }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate an upload and re-encode it off the async runtime.
    pub async fn prepare(&self, file: UploadedFile) -> Result<PreparedImage, UploadError> {
        let policy = self.policy;
        tokio::task::spawn_blocking(move || prepare_image(&file, &policy))
            .await
            .map_err(|e| UploadError::Unreadable(e.to_string()))?
    }

    /// Write a prepared image and return its path relative to the root.
    pub async fn save(
        &self,
        directory: ImageDirectory,
        image: &PreparedImage,
    ) -> std::io::Result<String> {
        let dir = self.root.join(directory.as_str());
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("{}.{}", uuid::Uuid::new_v4(), image.extension);
        tokio::fs::write(dir.join(&file_name), &image.bytes).await?;

        let relative = format!("{}/{file_name}", directory.as_str());
        tracing::debug!(path = %relative, bytes = image.bytes.len(), "Stored image");
        Ok(relative)
    }

    /// Delete a stored image. Missing files and paths escaping the root are
    /// logged and otherwise ignored.
    pub async fn remove(&self, relative: &str) {
        let Some(path) = self.resolve(relative) else {
            tracing::warn!(path = %relative, "Refusing to remove image outside upload root");
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %relative, "Removed image"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %relative, "Image already gone");
            }
            Err(e) => tracing::warn!(path = %relative, error = %e, "Failed to remove image"),
        }
    }

    /// Delete several stored images.
    pub async fn remove_all<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            self.remove(path.as_ref()).await;
        }
    }

    /// Absolute path for a stored reference, `None` if it is not a plain
    /// relative path.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let rel = Path::new(relative);
        let plain = !relative.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        plain.then(|| self.root.join(rel))
    }
}

/// Public URL of a stored image reference.
pub fn image_url(relative: &str) -> String {
    format!("{UPLOADS_URL_PREFIX}/{relative}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn store(root: &Path) -> ImageStore {
        ImageStore::new(root.to_path_buf(), ImagePolicy::default())
    }

    #[test]
    fn resolve_accepts_plain_relative_paths() {
        let store = store(Path::new("/srv/uploads"));
        assert_eq!(
            store.resolve("products/a.jpg"),
            Some(PathBuf::from("/srv/uploads/products/a.jpg"))
        );
    }

    #[test]
    fn resolve_rejects_escaping_paths() {
        let store = store(Path::new("/srv/uploads"));
        assert_eq!(store.resolve("../etc/passwd"), None);
        assert_eq!(store.resolve("/etc/passwd"), None);
        assert_eq!(store.resolve(""), None);
    }

    #[test]
    fn url_is_under_uploads_prefix() {
        assert_eq!(image_url("categories/x.png"), "/uploads/categories/x.png");
    }

    #[tokio::test]
    async fn save_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let image = PreparedImage {
            bytes: vec![1, 2, 3],
            extension: "png",
        };

        let relative = store.save(ImageDirectory::Products, &image).await.unwrap();
        assert!(relative.starts_with("products/"));
        assert!(relative.ends_with(".png"));
        let path = dir.path().join(&relative);
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);

        store.remove(&relative).await;
        assert!(!path.exists());

        // Removing again is a no-op.
        store.remove(&relative).await;
    }

    #[tokio::test]
    async fn prepare_reports_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let file = UploadedFile {
            file_name: "notes.txt".into(),
            bytes: b"hello".to_vec(),
        };
        assert_matches!(
            store(dir.path()).prepare(file).await,
            Err(UploadError::DisallowedType)
        );
    }
}
