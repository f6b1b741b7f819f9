//! File Store
//!
//! 产品图片等上传文件的清理。只删除 upload 目录下的文件；失败只记日志。

use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone)]
pub struct FileStore {
    upload_dir: PathBuf,
}

impl FileStore {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Map a stored URL (`/uploads/a.jpg`, `https://host/uploads/a.jpg`) to a
    /// path inside the upload dir. Anything that could escape it maps to None.
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let name = path.rsplit('/').next()?;
        if name.is_empty() || name == "." || name == ".." || name.contains('\\') {
            return None;
        }
        Some(self.upload_dir.join(name))
    }

    /// Delete the file behind `url`; returns whether a file was removed
    pub async fn delete_by_url(&self, url: &str) -> bool {
        let Some(file_path) = self.resolve(url) else {
            tracing::warn!(url = %url, "Refusing to delete file outside upload dir");
            return false;
        };

        match fs::remove_file(&file_path).await {
            Ok(()) => {
                tracing::info!(path = %file_path.display(), "Upload deleted");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(path = %file_path.display(), error = %e, "Failed to delete upload");
                false
            }
        }
    }

    /// Fire-and-forget delete; the response never waits on the filesystem
    pub fn spawn_delete(&self, url: String) {
        let store = self.clone();
        tokio::spawn(async move {
            store.delete_by_url(&url).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_keeps_inside_upload_dir() {
        let store = FileStore::new("/srv/uploads");
        assert_eq!(
            store.resolve("/uploads/p1.jpg?v=2"),
            Some(PathBuf::from("/srv/uploads/p1.jpg"))
        );
        assert_eq!(
            store.resolve("https://cdn.example.com/uploads/p2.png"),
            Some(PathBuf::from("/srv/uploads/p2.png"))
        );
        assert_eq!(store.resolve("/uploads/"), None);
        assert_eq!(store.resolve("/uploads/.."), None);
    }

    #[tokio::test]
    async fn test_delete_by_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let file = dir.path().join("shot.jpg");
        std::fs::write(&file, b"jpeg").unwrap();

        assert!(store.delete_by_url("/uploads/shot.jpg").await);
        assert!(!file.exists());
        assert!(!store.delete_by_url("/uploads/shot.jpg").await);
    }
}
