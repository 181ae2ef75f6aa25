use std::path::PathBuf;

use actix_multipart::form::tempfile::TempFile;
use uuid::Uuid;

use crate::errors::AppError;
use crate::settings::AppConfig;

/// Upload subdirectories, one per media-bearing field.
pub const PROJECT_MAIN_DIR: &str = "projects/main";
pub const PROJECT_GALLERY_DIR: &str = "projects/gallery";
pub const TECHNOLOGY_LOGO_DIR: &str = "technologies";

const ALLOWED_IMAGE_MIMES: [&str; 4] = ["image/png", "image/jpeg", "image/webp", "image/gif"];

/// Filesystem-backed media storage. Files are stored under `root` with
/// generated names; rows keep the relative key and readers get a URL
/// under `base_url`. Serving the files themselves is delegated to the
/// fronting static file server.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    base_url: String,
}

impl MediaStore {
    pub fn new(config: &AppConfig) -> Self {
        MediaStore {
            root: PathBuf::from(&config.media_root),
            base_url: config.media_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Persist an uploaded image and return its storage key.
    ///
    /// The content is sniffed rather than trusting the client's content
    /// type; non-image payloads fail with a field-level validation error
    /// on `field`.
    pub async fn store_image(
        &self,
        subdir: &str,
        field: &str,
        file: &TempFile,
    ) -> Result<String, AppError> {
        let data = tokio::fs::read(file.file.path()).await?;

        if data.is_empty() {
            return Err(AppError::field_error(field, "Uploaded file is empty"));
        }

        let kind = infer::get(&data)
            .ok_or_else(|| AppError::field_error(field, "Unrecognized file format"))?;

        if !ALLOWED_IMAGE_MIMES.contains(&kind.mime_type()) {
            return Err(AppError::field_error(
                field,
                format!("Unsupported image type: {}", kind.mime_type()),
            ));
        }

        let key = format!("{}/{}.{}", subdir, Uuid::new_v4(), kind.extension());
        let dest = self.root.join(&key);

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&dest, &data).await?;

        tracing::debug!(key = %key, size = data.len(), "Stored media file");
        Ok(key)
    }

    /// Remove a stored file. Missing files are not an error: the row is
    /// already gone or was never backed by a local file.
    pub async fn remove(&self, key: &str) {
        let path = self.root.join(key);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(key = %key, error = %e, "Failed to remove media file");
            }
        }
    }

    /// Public URL for a storage key.
    pub fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }

    /// URL for optional media fields.
    pub fn url_opt(&self, key: Option<&str>) -> Option<String> {
        key.map(|k| self.url(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::AppEnvironment;

    fn test_store() -> MediaStore {
        MediaStore::new(&AppConfig {
            env: AppEnvironment::Testing,
            name: "test".into(),
            port: 0,
            host: "127.0.0.1".into(),
            worker_count: 1,
            database_url: "postgres://localhost/test".into(),
            cors_allowed_origins: vec![],
            jwt_secret: "test_jwt_secret_that_is_long_enough_123456".into(),
            jwt_expiration_minutes: 60,
            media_root: "/tmp/media".into(),
            media_base_url: "/media/".into(),
        })
    }

    #[test]
    fn url_joins_base_and_key() {
        let store = test_store();
        assert_eq!(store.url("projects/main/a.png"), "/media/projects/main/a.png");
        assert_eq!(store.url("/projects/main/a.png"), "/media/projects/main/a.png");
    }

    #[test]
    fn url_opt_passes_none_through() {
        let store = test_store();
        assert_eq!(store.url_opt(None), None);
        assert_eq!(
            store.url_opt(Some("technologies/logo.png")).as_deref(),
            Some("/media/technologies/logo.png")
        );
    }
}
