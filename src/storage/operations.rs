//! Storage operations
//!
//! The disk worker that stores, resolves and removes media files for apps
//! beneath a single content root.

use log::{debug, error, info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::StorageError;
use crate::storage::encoding::decode_data_uri;
use crate::storage::validation::{normalize, sanitize};

/// Attempts made to find a collision-free media name before giving up.
pub const MAX_NAME_ATTEMPTS: usize = 4;

/// Produces the unique token part of generated media names.
pub type TokenGenerator = fn() -> String;

fn random_token() -> String {
    Uuid::new_v4().to_string()
}

/// Disk worker confined to one content root.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
    generate_token: TokenGenerator,
}

impl DiskStorage {
    /// Builds a worker for the given content directory.
    ///
    /// The directory is not touched until an operation runs; use
    /// [`DiskStorage::generate`] to verify access up front.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: normalize(root.as_ref()),
            generate_token: random_token,
        }
    }

    /// Builds a worker and runs the capability check before handing it out.
    pub async fn generate(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let storage = Self::new(root);
        storage.capability_check().await?;
        Ok(storage)
    }

    /// Replaces the token source used for media names.
    pub fn with_token_generator(mut self, generate_token: TokenGenerator) -> Self {
        self.generate_token = generate_token;
        self
    }

    /// The normalized content root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Verifies the process can list and write the content root.
    pub async fn capability_check(&self) -> Result<(), StorageError> {
        let metadata = fs::metadata(&self.root).await?;
        if !metadata.is_dir() {
            return Err(StorageError::Io(std::io::Error::new(
                ErrorKind::NotADirectory,
                format!("{} is not a directory", self.root.display()),
            )));
        }

        let mut entries = fs::read_dir(&self.root).await?;
        entries.next_entry().await?;

        let scratch = self.root.join(format!(".scratch-{}", random_token()));
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&scratch)
            .await?;
        fs::remove_file(&scratch).await?;

        info!("Content root {} is readable and writable", self.root.display());
        Ok(())
    }

    /// Resolves the on-disk path for an app directory or one of its files.
    ///
    /// An app that sanitizes to empty discards `media`, so nothing can be
    /// addressed directly inside the content root.
    pub fn resolve_path(&self, app: &str, media: &str) -> PathBuf {
        let app = sanitize(app);
        let media = if app.is_empty() {
            String::new()
        } else {
            sanitize(media)
        };

        let mut path = self.root.join(app);
        if !media.is_empty() {
            path.push(media);
        }
        normalize(&path)
    }

    /// Creates the app directory; an existing directory is fine.
    pub async fn ensure_app_directory(&self, app: &str) -> Result<(), StorageError> {
        let app_dir = self.resolve_path(app, "");

        match fs::create_dir(&app_dir).await {
            Ok(()) => {
                info!("Created app directory {}", app_dir.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => {
                error!("Failed to create app directory {}: {}", app_dir.display(), e);
                Err(StorageError::from(e))
            }
        }
    }

    /// Returns the path of a stored media file for the caller to stream.
    pub async fn get(&self, app: &str, media: &str) -> Result<PathBuf, StorageError> {
        let app_segment = checked_app(app)?;
        let file_path = self.resolve_path(&app_segment, media);

        match fs::metadata(&file_path).await {
            Ok(metadata) if metadata.is_file() => {
                debug!("Resolved media {}/{} to {}", app_segment, media, file_path.display());
                Ok(file_path)
            }
            Ok(_) => Err(StorageError::NotFound(format!("{}/{}", app_segment, media))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(format!("{}/{}", app_segment, media)))
            }
            Err(e) => Err(StorageError::from(e)),
        }
    }

    /// Stores a base64 data URI under a freshly generated name.
    ///
    /// Each candidate name is claimed with an exclusive create, so a name that
    /// already exists counts as a collision instead of being overwritten.
    pub async fn save(&self, app: &str, data_uri: &str) -> Result<String, StorageError> {
        let app_segment = checked_app(app)?;
        let media = decode_data_uri(data_uri)?;

        self.ensure_app_directory(&app_segment).await?;

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let name = format!("{}.{}", (self.generate_token)(), media.extension);
            let file_path = self.resolve_path(&app_segment, &name);

            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&file_path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    warn!(
                        "Media name {} already taken in {} (attempt {}/{})",
                        name, app_segment, attempt, MAX_NAME_ATTEMPTS
                    );
                    continue;
                }
                Err(e) => {
                    error!("Failed to create {}: {}", file_path.display(), e);
                    return Err(StorageError::from(e));
                }
            };

            let written = match file.write_all(&media.content).await {
                Ok(()) => file.flush().await,
                Err(e) => Err(e),
            };

            if let Err(e) = written {
                error!("Failed to write {}: {}", file_path.display(), e);
                drop(file);
                discard_partial(&file_path).await;
                return Err(StorageError::from(e));
            }

            info!(
                "Stored {} for app {} ({}, {} bytes)",
                name,
                app_segment,
                media.mime_type,
                media.content.len()
            );
            return Ok(name);
        }

        error!(
            "Couldn't generate an available file name for app {} after {} attempts",
            app_segment, MAX_NAME_ATTEMPTS
        );
        Err(StorageError::NameExhausted(MAX_NAME_ATTEMPTS))
    }

    /// Deletes a media file; a missing file is not an error.
    pub async fn remove(&self, app: &str, media: &str) -> Result<(), StorageError> {
        let app_segment = checked_app(app)?;
        let file_path = self.resolve_path(&app_segment, media);

        match fs::remove_file(&file_path).await {
            Ok(()) => {
                info!("Removed media {}/{}", app_segment, media);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Media {}/{} already absent", app_segment, media);
                Ok(())
            }
            Err(e) => {
                error!("Failed to remove {}: {}", file_path.display(), e);
                Err(StorageError::from(e))
            }
        }
    }
}

/// Removes a file left behind by a failed write, logging when that fails too.
async fn discard_partial(file_path: &Path) {
    if let Err(e) = fs::remove_file(file_path).await {
        warn!("Failed to remove partial file {}: {}", file_path.display(), e);
    }
}

/// Sanitizes an app identifier, rejecting ones that name no namespace.
fn checked_app(app: &str) -> Result<String, StorageError> {
    let segment = sanitize(app);
    if segment.is_empty() {
        return Err(StorageError::InvalidPath(format!("app identifier {:?}", app)));
    }
    Ok(segment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PNG_URI: &str = "data:image/png;base64,aGVsbG8=";

    fn fixed_token() -> String {
        "fixed-token".to_string()
    }

    #[test]
    fn test_resolve_path_stays_under_root() {
        let storage = DiskStorage::new("/srv/content");

        let path = storage.resolve_path("../../etc", "passwd");
        assert!(path.starts_with("/srv/content"));

        let path = storage.resolve_path("app", "../../etc/passwd");
        assert_eq!(path, PathBuf::from("/srv/content/app/....etcpasswd"));

        let path = storage.resolve_path("..", "..");
        assert_eq!(path, PathBuf::from("/srv/content"));
    }

    #[test]
    fn test_resolve_path_drops_media_without_app() {
        let storage = DiskStorage::new("/srv/content");
        assert_eq!(storage.resolve_path("", "file.png"), PathBuf::from("/srv/content"));
        assert_eq!(storage.resolve_path("/", "file.png"), PathBuf::from("/srv/content"));
    }

    #[test]
    fn test_root_is_normalized() {
        let storage = DiskStorage::new("/srv/./content/../content");
        assert_eq!(storage.root(), Path::new("/srv/content"));
    }

    #[tokio::test]
    async fn test_ensure_app_directory_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = DiskStorage::new(dir.path());

        storage.ensure_app_directory("app").await.unwrap();
        storage.ensure_app_directory("app").await.unwrap();
        assert!(dir.path().join("app").is_dir());
    }

    #[tokio::test]
    async fn test_ensure_app_directory_propagates_other_errors() {
        let dir = tempdir().unwrap();
        let storage = DiskStorage::new(dir.path().join("missing-root"));

        let err = storage.ensure_app_directory("app").await.unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }

    #[tokio::test]
    async fn test_save_then_get() {
        let dir = tempdir().unwrap();
        let storage = DiskStorage::new(dir.path());

        let name = storage.save("app", PNG_URI).await.unwrap();
        assert!(name.ends_with(".png"));

        let path = storage.get("app", &name).await.unwrap();
        assert!(path.starts_with(dir.path()));
        assert_eq!(std::fs::read(path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_save_exhausts_names() {
        let dir = tempdir().unwrap();
        let storage = DiskStorage::new(dir.path()).with_token_generator(fixed_token);

        let first = storage.save("app", PNG_URI).await.unwrap();
        assert_eq!(first, "fixed-token.png");

        let err = storage
            .save("app", "data:image/png;base64,d29ybGQ=")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NameExhausted(MAX_NAME_ATTEMPTS)));

        // The colliding save must not clobber the stored file
        let stored = std::fs::read(dir.path().join("app").join(first)).unwrap();
        assert_eq!(stored, b"hello");
    }

    #[tokio::test]
    async fn test_save_rejects_empty_app() {
        let dir = tempdir().unwrap();
        let storage = DiskStorage::new(dir.path());

        let err = storage.save("../", PNG_URI).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_get_directory_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = DiskStorage::new(dir.path());
        storage.ensure_app_directory("app").await.unwrap();
        std::fs::create_dir(dir.path().join("app").join("nested")).unwrap();

        let err = storage.get("app", "nested").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_capability_check_on_populated_root() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("existing.png"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("app")).unwrap();

        DiskStorage::new(dir.path()).capability_check().await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
        assert_eq!(std::fs::read(dir.path().join("existing.png")).unwrap(), b"x");
    }

    #[tokio::test]
    async fn test_discard_partial() {
        let dir = tempdir().unwrap();
        let partial = dir.path().join("partial.png");
        std::fs::write(&partial, b"half").unwrap();

        discard_partial(&partial).await;
        assert!(!partial.exists());

        // Already gone: logged, not raised
        discard_partial(&partial).await;
        assert!(!partial.exists());
    }

    #[tokio::test]
    async fn test_capability_check() {
        let dir = tempdir().unwrap();
        DiskStorage::new(dir.path()).capability_check().await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        let missing = DiskStorage::new(dir.path().join("nope"));
        assert!(matches!(
            missing.capability_check().await,
            Err(StorageError::Io(_))
        ));

        let file_path = dir.path().join("plain-file");
        std::fs::write(&file_path, b"x").unwrap();
        assert!(matches!(
            DiskStorage::generate(&file_path).await,
            Err(StorageError::Io(_))
        ));
    }
}
