//! Filesystem media store rooted in a `cap-std` directory capability.
//!
//! Images live at `tickets/<uuid>.<ext>` below the media root. The store can
//! only reach files under that root, and `remove` rejects any path it
//! would not itself have generated.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{MediaStore, MediaStoreError};
use crate::domain::{ImageFormat, ImageUpload};

/// Subdirectory holding ticket cover images.
pub const TICKETS_DIR: &str = "tickets";

/// `MediaStore` backed by a directory on the local filesystem.
#[derive(Clone)]
pub struct CapStdMediaStore {
    root: Arc<Dir>,
}

fn io_error(context: &str, error: &io::Error) -> MediaStoreError {
    MediaStoreError::io(format!("{context}: {error}"))
}

/// Validate a relative media path and return it unchanged.
fn checked_path(path: &str) -> Result<&str, MediaStoreError> {
    let invalid = || MediaStoreError::invalid_path(path);
    let (dir, file) = path.split_once('/').ok_or_else(invalid)?;
    let (stem, extension) = file.rsplit_once('.').ok_or_else(invalid)?;
    if dir != TICKETS_DIR
        || Uuid::parse_str(stem).is_err()
        || ImageFormat::from_extension(extension).is_none()
    {
        return Err(invalid());
    }
    Ok(path)
}

impl CapStdMediaStore {
    /// Open (creating if needed) the media root and its tickets directory.
    ///
    /// # Errors
    ///
    /// Returns `MediaStoreError::Io` when the directories cannot be created
    /// or opened.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, MediaStoreError> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(|err| io_error("create media root", &err))?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|err| io_error("open media root", &err))?;
        dir.create_dir_all(TICKETS_DIR)
            .map_err(|err| io_error("create tickets directory", &err))?;
        Ok(Self {
            root: Arc::new(dir),
        })
    }

    async fn blocking<T, F>(&self, task: F) -> Result<T, MediaStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, MediaStoreError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || task(&root))
            .await
            .map_err(|err| MediaStoreError::io(format!("media task failed: {err}")))?
    }
}

#[async_trait]
impl MediaStore for CapStdMediaStore {
    async fn store(&self, image: &ImageUpload) -> Result<String, MediaStoreError> {
        let path = format!(
            "{TICKETS_DIR}/{}.{}",
            Uuid::new_v4(),
            image.format().extension()
        );
        let bytes = image.bytes().to_vec();
        let target = path.clone();
        self.blocking(move |root| {
            let staging = format!("{target}.partial");
            root.write(&staging, &bytes)
                .map_err(|err| io_error("write image", &err))?;
            root.rename(&staging, root, &target)
                .map_err(|err| io_error("publish image", &err))
        })
        .await?;
        debug!(path, "image stored");
        Ok(path)
    }

    async fn remove(&self, path: &str) -> Result<(), MediaStoreError> {
        let target = checked_path(path)?.to_owned();
        self.blocking(move |root| match root.remove_file(&target) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error("remove image", &err)),
        })
        .await?;
        debug!(path, "image removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn media_root() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn png() -> ImageUpload {
        ImageUpload::new("image/png", vec![137, 80, 78, 71]).expect("valid upload")
    }

    #[rstest]
    #[tokio::test]
    async fn stores_and_removes_images(media_root: TempDir) {
        let store = CapStdMediaStore::open(media_root.path()).expect("open store");

        let path = store.store(&png()).await.expect("store image");
        assert!(path.starts_with("tickets/"));
        assert!(path.ends_with(".png"));
        assert!(media_root.path().join(&path).exists());

        let written = std::fs::read(media_root.path().join(&path)).expect("read image");
        assert_eq!(written, vec![137, 80, 78, 71]);

        store.remove(&path).await.expect("remove image");
        assert!(!media_root.path().join(&path).exists());
    }

    #[rstest]
    #[tokio::test]
    async fn removing_a_missing_image_succeeds(media_root: TempDir) {
        let store = CapStdMediaStore::open(media_root.path()).expect("open store");
        let path = format!("tickets/{}.jpg", Uuid::new_v4());
        store.remove(&path).await.expect("missing blob tolerated");
    }

    #[rstest]
    #[case("../etc/passwd")]
    #[case("tickets/../../secret.png")]
    #[case("tickets/not-a-uuid.png")]
    #[case("avatars/3fa85f64-5717-4562-b3fc-2c963f66afa6.png")]
    #[case("tickets/3fa85f64-5717-4562-b3fc-2c963f66afa6.exe")]
    fn rejects_paths_it_did_not_generate(#[case] path: &str) {
        assert_eq!(checked_path(path), Err(MediaStoreError::invalid_path(path)));
    }
}
