//! Driven port for ticket image blobs.

use async_trait::async_trait;

use crate::domain::ImageUpload;

use super::define_port_error;

define_port_error! {
    /// Errors raised by media store adapters.
    pub enum MediaStoreError {
        /// Reading or writing the blob failed.
        Io { message: String } => "media store failed: {message}",
        /// The stored path was not one this store produced.
        InvalidPath { path: String } => "invalid media path: {path}",
    }
}

/// Opaque blob storage addressed by generated relative paths.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist `image` and return its relative path.
    async fn store(&self, image: &ImageUpload) -> Result<String, MediaStoreError>;

    /// Delete a previously stored blob. Missing blobs are not an error.
    async fn remove(&self, path: &str) -> Result<(), MediaStoreError>;
}
