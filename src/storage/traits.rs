use crate::url::SiteIdentity;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Errors raised while persisting fetched content
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Destination for fetched content
///
/// Implementations must tolerate concurrent calls, including concurrent
/// writes that map to the same location.
pub trait Storage: Send + Sync {
    /// Persists the body of `url`
    ///
    /// # Arguments
    ///
    /// * `url` - The URL the content was fetched from
    /// * `content` - Raw response body
    /// * `extension` - Extension (with leading dot) the stored name must end with
    /// * `site` - Optional namespace for the stored file
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Where the content was written
    /// * `Err(StorageError)` - The content could not be written
    fn save(
        &self,
        url: &Url,
        content: &[u8],
        extension: &str,
        site: Option<&SiteIdentity>,
    ) -> Result<PathBuf, StorageError>;
}
