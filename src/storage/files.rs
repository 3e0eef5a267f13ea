use super::traits::{Storage, StorageError};
use crate::url::SiteIdentity;
use std::path::{Path, PathBuf};
use url::Url;

/// Name used when a URL path has no final segment
pub const INDEX_FILE_NAME: &str = "index.html";

/// Extension assumed when a URL path carries none
pub const DEFAULT_EXTENSION: &str = ".html";

/// Storage that mirrors fetched content into a directory tree
///
/// Layout: `root/[site/]file_name`. Only the last path segment of a URL is
/// kept, so distinct URLs sharing a file name (different directories or
/// query strings) overwrite each other; the last write wins.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Creates a storage rooted at `root`
    ///
    /// The directory is not touched until the first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the mirror
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Computes where `url` would be stored without writing anything
    pub fn target_path(&self, url: &Url, extension: &str, site: Option<&SiteIdentity>) -> PathBuf {
        let dir = match site {
            Some(site) => self.root.join(site.as_str()),
            None => self.root.clone(),
        };
        dir.join(file_name(url, extension))
    }
}

impl Storage for FileStorage {
    fn save(
        &self,
        url: &Url,
        content: &[u8],
        extension: &str,
        site: Option<&SiteIdentity>,
    ) -> Result<PathBuf, StorageError> {
        let path = self.target_path(url, extension, site);

        if let Some(dir) = path.parent() {
            // create_dir_all succeeds when the directory already exists
            std::fs::create_dir_all(dir).map_err(|source| StorageError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(&path, content).map_err(|source| StorageError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(path)
    }
}

/// Returns the extension of the URL path's last segment, with its leading dot
///
/// Falls back to `.html` when the segment has no extension, whatever the
/// response's content type turns out to be. An extensionless image endpoint
/// is therefore stored (and parsed) as HTML.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webgrab::storage::path_extension;
///
/// let css = Url::parse("https://example.com/css/site.css").unwrap();
/// assert_eq!(path_extension(&css), ".css");
///
/// let logo = Url::parse("https://example.com/img/logo").unwrap();
/// assert_eq!(path_extension(&logo), ".html");
/// ```
pub fn path_extension(url: &Url) -> String {
    Path::new(last_segment(url))
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Returns the file name a URL is stored under
///
/// The last path segment, or `index.html` for an empty path or one ending in
/// `/`. `extension` is appended unless the name already ends with it.
pub fn file_name(url: &Url, extension: &str) -> String {
    let segment = last_segment(url);
    let mut name = if segment.is_empty() {
        INDEX_FILE_NAME.to_string()
    } else {
        segment.to_string()
    };

    if !extension.is_empty() && !name.ends_with(extension) {
        name.push_str(extension);
    }

    name
}

fn last_segment(url: &Url) -> &str {
    url.path().rsplit('/').next().unwrap_or("")
}
