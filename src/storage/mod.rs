//! Storage module for persisting fetched content
//!
//! This module handles writing response bodies to disk:
//! - Mapping a URL to a file name (last path segment, `index.html` default)
//! - Inferring the extension from the URL path (`.html` default)
//! - Namespacing files by site identity
//! - Creating directories on demand

mod files;
mod traits;

pub use files::{file_name, path_extension, FileStorage, DEFAULT_EXTENSION, INDEX_FILE_NAME};
pub use traits::{Storage, StorageError};
