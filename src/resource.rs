//! Resource lookup for included stylesheets.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Errors from resource lookup.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("failed to read resource {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Reads named resources (CSS files) on behalf of a module.
pub trait ResourceLocator: fmt::Debug {
    fn read_to_string(&self, file_name: &str) -> Result<String, ResourceError>;
}

/// In-memory resources, mostly for tests and embedders that own the bytes.
///
/// Entries can be replaced through a shared reference so that `reload_css`
/// picks up new content.
#[derive(Debug, Default)]
pub struct MemoryResources {
    files: RefCell<HashMap<String, String>>,
}

impl MemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file (builder).
    pub fn with_file(self, file_name: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(file_name, content);
        self
    }

    /// Insert or replace a file.
    pub fn insert(&self, file_name: impl Into<String>, content: impl Into<String>) {
        self.files.borrow_mut().insert(file_name.into(), content.into());
    }

    pub fn remove(&self, file_name: &str) -> bool {
        self.files.borrow_mut().remove(file_name).is_some()
    }
}

impl ResourceLocator for MemoryResources {
    fn read_to_string(&self, file_name: &str) -> Result<String, ResourceError> {
        self.files
            .borrow()
            .get(file_name)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(file_name.to_owned()))
    }
}

/// Resources resolved relative to a base directory.
#[derive(Debug, Clone)]
pub struct FileResources {
    base: PathBuf,
}

impl FileResources {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl ResourceLocator for FileResources {
    fn read_to_string(&self, file_name: &str) -> Result<String, ResourceError> {
        let path = self.base.join(file_name);
        std::fs::read_to_string(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => ResourceError::NotFound(file_name.to_owned()),
            _ => ResourceError::Io {
                name: file_name.to_owned(),
                source,
            },
        })
    }
}
