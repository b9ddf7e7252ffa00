use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use shared::protocol::DEFAULT_MIME_TYPE;
use thiserror::Error;

/// The photo picked by the user. No content validation happens here; the
/// analysis service decides whether it accepts the payload.
#[derive(Clone)]
pub struct SelectedFile {
    file_name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

#[derive(Debug, Error)]
pub enum SelectedFileError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("'{}' has no file name", path.display())]
    MissingFileName { path: PathBuf },
}

impl SelectedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_guess::from_path(&file_name)
            .first_raw()
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        Self {
            file_name,
            mime_type,
            bytes: bytes.into(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, SelectedFileError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| SelectedFileError::MissingFileName {
                path: path.to_path_buf(),
            })?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| SelectedFileError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(file_name, bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/selected_file_tests.rs"]
mod tests;
