use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use pharma9_core::RatingBook;

use crate::{RatingPersistence, StoreError};

/// Rating book stored as one JSON document on disk.
///
/// The document shape is `{"<id>": {"totalStars": n, "count": n}, ...}`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl RatingPersistence for JsonFileStore {
    fn load(&self) -> RatingBook {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no rating store yet; starting empty");
                return RatingBook::new();
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to read rating store; starting empty"
                );
                return RatingBook::new();
            }
        };

        match serde_json::from_str::<RatingBook>(&content) {
            Ok(book) => {
                tracing::debug!(path = %self.path.display(), entries = book.len(), "rating store loaded");
                book
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to parse rating store; starting empty"
                );
                RatingBook::new()
            }
        }
    }

    fn save(&self, book: &RatingBook) -> Result<(), StoreError> {
        let json = serde_json::to_vec(book)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        // Write beside the target and rename so a crash never leaves a torn blob.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, &json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        tracing::debug!(path = %self.path.display(), entries = book.len(), "rating store saved");
        Ok(())
    }
}
