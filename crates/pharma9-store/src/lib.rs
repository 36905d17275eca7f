//! Persistence for the user rating book.
//!
//! The book is a single opaque blob: read once at startup, rewritten in full
//! after every mutation. A missing or unreadable blob is never fatal; it is
//! treated as an empty book and replaced on the next save.

mod json_file;
mod memory;

use std::sync::Arc;

use pharma9_core::RatingBook;
use thiserror::Error;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write rating store {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize rating store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A place the rating book is loaded from and saved to.
pub trait RatingPersistence: Send + Sync {
    /// Load the persisted book, recovering to an empty one on any failure.
    fn load(&self) -> RatingBook;

    /// Replace the persisted book with `book`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the book cannot be serialized or written.
    fn save(&self, book: &RatingBook) -> Result<(), StoreError>;
}

impl<T: RatingPersistence + ?Sized> RatingPersistence for Arc<T> {
    fn load(&self) -> RatingBook {
        (**self).load()
    }

    fn save(&self, book: &RatingBook) -> Result<(), StoreError> {
        (**self).save(book)
    }
}
