use std::sync::{Mutex, PoisonError};

use pharma9_core::RatingBook;

use crate::{RatingPersistence, StoreError};

/// Process-local store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    book: Mutex<RatingBook>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_book(book: RatingBook) -> Self {
        Self {
            book: Mutex::new(book),
        }
    }

    /// Current saved value.
    #[must_use]
    pub fn snapshot(&self) -> RatingBook {
        self.book
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RatingPersistence for MemoryStore {
    fn load(&self) -> RatingBook {
        self.snapshot()
    }

    fn save(&self, book: &RatingBook) -> Result<(), StoreError> {
        *self.book.lock().unwrap_or_else(PoisonError::into_inner) = book.clone();
        Ok(())
    }
}
