//! Fakes and fixtures shared by the library module tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use quill_db::{KeyGuard, KeyedLocks};

use super::id::{IdGenerationError, IdGenerator};
use super::models::{DuplicateKey, Ebook, NewEbook};
use super::repository::{EbookRepository, RepositoryError};

pub fn go_basics() -> NewEbook {
    NewEbook {
        title: "Go Basics".to_string(),
        price: 1999,
        promotional_price: Some(999),
        producer_id: "p-1".to_string(),
        ..NewEbook::default()
    }
}

/// Generator whose clock is always broken.
#[derive(Default)]
pub struct BrokenIds {
    calls: AtomicUsize,
}

impl BrokenIds {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IdGenerator for BrokenIds {
    fn generate(&self) -> Result<String, IdGenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(IdGenerationError::ClockBeforeEpoch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryFault {
    /// Store unreachable: the key lock cannot be taken.
    Offline,
    /// Lookup times out.
    Lookup,
    /// Lookup is rejected by the store.
    Query,
    Save,
}

/// Repository that fails on demand and counts save attempts.
pub struct FlakyRepository {
    fault: Option<RepositoryFault>,
    rows: Mutex<Vec<Ebook>>,
    locks: KeyedLocks<DuplicateKey>,
    save_attempts: AtomicUsize,
}

impl FlakyRepository {
    pub fn healthy() -> Self {
        Self {
            fault: None,
            rows: Mutex::new(Vec::new()),
            locks: KeyedLocks::new(),
            save_attempts: AtomicUsize::new(0),
        }
    }

    pub fn failing(fault: RepositoryFault) -> Self {
        Self {
            fault: Some(fault),
            ..Self::healthy()
        }
    }

    pub fn seed(&self, ebook: Ebook) {
        self.rows.lock().push(ebook);
    }

    pub fn stored(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EbookRepository for FlakyRepository {
    async fn lock_key(&self, key: &DuplicateKey) -> Result<KeyGuard, RepositoryError> {
        if self.fault == Some(RepositoryFault::Offline) {
            return Err(RepositoryError::Unavailable {
                message: "connection refused".to_string(),
            });
        }
        Ok(self.locks.lock(key).await)
    }

    async fn find_by_title_and_producer(
        &self,
        title: &str,
        producer_id: &str,
    ) -> Result<Vec<Ebook>, RepositoryError> {
        match self.fault {
            Some(RepositoryFault::Lookup) => {
                return Err(RepositoryError::Timeout { millis: 250 });
            }
            Some(RepositoryFault::Query) => {
                return Err(RepositoryError::Query {
                    message: "relation \"ebooks\" is locked".to_string(),
                });
            }
            _ => {}
        }
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|ebook| ebook.title == title && ebook.producer_id == producer_id)
            .cloned()
            .collect())
    }

    async fn save(&self, ebook: &Ebook) -> Result<Ebook, RepositoryError> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fault == Some(RepositoryFault::Save) {
            return Err(RepositoryError::Write {
                message: "disk full".to_string(),
            });
        }
        self.rows.lock().push(ebook.clone());
        Ok(ebook.clone())
    }
}
