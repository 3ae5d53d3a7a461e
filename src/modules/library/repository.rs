//! Ebook persistence port and its in-memory adapter.

use async_trait::async_trait;
use quill_db::{KeyGuard, KeyedLocks, MemoryTable};
use thiserror::Error;
use time::OffsetDateTime;

use super::models::{DuplicateKey, Ebook};

/// Failures surfaced by repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Backing store could not be reached.
    #[error("ebook repository unavailable: {message}")]
    Unavailable { message: String },
    #[error("ebook repository query failed: {message}")]
    Query { message: String },
    #[error("ebook repository write failed: {message}")]
    Write { message: String },
    #[error("ebook repository timed out after {millis}ms")]
    Timeout { millis: u64 },
}

#[async_trait]
pub trait EbookRepository: Send + Sync {
    /// Exclusive hold on a duplicate-detection key. Callers keep the guard
    /// across lookup and save so concurrent creations of the same key are
    /// serialized.
    async fn lock_key(&self, key: &DuplicateKey) -> Result<KeyGuard, RepositoryError>;

    /// Exact match on both title and producer. No match is an empty vec.
    async fn find_by_title_and_producer(
        &self,
        title: &str,
        producer_id: &str,
    ) -> Result<Vec<Ebook>, RepositoryError>;

    /// Store a record that already carries its identifier and return the
    /// stored copy with timestamps set.
    async fn save(&self, ebook: &Ebook) -> Result<Ebook, RepositoryError>;
}

/// Process-local repository backed by [`MemoryTable`].
#[derive(Debug)]
pub struct InMemoryEbookRepository {
    table: MemoryTable<Ebook>,
    locks: KeyedLocks<DuplicateKey>,
}

impl InMemoryEbookRepository {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new("ebooks"),
            locks: KeyedLocks::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for InMemoryEbookRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EbookRepository for InMemoryEbookRepository {
    async fn lock_key(&self, key: &DuplicateKey) -> Result<KeyGuard, RepositoryError> {
        Ok(self.locks.lock(key).await)
    }

    async fn find_by_title_and_producer(
        &self,
        title: &str,
        producer_id: &str,
    ) -> Result<Vec<Ebook>, RepositoryError> {
        Ok(self
            .table
            .select(|ebook| ebook.title == title && ebook.producer_id == producer_id))
    }

    async fn save(&self, ebook: &Ebook) -> Result<Ebook, RepositoryError> {
        if ebook.id.is_empty() {
            return Err(RepositoryError::Write {
                message: "record has no identifier".to_string(),
            });
        }
        if self.table.count(|stored| stored.id == ebook.id) > 0 {
            return Err(RepositoryError::Write {
                message: format!("identifier {} is already stored", ebook.id),
            });
        }

        let now = OffsetDateTime::now_utc();
        let mut stored = ebook.clone();
        stored.created_at = Some(now);
        stored.updated_at = Some(now);

        self.table.insert(stored.clone());
        tracing::debug!(ebook_id = %stored.id, table = self.table.name(), "ebook stored");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::library::models::NewEbook;

    fn ebook(id: &str, title: &str, producer_id: &str) -> Ebook {
        NewEbook {
            title: title.to_string(),
            price: 1999,
            producer_id: producer_id.to_string(),
            ..NewEbook::default()
        }
        .into_ebook(id.to_string())
    }

    #[tokio::test]
    async fn save_stamps_timestamps_without_touching_input() {
        let repository = InMemoryEbookRepository::new();
        let input = ebook("id-1", "Go Basics", "p-1");

        let stored = repository.save(&input).await.unwrap();

        assert!(input.created_at.is_none());
        assert_eq!(stored.created_at, stored.updated_at);
        assert!(stored.created_at.is_some());
        assert_eq!(stored.id, "id-1");
        assert_eq!(repository.len(), 1);
    }

    #[tokio::test]
    async fn find_matches_title_and_producer_exactly() {
        let repository = InMemoryEbookRepository::new();
        repository.save(&ebook("id-1", "Go Basics", "p-1")).await.unwrap();
        repository.save(&ebook("id-2", "Go Basics", "p-2")).await.unwrap();
        repository.save(&ebook("id-3", "go basics", "p-1")).await.unwrap();

        let found = repository
            .find_by_title_and_producer("Go Basics", "p-1")
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "id-1");
    }

    #[tokio::test]
    async fn find_without_match_is_empty() {
        let repository = InMemoryEbookRepository::new();
        let found = repository
            .find_by_title_and_producer("Missing", "p-1")
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn save_rejects_unidentified_and_repeated_ids() {
        let repository = InMemoryEbookRepository::new();

        let missing = repository.save(&ebook("", "A", "p-1")).await.unwrap_err();
        assert!(matches!(missing, RepositoryError::Write { .. }));

        repository.save(&ebook("id-1", "A", "p-1")).await.unwrap();
        let repeated = repository.save(&ebook("id-1", "B", "p-1")).await.unwrap_err();
        assert!(matches!(repeated, RepositoryError::Write { .. }));
        assert_eq!(repository.len(), 1);
    }
}
