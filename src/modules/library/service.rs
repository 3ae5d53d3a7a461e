use std::sync::Arc;

use thiserror::Error;

use super::id::{IdGenerationError, IdGenerator};
use super::models::{Ebook, NewEbook};
use super::repository::{EbookRepository, RepositoryError};
use super::validation::{FieldValidator, ValidationErrors};

#[derive(Debug, Error)]
pub enum CreateEbookError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("an ebook titled '{title}' already exists for producer '{producer_id}'")]
    Duplicate { title: String, producer_id: String },

    #[error("failed to persist ebook")]
    Persistence(#[source] RepositoryError),

    #[error("failed to generate ebook identifier")]
    Generation(#[source] IdGenerationError),
}

/// Creates ebooks while holding the duplicate-key guard.
pub struct EbookService {
    ids: Arc<dyn IdGenerator>,
    repository: Arc<dyn EbookRepository>,
    validator: Arc<FieldValidator>,
}

impl EbookService {
    /// `validator` is applied to the fully formed entity right before it is
    /// saved, see [`FieldValidator::ebook_entity`].
    pub fn new(
        ids: Arc<dyn IdGenerator>,
        repository: Arc<dyn EbookRepository>,
        validator: Arc<FieldValidator>,
    ) -> Self {
        Self {
            ids,
            repository,
            validator,
        }
    }

    /// Create and persist an ebook.
    ///
    /// Either the stored entity is returned or nothing was stored. The
    /// repository key guard is held from the duplicate lookup until the save
    /// completes; a failed save is not retried and its identifier is dropped.
    #[tracing::instrument(
        name = "create_ebook",
        skip(self, input),
        fields(title = %input.title, producer_id = %input.producer_id)
    )]
    pub async fn create_ebook(&self, input: NewEbook) -> Result<Ebook, CreateEbookError> {
        let key = input.duplicate_key();
        let _guard = self
            .repository
            .lock_key(&key)
            .await
            .map_err(CreateEbookError::Persistence)?;

        let existing = self
            .repository
            .find_by_title_and_producer(&key.title, &key.producer_id)
            .await
            .map_err(CreateEbookError::Persistence)?;
        if !existing.is_empty() {
            tracing::warn!(matches = existing.len(), "duplicate ebook rejected");
            return Err(CreateEbookError::Duplicate {
                title: key.title,
                producer_id: key.producer_id,
            });
        }

        let id = self.ids.generate().map_err(|error| {
            tracing::error!(%error, "identifier generation failed");
            CreateEbookError::Generation(error)
        })?;
        let ebook = input.into_ebook(id);

        if let Err(errors) = self.validator.validate(&ebook) {
            tracing::warn!(ebook_id = %ebook.id, %errors, "ebook invariants violated");
            return Err(errors.into());
        }

        let stored = self.repository.save(&ebook).await.map_err(|error| {
            tracing::error!(ebook_id = %ebook.id, %error, "ebook persistence failed");
            CreateEbookError::Persistence(error)
        })?;

        tracing::info!(ebook_id = %stored.id, "ebook created");
        Ok(stored)
    }

    /// Stored ebooks with exactly this title and producer.
    pub async fn find_by_title_and_producer(
        &self,
        title: &str,
        producer_id: &str,
    ) -> Result<Vec<Ebook>, RepositoryError> {
        self.repository
            .find_by_title_and_producer(title, producer_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::library::id::UuidV7Generator;
    use crate::modules::library::repository::InMemoryEbookRepository;
    use crate::modules::library::test_support::{
        go_basics, BrokenIds, FlakyRepository, RepositoryFault,
    };
    use crate::modules::library::validation::Field;
    use rstest::rstest;
    use std::collections::HashSet;

    fn service_with(repository: Arc<dyn EbookRepository>) -> EbookService {
        EbookService::new(
            Arc::new(UuidV7Generator::new()),
            repository,
            Arc::new(FieldValidator::ebook_entity()),
        )
    }

    #[tokio::test]
    async fn creates_ebook_with_fresh_id() {
        let service = service_with(Arc::new(InMemoryEbookRepository::new()));

        let ebook = service.create_ebook(go_basics()).await.unwrap();

        assert!(!ebook.id.is_empty());
        assert_eq!(ebook.price, 1999);
        assert_eq!(ebook.promotional_price, Some(999));
        assert!(ebook.created_at.is_some());
    }

    #[tokio::test]
    async fn ids_are_distinct_across_creations() {
        let service = service_with(Arc::new(InMemoryEbookRepository::new()));

        let mut ids = HashSet::new();
        for n in 0..50 {
            let input = NewEbook {
                title: format!("Volume {n}"),
                ..go_basics()
            };
            let ebook = service.create_ebook(input).await.unwrap();
            assert!(ids.insert(ebook.id));
        }
    }

    #[tokio::test]
    async fn promotional_price_above_price_fails_validation() {
        let repository = Arc::new(InMemoryEbookRepository::new());
        let service = service_with(repository.clone());
        let input = NewEbook {
            promotional_price: Some(2500),
            ..go_basics()
        };

        let err = service.create_ebook(input).await.unwrap_err();

        match err {
            CreateEbookError::Validation(errors) => {
                assert!(errors.contains(Field::PromotionalPrice));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert!(repository.is_empty());
    }

    #[tokio::test]
    async fn second_creation_of_same_title_and_producer_is_duplicate() {
        let repository = Arc::new(InMemoryEbookRepository::new());
        let service = service_with(repository.clone());
        let input = NewEbook {
            title: "X".to_string(),
            promotional_price: None,
            ..go_basics()
        };

        service.create_ebook(input.clone()).await.unwrap();
        let err = service.create_ebook(input).await.unwrap_err();

        assert!(matches!(
            err,
            CreateEbookError::Duplicate { ref title, ref producer_id }
                if title == "X" && producer_id == "p-1"
        ));
        assert_eq!(
            service
                .find_by_title_and_producer("X", "p-1")
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn same_title_for_another_producer_is_allowed() {
        let service = service_with(Arc::new(InMemoryEbookRepository::new()));

        service.create_ebook(go_basics()).await.unwrap();
        let other = NewEbook {
            producer_id: "p-2".to_string(),
            ..go_basics()
        };

        assert!(service.create_ebook(other).await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creations_persist_exactly_one_record() {
        let repository = Arc::new(InMemoryEbookRepository::new());
        let service = Arc::new(service_with(repository.clone()));

        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.create_ebook(go_basics()).await })
            })
            .collect();

        let mut created = 0;
        let mut duplicates = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => created += 1,
                Err(CreateEbookError::Duplicate { .. }) => duplicates += 1,
                Err(other) => panic!("unexpected failure: {other:?}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(duplicates, 31);
        assert_eq!(repository.len(), 1);
    }

    #[tokio::test]
    async fn save_failure_is_persistence_error() {
        let repository = Arc::new(FlakyRepository::failing(RepositoryFault::Save));
        let service = service_with(repository.clone());

        let err = service.create_ebook(go_basics()).await.unwrap_err();

        assert!(matches!(
            err,
            CreateEbookError::Persistence(RepositoryError::Write { .. })
        ));
        assert_eq!(repository.stored(), 0);
    }

    #[rstest]
    #[case::offline(RepositoryFault::Offline)]
    #[case::timeout(RepositoryFault::Lookup)]
    #[case::rejected(RepositoryFault::Query)]
    #[tokio::test]
    async fn lookup_failure_stops_before_identifier_assignment(#[case] fault: RepositoryFault) {
        let repository = Arc::new(FlakyRepository::failing(fault));
        let ids = Arc::new(BrokenIds::default());
        let service = EbookService::new(
            ids.clone(),
            repository.clone(),
            Arc::new(FieldValidator::ebook_entity()),
        );

        let err = service.create_ebook(go_basics()).await.unwrap_err();

        let expected = match fault {
            RepositoryFault::Offline => matches!(
                err,
                CreateEbookError::Persistence(RepositoryError::Unavailable { .. })
            ),
            RepositoryFault::Lookup => matches!(
                err,
                CreateEbookError::Persistence(RepositoryError::Timeout { .. })
            ),
            _ => matches!(
                err,
                CreateEbookError::Persistence(RepositoryError::Query { .. })
            ),
        };
        assert!(expected, "unexpected error for {fault:?}: {err:?}");
        assert_eq!(ids.calls(), 0);
        assert_eq!(repository.save_attempts(), 0);
    }

    #[tokio::test]
    async fn duplicate_skips_identifier_and_save() {
        let repository = Arc::new(FlakyRepository::healthy());
        let ids = Arc::new(BrokenIds::default());
        let service = EbookService::new(
            ids.clone(),
            repository.clone(),
            Arc::new(FieldValidator::ebook_entity()),
        );
        repository.seed(go_basics().into_ebook("seeded".to_string()));

        let err = service.create_ebook(go_basics()).await.unwrap_err();

        assert!(matches!(err, CreateEbookError::Duplicate { .. }));
        assert_eq!(ids.calls(), 0);
        assert_eq!(repository.save_attempts(), 0);
    }

    #[tokio::test]
    async fn generation_failure_is_reported_without_saving() {
        let repository = Arc::new(FlakyRepository::healthy());
        let ids = Arc::new(BrokenIds::default());
        let service = EbookService::new(
            ids.clone(),
            repository.clone(),
            Arc::new(FieldValidator::ebook_entity()),
        );

        let err = service.create_ebook(go_basics()).await.unwrap_err();

        assert!(matches!(
            err,
            CreateEbookError::Generation(IdGenerationError::ClockBeforeEpoch)
        ));
        assert_eq!(ids.calls(), 1);
        assert_eq!(repository.save_attempts(), 0);
    }
}
