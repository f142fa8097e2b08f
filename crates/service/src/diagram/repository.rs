use async_trait::async_trait;

use super::domain::{Diagram, DiagramFilter};
use crate::errors::ServiceError;

/// Storage capability for backend-persisted diagrams.
/// Implementations: in-memory map and the managed sea-orm table.
#[async_trait]
pub trait DiagramRepository: Send + Sync {
    /// Insert or fully overwrite the record with the same id.
    async fn save(&self, diagram: Diagram) -> Result<Diagram, ServiceError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Diagram>, ServiceError>;
    /// Records matching `filter`, ordered by id.
    async fn find_all(&self, filter: &DiagramFilter) -> Result<Vec<Diagram>, ServiceError>;
    /// Remove the record if present; absent ids are not an error.
    async fn delete_by_id(&self, id: &str) -> Result<(), ServiceError>;
}

/// Call-counting repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::diagram::repo::memory::InMemoryDiagramRepository;

    /// Wraps the in-memory backend, counts calls and can pretend the medium
    /// is down.
    #[derive(Default)]
    pub struct CountingRepository {
        inner: InMemoryDiagramRepository,
        saves: AtomicUsize,
        finds: AtomicUsize,
        lists: AtomicUsize,
        deletes: AtomicUsize,
        unavailable: AtomicBool,
    }

    impl CountingRepository {
        pub fn saves(&self) -> usize { self.saves.load(Ordering::SeqCst) }
        pub fn finds(&self) -> usize { self.finds.load(Ordering::SeqCst) }
        pub fn lists(&self) -> usize { self.lists.load(Ordering::SeqCst) }
        pub fn deletes(&self) -> usize { self.deletes.load(Ordering::SeqCst) }

        pub fn set_unavailable(&self, down: bool) {
            self.unavailable.store(down, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), ServiceError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(ServiceError::StorageUnavailable("mock backend offline".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DiagramRepository for CountingRepository {
        async fn save(&self, diagram: Diagram) -> Result<Diagram, ServiceError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            self.inner.save(diagram).await
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<Diagram>, ServiceError> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            self.inner.find_by_id(id).await
        }

        async fn find_all(&self, filter: &DiagramFilter) -> Result<Vec<Diagram>, ServiceError> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            self.inner.find_all(filter).await
        }

        async fn delete_by_id(&self, id: &str) -> Result<(), ServiceError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            self.inner.delete_by_id(id).await
        }
    }
}
