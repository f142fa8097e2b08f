use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::diagram::domain::{Diagram, DiagramFilter};
use crate::diagram::repository::DiagramRepository;
use crate::errors::ServiceError;

/// Process-local diagram store.
///
/// One `RwLock` guards the whole map: writers are exclusive, readers never see
/// a half-applied save or delete. Keys are kept ordered so listings are stable.
#[derive(Clone, Default)]
pub struct InMemoryDiagramRepository {
    inner: Arc<RwLock<BTreeMap<String, Diagram>>>,
}

impl InMemoryDiagramRepository {
    pub fn new() -> Self { Self::default() }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl DiagramRepository for InMemoryDiagramRepository {
    async fn save(&self, diagram: Diagram) -> Result<Diagram, ServiceError> {
        let mut map = self.inner.write().await;
        map.insert(diagram.id.clone(), diagram.clone());
        Ok(diagram)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Diagram>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(id).cloned())
    }

    async fn find_all(&self, filter: &DiagramFilter) -> Result<Vec<Diagram>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.values().filter(|d| filter.matches(d)).cloned().collect())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        map.remove(id);
        Ok(())
    }
}
