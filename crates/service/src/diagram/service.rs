use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::catalog::StaticCatalog;
use super::domain::{
    Diagram, DiagramCreateRequest, DiagramFilter, DiagramSource, DiagramSummary, DiagramUpdateRequest,
};
use super::repository::DiagramRepository;
use crate::errors::ServiceError;

/// Diagram business service, independent of the web framework.
///
/// Reads merge the storage backend with the static catalog; writes only ever
/// touch the backend.
pub struct DiagramService {
    repo: Arc<dyn DiagramRepository>,
    catalog: Arc<StaticCatalog>,
}

// Millisecond precision survives every backend column type unchanged.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn validate_title(title: &str) -> Result<(), ServiceError> {
    if title.trim().is_empty() {
        return Err(ServiceError::Validation("title must not be blank".into()));
    }
    Ok(())
}

impl DiagramService {
    pub fn new(repo: Arc<dyn DiagramRepository>, catalog: Arc<StaticCatalog>) -> Self {
        Self { repo, catalog }
    }

    pub fn catalog(&self) -> &StaticCatalog {
        &self.catalog
    }

    /// Backend diagrams matching `filter`, followed by matching catalog
    /// diagrams. Both halves keep their own order and nothing is deduplicated.
    #[instrument(skip(self))]
    pub async fn list_all(&self, filter: &DiagramFilter) -> Result<Vec<DiagramSummary>, ServiceError> {
        let stored = self.repo.find_all(filter).await?;
        let statics = self.catalog.load_static_diagrams().await;
        let mut out: Vec<DiagramSummary> = stored.into_iter().map(Diagram::into_summary).collect();
        let backend_count = out.len();
        out.extend(statics.into_iter().filter(|d| filter.matches(d)).map(Diagram::into_summary));
        debug!(backend = backend_count, total = out.len(), "diagrams_listed");
        Ok(out)
    }

    /// Backend first, then the catalog.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Diagram>, ServiceError> {
        if let Some(d) = self.repo.find_by_id(id).await? {
            debug!(id = %id, source = %d.source, "diagram_found");
            return Ok(Some(d));
        }
        let found = self.catalog.load_static_diagram_by_id(id).await;
        debug!(id = %id, found = found.is_some(), "diagram_catalog_lookup");
        Ok(found)
    }

    /// Persist a new backend diagram.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::diagram::{DiagramService, StaticCatalog, DiagramSource};
    /// use service::diagram::domain::DiagramCreateRequest;
    /// use service::diagram::repository::mock::CountingRepository;
    /// let repo = Arc::new(CountingRepository::default());
    /// let svc = DiagramService::new(repo.clone(), Arc::new(StaticCatalog::new(Vec::<std::path::PathBuf>::new())));
    /// let req = DiagramCreateRequest { title: "Order Flow".into(), ..Default::default() };
    /// let d = tokio_test::block_on(svc.create(req)).unwrap();
    /// assert_eq!(d.version, 1);
    /// assert_eq!(d.source, DiagramSource::Db);
    /// assert_eq!(repo.saves(), 1);
    /// ```
    #[instrument(skip(self, req), fields(title = %req.title))]
    pub async fn create(&self, req: DiagramCreateRequest) -> Result<Diagram, ServiceError> {
        validate_title(&req.title)?;
        let ts = now();
        let diagram = Diagram {
            id: Uuid::new_v4().to_string(),
            title: req.title,
            description: req.description,
            tags: req.tags.unwrap_or_default(),
            flow: req.flow,
            version: 1,
            source: DiagramSource::Db,
            created_at: ts,
            updated_at: ts,
        };
        let saved = self.repo.save(diagram).await?;
        info!(id = %saved.id, "diagram_created");
        Ok(saved)
    }

    /// Apply a partial update to a backend diagram. `Ok(None)` when no
    /// backend record has this id; catalog diagrams are never updated.
    ///
    /// The read and the write are two separate backend calls with no lock in
    /// between, so concurrent writers are last-writer-wins: a `delete` that
    /// lands between them is undone by the save.
    #[instrument(skip(self, req))]
    pub async fn update(&self, id: &str, req: DiagramUpdateRequest) -> Result<Option<Diagram>, ServiceError> {
        let Some(mut diagram) = self.repo.find_by_id(id).await? else {
            debug!(id = %id, "diagram_update_missing");
            return Ok(None);
        };
        if let Some(title) = req.title {
            validate_title(&title)?;
            diagram.title = title;
        }
        if let Some(description) = req.description {
            diagram.description = Some(description);
        }
        if let Some(tags) = req.tags {
            diagram.tags = tags;
        }
        if let Some(flow) = req.flow {
            diagram.flow = Some(flow);
        }
        diagram.version += 1;
        diagram.updated_at = now();

        let saved = self.repo.save(diagram).await?;
        info!(id = %saved.id, version = saved.version, "diagram_updated");
        Ok(Some(saved))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.repo.delete_by_id(id).await?;
        info!(id = %id, "diagram_deleted");
        Ok(())
    }
}
