//! Diagram module: domain types, storage abstraction with its backends,
//! the static catalog and the application service.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod catalog;
pub mod service;

pub use catalog::StaticCatalog;
pub use domain::{Diagram, DiagramFilter, DiagramSource, DiagramSummary};
pub use repository::DiagramRepository;
pub use service::DiagramService;
