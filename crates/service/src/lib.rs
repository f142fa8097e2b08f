//! Service layer for architecture diagrams.
//! - Storage backends behind the `DiagramRepository` trait (in-memory, managed table).
//! - Read-only static catalog of bundled JSON diagrams.
//! - `DiagramService` merging both sources and owning the create/update rules.

pub mod errors;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
pub mod diagram;
