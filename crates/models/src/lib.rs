//! Persistence models for the managed diagram table.

pub mod errors;
pub mod db;
pub mod diagram;
