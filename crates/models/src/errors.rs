use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("database error: {0}")]
    Db(String),
    #[error("decode error in column {column}: {reason}")]
    Decode { column: &'static str, reason: String },
}
