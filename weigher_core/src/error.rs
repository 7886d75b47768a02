use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ReaderError {
    #[error("byte source error: {0}")]
    Source(String),
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
