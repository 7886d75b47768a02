use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("open serial port {port}: {msg}")]
    Open { port: String, msg: String },
    #[error("serial port is closed")]
    Closed,
    #[error("replay file {path}: {msg}")]
    Replay { path: String, msg: String },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;
