use thiserror::Error;

/// Failure of a single sink call.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink unavailable: {0}")]
    Unavailable(String),

    #[error("rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum ReportError {
    /// The durable record could not be written. Messaging failures never surface here.
    #[error("log store append failed: {0}")]
    LogStore(#[source] SinkError),
}
