use thiserror::Error;

/// Top-level error type for the application shell.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::app::ConfigError),

    #[error("Initialization error: {0}")]
    Initialization(#[from] crate::app::InitializationError),

    #[error("Reporter setup error: {0}")]
    Reporter(#[from] crate::reporter::ReportError),
}
