use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("login failed: {0}")]
    LoginError(String),
    #[error("portal API error: {0}")]
    ApiError(String),
    #[error("unexpected portal API response")]
    UnexpectedApiResponse,
    /// Body that could not be parsed, and why.
    #[error("invalid portal response ({1}): {0}")]
    InvalidResponse(String, String),
    #[error("portal rate limit exceeded: {0}")]
    RateExceeded(String),
    #[error("invalid date '{0}' (expected YYYY-MM-DD): {1}")]
    DateError(String, chrono::ParseError),
    #[error("unknown resolution '{0}' (expected 15min, hour or day)")]
    UnknownResolution(String),
    #[error("{}: {source}", .path.display())]
    IoError { path: PathBuf, source: io::Error },
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
    #[error("internal error")]
    InternalError,
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Error {
        Error::IoError {
            path: path.into(),
            source,
        }
    }
}
