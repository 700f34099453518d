/// Application-level errors
///
/// Only `OfficeNotFound` and `NoCandidates` are meant to reach callers of
/// the recommendation pipeline; provider and cache failures are absorbed
/// where they occur and degrade the result instead.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Office not found: {0}")]
    OfficeNotFound(String),

    #[error("No candidates to recommend")]
    NoCandidates,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;
