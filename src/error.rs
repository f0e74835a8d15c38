use thiserror::Error;

/// Failure of one generation step. The CLI decides how to surface it.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("missing setting `{0}` (set it in syllabus.toml or SYLLABUS_{1})")]
    MissingSetting(&'static str, &'static str),

    #[error("{service} API returned {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),

    #[error("not a Google Sheets URL: {0}")]
    InvalidSheetUrl(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = GenerationError> = std::result::Result<T, E>;
