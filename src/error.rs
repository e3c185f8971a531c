use thiserror::Error;

/// Failures that abort a whole extraction pass. Nothing reaches the cache
/// when one of these is returned.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("request failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("status code error for {url}: {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("unable to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unparsable day heading: {0:?}")]
    DayHeading(String),
    #[error("extraction task failed: {0}")]
    Join(String),
}

pub type Result<T, E = ScheduleError> = std::result::Result<T, E>;
