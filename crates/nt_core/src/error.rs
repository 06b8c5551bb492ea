use thiserror::Error;

use crate::http::FetchError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Upstream timed out: {0}")]
    UpstreamTimeout(String),

    #[error("Upstream {url} returned status {status}")]
    UpstreamBadStatus { url: String, status: u16 },

    #[error("Malformed upstream body: {0}")]
    UpstreamMalformedBody(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Both models failed (primary: {primary}; secondary: {secondary})")]
    ModelBothFailed { primary: String, secondary: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid submission: {0}")]
    Validation(String),

    #[error("No text provided")]
    EmptyArticle,

    #[error("Inference error: {0}")]
    Inference(String),
}

impl Error {
    /// Attaches the requested URL to a transport failure.
    pub fn from_fetch(url: &str, err: FetchError) -> Self {
        match err {
            FetchError::Timeout => Error::UpstreamTimeout(url.to_string()),
            FetchError::Connection(msg) => Error::Connection(format!("{}: {}", url, msg)),
            FetchError::NonJsonBody(msg) => {
                Error::UpstreamMalformedBody(format!("{}: {}", url, msg))
            }
            FetchError::HttpStatus(status) => Error::UpstreamBadStatus {
                url: url.to_string(),
                status,
            },
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidUrl(err.to_string())
    }
}
