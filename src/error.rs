use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Unable to acquire guest token: {0}")]
    Credential(String),
    #[error("Tweet not found: {0}")]
    NotFound(u64),
    #[error("Twitter rate limit hit")]
    RateLimited,
    #[error("Twitter response status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("Unable to decode conversation: {0}")]
    Decode(
        #[source]
        #[from]
        serde_json::Error,
    ),
    #[error("Request canceled: {0}")]
    Canceled(String),
    #[error("Error performing HTTP request: {0}")]
    Transport(#[source] reqwest::Error),
}

impl ScrapeError {
    /// Timeouts are reported the same way as caller cancellation.
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ScrapeError::Canceled(format!("timed out: {e}"))
        } else {
            ScrapeError::Transport(e)
        }
    }

    /// Whether the failure is down to the request rather than the upstream.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ScrapeError::NotFound(_))
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
