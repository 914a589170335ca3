use thiserror::Error;

/// Boxed error produced by the transport while reading the response body.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures surfaced by the streaming decoder.
///
/// Malformed payloads are not represented here: they are skipped where they
/// occur and never reach the caller.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("No response body for streaming")]
    MissingBody,

    #[error("Callbacks are required for streaming")]
    MissingCallbacks,

    #[error("Stream read failed: {0}")]
    Transport(#[source] BoxError),
}

impl StreamError {
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
