use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid channel frame: {0}")]
    Frame(#[source] serde_json::Error),
    #[error("invalid event payload: {0}")]
    Payload(#[source] serde_json::Error),
}
