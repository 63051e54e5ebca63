use super::{ConfigError, CursorError};
use crate::{backends::BackendError, batch::BatchError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid session config: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("Unable to load model: {0}")]
    ModelLoad(#[source] BackendError),
    #[error("Unable to create context: {0}")]
    ContextCreation(#[source] BackendError),
    #[error(
        "Context length exceeded: {required} tokens required, {available} available"
    )]
    BudgetExceeded {
        required: usize,
        available: usize,
    },
    #[error("Decode failed at position {position}: {source}")]
    Decode {
        position: usize,
        #[source]
        source: BackendError,
    },
    #[error(transparent)]
    CapacityExceeded(#[from] BatchError),
    #[error(transparent)]
    ContextOverrun(#[from] CursorError),
    #[error("Prompt produced no tokens")]
    EmptyPrompt,
    #[error("Unable to encode text: {0}")]
    UnableToEncodeText(#[source] BackendError),
    #[error("Unable to decode token {token}: {source}")]
    UnableToDecodeToken {
        token: u32,
        #[source]
        source: BackendError,
    },
    #[error("Sampling failed: no logits available")]
    SamplingFailed,
    #[error("Session has been released")]
    SessionReleased,
}
