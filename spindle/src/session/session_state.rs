use super::FinishReason;

/// Lifecycle of a [`Session`](super::Session). A session only exists once its
/// model is loaded, so it starts in `ModelLoaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    ModelLoaded,
    ContextReady,
    Generating,
    Completed,
    Cancelled,
    Failed,
    Released,
}

impl From<&FinishReason> for SessionState {
    fn from(value: &FinishReason) -> Self {
        match value {
            FinishReason::Stop | FinishReason::Length => SessionState::Completed,
            FinishReason::Cancelled => SessionState::Cancelled,
        }
    }
}
