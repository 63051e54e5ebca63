#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend returned status {0}")]
    Status(i32),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[cfg(feature = "candle")]
    #[error(transparent)]
    Candle(#[from] candle_core::Error),
}

impl BackendError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}
