mod backend;
mod backend_error;
#[cfg(feature = "candle")]
pub mod candle;

pub use backend::{Backend, ContextParams, ModelParams, TokenId};
pub use backend_error::BackendError;
