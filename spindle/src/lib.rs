pub mod backends;
pub mod batch;
pub mod sampler;
pub mod session;

pub use backends::{Backend, BackendError, ContextParams, ModelParams, TokenId};
pub use batch::{Batch, BatchEntry, BatchError};
pub use sampler::{ArgmaxSampler, LogitsSampler};
pub use session::{
    Error, FinishReason, GenerationResult, Session, SessionConfig,
    SessionState, TokenSink,
};
