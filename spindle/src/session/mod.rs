mod cursor;
pub mod parameter;
mod session;
mod session_config;
mod session_error;
mod session_output;
mod session_state;
mod token_sink;

pub use cursor::{Cursor, CursorError};
pub use session::Session;
pub use session_config::{ConfigError, SessionConfig};
pub use session_error::Error;
pub use session_output::{
    FinishReason, GenerationResult, RunStats, Stats, StepStats, TotalStats,
};
pub use session_state::SessionState;
pub use token_sink::TokenSink;
