mod batch;
mod error;

pub use batch::{Batch, BatchEntry};
pub use error::BatchError;
