#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("Batch capacity of {capacity} tokens exceeded")]
    CapacityExceeded {
        capacity: usize,
    },
    #[error("Batch is empty")]
    Empty,
}
