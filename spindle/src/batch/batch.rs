use super::BatchError;
use crate::backends::TokenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchEntry {
    pub token: TokenId,
    pub position: usize,
    pub sequence_id: i32,
    pub wants_logits: bool,
}

/// Tokens queued for a single decode call.
///
/// Capacity is fixed at construction; the buffer is cleared and refilled for
/// every chunk instead of being reallocated.
#[derive(Debug, Clone)]
pub struct Batch {
    entries: Vec<BatchEntry>,
    capacity: usize,
}

impl Batch {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn add(
        &mut self,
        token: TokenId,
        position: usize,
        sequence_id: i32,
        wants_logits: bool,
    ) -> Result<(), BatchError> {
        if self.is_full() {
            return Err(BatchError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.entries.push(BatchEntry {
            token,
            position,
            sequence_id,
            wants_logits,
        });
        Ok(())
    }

    pub fn mark_last_wants_logits(&mut self) -> Result<(), BatchError> {
        let last = self.entries.last_mut().ok_or(BatchError::Empty)?;
        last.wants_logits = true;
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn tokens(&self) -> Vec<TokenId> {
        self.entries.iter().map(|entry| entry.token).collect()
    }

    pub fn first_position(&self) -> Option<usize> {
        self.entries.first().map(|entry| entry.position)
    }
}
