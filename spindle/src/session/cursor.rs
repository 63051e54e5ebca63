#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Position {position} is outside of the context length {limit}")]
pub struct CursorError {
    pub position: usize,
    pub limit: usize,
}

/// Next unused sequence position of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    position: usize,
    limit: usize,
}

impl Cursor {
    pub fn new(limit: usize) -> Self {
        Self {
            position: 0,
            limit,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    /// Hands out the current position and moves past it.
    pub fn advance(&mut self) -> Result<usize, CursorError> {
        if self.position >= self.limit {
            return Err(CursorError {
                position: self.position,
                limit: self.limit,
            });
        }
        let position = self.position;
        self.position += 1;
        Ok(position)
    }
}
