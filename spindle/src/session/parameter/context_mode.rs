use serde::{Deserialize, Serialize};

/// Lifetime of the backend context (and its KV cache) relative to
/// `generate` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// A new context for every call; the whole prompt is recomputed.
    Fresh,
    /// One context kept across calls until `reset`. Positions continue from
    /// where the previous call stopped and count against the same budget.
    Persistent,
}

impl Default for ContextMode {
    fn default() -> Self {
        ContextMode::Fresh
    }
}
