use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    Stop,
    Length,
    Cancelled,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RunStats {
    pub count: u64,
    pub average_duration: f64,
}

impl RunStats {
    pub fn from_durations(durations: &[f64]) -> Self {
        let count = durations.len();
        let average_duration = if count == 0 {
            0.0
        } else {
            durations.iter().sum::<f64>() / count as f64
        };
        Self {
            count: count as u64,
            average_duration,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StepStats {
    pub duration: f64,
    pub tokens_count: u64,
    pub tokens_per_second: f64,
    pub model_run: RunStats,
}

impl StepStats {
    pub fn new(
        tokens_count: usize,
        durations: &[f64],
    ) -> Self {
        let duration = durations.iter().sum::<f64>();
        let tokens_per_second = if duration > 0.0 {
            tokens_count as f64 / duration
        } else {
            0.0
        };
        Self {
            duration,
            tokens_count: tokens_count as u64,
            tokens_per_second,
            model_run: RunStats::from_durations(durations),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TotalStats {
    pub duration: f64,
    pub tokens_count_input: u64,
    pub tokens_count_output: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Stats {
    pub prefill_stats: StepStats,
    pub generate_stats: Option<StepStats>,
    pub total_stats: TotalStats,
}

/// Outcome of one `generate` call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationResult {
    /// Positions consumed in the context, prompt and generated tokens
    /// together. A token the sink cancelled on is counted even though it was
    /// never decoded.
    pub cursor: usize,
    pub prompt_tokens: usize,
    pub generated_tokens: usize,
    pub text: String,
    pub finish_reason: FinishReason,
    pub stats: Stats,
}
