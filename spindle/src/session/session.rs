use std::time::Instant;

use log::{debug, info, warn};

use super::{
    Cursor, Error, FinishReason, GenerationResult, SessionConfig, SessionState,
    Stats, StepStats, TokenSink, TotalStats, parameter::ContextMode,
};
use crate::{
    backends::{Backend, TokenId},
    batch::Batch,
    sampler::{ArgmaxSampler, LogitsSampler},
};

const SEQUENCE_ID: i32 = 0;

struct LiveContext<C> {
    handle: C,
    cursor: Cursor,
    // Emitted to the sink but not decoded yet because the run was cancelled.
    pending: Option<TokenId>,
}

pub struct Session<B: Backend> {
    config: SessionConfig,
    backend: B,
    model: Option<B::Model>,
    context: Option<LiveContext<B::Context>>,
    batch: Batch,
    sampler: ArgmaxSampler,
    state: SessionState,
}

impl<B: Backend> Session<B> {
    pub fn new(
        mut backend: B,
        config: SessionConfig,
    ) -> Result<Self, Error> {
        config.validate()?;

        info!("Loading model from {}", config.model_path.display());
        let model = backend
            .load_model(&config.model_params())
            .map_err(Error::ModelLoad)?;
        info!(
            "Model loaded: vocabulary size {}, context length {}, batch capacity {}",
            backend.vocabulary_size(&model),
            config.context_length,
            config.batch_capacity
        );

        let batch = Batch::new(config.batch_capacity);
        Ok(Self {
            config,
            backend,
            model: Some(model),
            context: None,
            batch,
            sampler: ArgmaxSampler::default(),
            state: SessionState::ModelLoaded,
        })
    }

    /// Streams up to `max_new_tokens` greedily selected tokens for `prompt`
    /// into `sink`.
    ///
    /// The request is rejected with [`Error::BudgetExceeded`] before any
    /// decode when the prompt plus `max_new_tokens` cannot fit into the
    /// context. The batch buffer is cleared on every exit path, and in
    /// [`ContextMode::Fresh`] the context is released as well.
    pub fn generate<S>(
        &mut self,
        prompt: &str,
        max_new_tokens: usize,
        sink: &mut S,
    ) -> Result<GenerationResult, Error>
    where
        S: TokenSink + ?Sized,
    {
        let result = self.generate_internal(prompt, max_new_tokens, sink);
        self.batch.clear();

        let is_fresh = self.config.context_mode == ContextMode::Fresh;
        match &result {
            Ok(output) => {
                self.state = SessionState::from(&output.finish_reason);
                if is_fresh {
                    self.release_context();
                }
            },
            Err(Error::SessionReleased) => {},
            Err(error) => {
                self.state = SessionState::Failed;
                if is_fresh || !keeps_context(error) {
                    self.release_context();
                }
            },
        }
        result
    }

    pub fn destroy(&mut self) {
        self.release_context();
        if let Some(model) = self.model.take() {
            self.backend.release_model(model);
            info!("Model released");
        }
        self.batch.clear();
        self.state = SessionState::Released;
    }

    /// Drops the persistent context so the next call starts from position 0.
    pub fn reset(&mut self) -> Result<(), Error> {
        if self.model.is_none() {
            return Err(Error::SessionReleased);
        }
        self.release_context();
        self.state = SessionState::ModelLoaded;
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Next position to be decoded in the live context, 0 when there is none.
    pub fn cursor(&self) -> usize {
        self.context
            .as_ref()
            .map(|live| live.cursor.position())
            .unwrap_or(0)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: Backend> Session<B> {
    fn generate_internal<S>(
        &mut self,
        prompt: &str,
        max_new_tokens: usize,
        sink: &mut S,
    ) -> Result<GenerationResult, Error>
    where
        S: TokenSink + ?Sized,
    {
        let run_start = Instant::now();
        let Self {
            config,
            backend,
            model,
            context,
            batch,
            sampler,
            state,
        } = self;
        let model = model.as_ref().ok_or(Error::SessionReleased)?;

        let live = Self::prepare_context(backend, model, config, context)?;
        *state = SessionState::ContextReady;

        let prompt_tokens = backend
            .tokenize(&live.handle, prompt)
            .map_err(Error::UnableToEncodeText)?;
        let mut tokens: Vec<TokenId> = live.pending.iter().copied().collect();
        tokens.extend_from_slice(&prompt_tokens);
        if tokens.is_empty() {
            return Err(Error::EmptyPrompt);
        }

        let start = live.cursor.position();
        let total_tokens = start
            .saturating_add(tokens.len())
            .saturating_add(max_new_tokens);
        if total_tokens > config.context_length {
            warn!(
                "Rejecting generation: {} tokens required, context length is {}",
                total_tokens, config.context_length
            );
            return Err(Error::BudgetExceeded {
                required: total_tokens,
                available: config.context_length,
            });
        }
        *state = SessionState::Generating;

        let mut prefill_durations: Vec<f64> = Vec::new();
        let number_of_prefill_steps = tokens.len().div_ceil(batch.capacity());
        for (step, chunk) in tokens.chunks(batch.capacity()).enumerate() {
            batch.clear();
            for &token in chunk {
                let position = live.cursor.advance()?;
                batch.add(token, position, SEQUENCE_ID, false)?;
            }
            if step + 1 == number_of_prefill_steps {
                batch.mark_last_wants_logits()?;
            }
            debug!(
                "Prefill step {}/{}: {} tokens",
                step + 1,
                number_of_prefill_steps,
                batch.len()
            );
            prefill_durations.push(Self::decode(backend, &mut live.handle, batch)?);
        }
        live.pending = None;

        let vocabulary_size = backend.vocabulary_size(model);
        let end_of_sequence = backend.end_of_sequence_id(model);
        let mut text = String::new();
        let mut generated_tokens: usize = 0;
        let mut generate_durations: Vec<f64> = Vec::new();
        let mut finish_reason = FinishReason::Length;
        while live.cursor.position() < total_tokens {
            let logits = backend.logits_for_last_token(&live.handle);
            let token = sampler
                .sample(logits, vocabulary_size)
                .ok_or(Error::SamplingFailed)?;
            if token == end_of_sequence {
                finish_reason = FinishReason::Stop;
                break;
            }

            let fragment = backend
                .detokenize(&live.handle, token)
                .map_err(|source| Error::UnableToDecodeToken {
                    token,
                    source,
                })?;
            generated_tokens += 1;
            text.push_str(&fragment);
            if !sink.on_token(&fragment) {
                live.pending = Some(token);
                finish_reason = FinishReason::Cancelled;
                break;
            }

            batch.clear();
            let position = live.cursor.advance()?;
            batch.add(token, position, SEQUENCE_ID, true)?;
            generate_durations.push(Self::decode(backend, &mut live.handle, batch)?);
        }

        let cursor = live.cursor.position() + usize::from(live.pending.is_some());
        info!(
            "Generation finished ({:?}): {} prompt tokens, {} generated, cursor at {}",
            finish_reason,
            prompt_tokens.len(),
            generated_tokens,
            cursor
        );

        let generate_stats = if generate_durations.is_empty() {
            None
        } else {
            Some(StepStats::new(generated_tokens, &generate_durations))
        };
        let stats = Stats {
            prefill_stats: StepStats::new(tokens.len(), &prefill_durations),
            generate_stats,
            total_stats: TotalStats {
                duration: run_start.elapsed().as_secs_f64(),
                tokens_count_input: prompt_tokens.len() as u64,
                tokens_count_output: generated_tokens as u64,
            },
        };

        Ok(GenerationResult {
            cursor,
            prompt_tokens: prompt_tokens.len(),
            generated_tokens,
            text,
            finish_reason,
            stats,
        })
    }

    fn prepare_context<'a>(
        backend: &mut B,
        model: &B::Model,
        config: &SessionConfig,
        slot: &'a mut Option<LiveContext<B::Context>>,
    ) -> Result<&'a mut LiveContext<B::Context>, Error> {
        let live = match slot.take() {
            Some(live) if config.context_mode == ContextMode::Persistent => {
                live
            },
            previous => {
                if let Some(previous) = previous {
                    backend.release_context(previous.handle);
                }
                let params = config.context_params();
                info!(
                    "Creating context: {} positions, {} threads",
                    params.context_length, params.threads
                );
                let handle = backend
                    .create_context(model, &params)
                    .map_err(Error::ContextCreation)?;
                LiveContext {
                    handle,
                    cursor: Cursor::new(config.context_length),
                    pending: None,
                }
            },
        };
        Ok(slot.insert(live))
    }

    fn decode(
        backend: &mut B,
        context: &mut B::Context,
        batch: &Batch,
    ) -> Result<f64, Error> {
        let position = batch.first_position().unwrap_or_default();
        let decode_start = Instant::now();
        backend.decode(context, batch).map_err(|source| Error::Decode {
            position,
            source,
        })?;
        Ok(decode_start.elapsed().as_secs_f64())
    }

    fn release_context(&mut self) {
        if let Some(live) = self.context.take() {
            self.backend.release_context(live.handle);
            debug!("Context released");
        }
    }
}

impl<B: Backend> Drop for Session<B> {
    fn drop(&mut self) {
        self.destroy();
    }
}

// Errors raised before the first decode leave a persistent context untouched.
fn keeps_context(error: &Error) -> bool {
    matches!(
        error,
        Error::BudgetExceeded { .. }
            | Error::EmptyPrompt
            | Error::UnableToEncodeText(_)
    )
}
