use std::{fs::File, path::PathBuf};

use candle_core::{DType, Device, Tensor, quantized::gguf_file};
use candle_transformers::models::quantized_llama::{MAX_SEQ_LEN, ModelWeights};
use log::{debug, info};
use tokenizers::Tokenizer;

use super::is_file_fits_ram;
use crate::{
    backends::{Backend, BackendError, ContextParams, ModelParams, TokenId},
    batch::Batch,
};

const EOS_TOKEN_ID_KEY: &str = "tokenizer.ggml.eos_token_id";
const TOKENS_KEY: &str = "tokenizer.ggml.tokens";
const FALLBACK_EOS_TOKENS: [&str; 3] = ["</s>", "<|endoftext|>", "<|eot_id|>"];

pub struct CandleModel {
    weights: ModelWeights,
    tokenizer: Tokenizer,
    device: Device,
    end_of_sequence: TokenId,
    vocabulary_size: usize,
}

pub struct CandleContext {
    weights: ModelWeights,
    tokenizer: Tokenizer,
    device: Device,
    context_length: usize,
    next_position: usize,
    logits: Vec<f32>,
}

/// Quantized GGUF llama-family models on candle.
///
/// Offloading is all or nothing: any positive `gpu_layers` selects the first
/// CUDA device when one is available.
#[derive(Debug, Default)]
pub struct CandleBackend {}

impl CandleBackend {
    pub fn new() -> Self {
        Self {}
    }

    fn tokenizer_path(params: &ModelParams) -> PathBuf {
        params
            .tokenizer_path
            .clone()
            .unwrap_or_else(|| params.model_path.with_file_name("tokenizer.json"))
    }

    fn select_device(gpu_layers: u32) -> Result<Device, BackendError> {
        if gpu_layers == 0 {
            return Ok(Device::Cpu);
        }
        Ok(Device::cuda_if_available(0)?)
    }

    fn forward(
        context: &mut CandleContext,
        tokens: &[TokenId],
        position: usize,
    ) -> Result<Tensor, BackendError> {
        let input = Tensor::new(tokens, &context.device)?.unsqueeze(0)?;
        Ok(context.weights.forward(&input, position)?)
    }

    fn end_of_sequence(
        content: &gguf_file::Content,
        tokenizer: &Tokenizer,
    ) -> Result<TokenId, BackendError> {
        if let Some(value) = content.metadata.get(EOS_TOKEN_ID_KEY) {
            return Ok(value.to_u32()?);
        }
        FALLBACK_EOS_TOKENS
            .iter()
            .find_map(|token| tokenizer.token_to_id(token))
            .ok_or_else(|| {
                BackendError::message("Unable to find end-of-sequence token")
            })
    }
}

impl Backend for CandleBackend {
    type Model = CandleModel;
    type Context = CandleContext;

    fn load_model(
        &mut self,
        params: &ModelParams,
    ) -> Result<Self::Model, BackendError> {
        if !is_file_fits_ram(&params.model_path) {
            return Err(BackendError::message(
                "Model is too large to fit into available RAM",
            ));
        }

        let device = Self::select_device(params.gpu_layers)?;
        let mut file = File::open(&params.model_path)?;
        let content = gguf_file::Content::read(&mut file)?;

        let tokenizer = Tokenizer::from_file(Self::tokenizer_path(params))
            .map_err(|error| BackendError::message(error.to_string()))?;
        let end_of_sequence = Self::end_of_sequence(&content, &tokenizer)?;
        let vocabulary_size = content
            .metadata
            .get(TOKENS_KEY)
            .and_then(|value| value.to_vec().ok())
            .map(|tokens| tokens.len())
            .unwrap_or_else(|| tokenizer.get_vocab_size(true));

        let weights = ModelWeights::from_gguf(content, &mut file, &device)?;
        info!(
            "Loaded {} on {:?} (eos {}, {} threads requested)",
            params.model_path.display(),
            device,
            end_of_sequence,
            params.threads
        );

        Ok(CandleModel {
            weights,
            tokenizer,
            device,
            end_of_sequence,
            vocabulary_size,
        })
    }

    fn create_context(
        &mut self,
        model: &Self::Model,
        params: &ContextParams,
    ) -> Result<Self::Context, BackendError> {
        if params.context_length > MAX_SEQ_LEN {
            return Err(BackendError::message(format!(
                "Context length {} exceeds the supported maximum of {}",
                params.context_length, MAX_SEQ_LEN
            )));
        }
        // The loaded weights are never decoded against, so a clone starts
        // with an empty KV cache.
        Ok(CandleContext {
            weights: model.weights.clone(),
            tokenizer: model.tokenizer.clone(),
            device: model.device.clone(),
            context_length: params.context_length,
            next_position: 0,
            logits: Vec::new(),
        })
    }

    fn tokenize(
        &self,
        context: &Self::Context,
        text: &str,
    ) -> Result<Vec<TokenId>, BackendError> {
        // BOS and friends only belong at the start of the context.
        let add_special_tokens = context.next_position == 0;
        let encoding = context
            .tokenizer
            .encode(text, add_special_tokens)
            .map_err(|error| BackendError::message(error.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn detokenize(
        &self,
        context: &Self::Context,
        token: TokenId,
    ) -> Result<String, BackendError> {
        let text = context
            .tokenizer
            .decode(&[token], false)
            .map_err(|error| BackendError::message(error.to_string()))?;
        // Decoders strip the word-boundary marker of a lone piece.
        let starts_word = context
            .tokenizer
            .id_to_token(token)
            .map(|piece| piece.starts_with('▁') || piece.starts_with('Ġ'))
            .unwrap_or(false);
        if starts_word && !text.starts_with(char::is_whitespace) {
            return Ok(format!(" {text}"));
        }
        Ok(text)
    }

    fn vocabulary_size(
        &self,
        model: &Self::Model,
    ) -> usize {
        model.vocabulary_size
    }

    fn end_of_sequence_id(
        &self,
        model: &Self::Model,
    ) -> TokenId {
        model.end_of_sequence
    }

    fn decode(
        &mut self,
        context: &mut Self::Context,
        batch: &Batch,
    ) -> Result<(), BackendError> {
        let entries = batch.entries();
        let Some(first) = entries.first() else {
            return Err(BackendError::message("Empty batch"));
        };
        let start = first.position;
        for (offset, entry) in entries.iter().enumerate() {
            if entry.position != start + offset {
                return Err(BackendError::message(format!(
                    "Non-contiguous position {} in batch starting at {}",
                    entry.position, start
                )));
            }
            if entry.wants_logits && offset + 1 != entries.len() {
                return Err(BackendError::message(
                    "Logits are only available for the last batch entry",
                ));
            }
        }
        if start + entries.len() > context.context_length {
            return Err(BackendError::message(format!(
                "Batch ends at {} past context length {}",
                start + entries.len(),
                context.context_length
            )));
        }

        let tokens = batch.tokens();
        // The llama causal mask only spans the new tokens, so a multi-token
        // batch can run in one pass only against an empty KV cache.
        let logits = if start == 0 {
            Self::forward(context, &tokens, start)?
        } else {
            let mut logits = None;
            for (offset, token) in tokens.iter().enumerate() {
                logits = Some(Self::forward(
                    context,
                    std::slice::from_ref(token),
                    start + offset,
                )?);
            }
            logits.ok_or_else(|| BackendError::message("Empty batch"))?
        };
        context.next_position = start + entries.len();
        debug!("Decoded {} tokens at position {}", entries.len(), start);

        context.logits.clear();
        if entries.last().is_some_and(|entry| entry.wants_logits) {
            context.logits =
                logits.squeeze(0)?.to_dtype(DType::F32)?.to_vec1::<f32>()?;
        }
        Ok(())
    }

    fn logits_for_last_token<'a>(
        &self,
        context: &'a Self::Context,
    ) -> &'a [f32] {
        &context.logits
    }
}
