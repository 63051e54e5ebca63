#![allow(dead_code)]

use spindle::{
    Backend, BackendError, Batch, BatchEntry, ContextParams, ModelParams,
    TokenId,
};

pub const EOS: TokenId = 0;
pub const VOCABULARY: [&str; 14] = [
    "<eos>", "He", "llo", " world", "!", " the", " quick", " fox", "a", "b",
    "c", "d", "e", " ",
];

pub fn token(piece: &str) -> TokenId {
    VOCABULARY
        .iter()
        .position(|candidate| *candidate == piece)
        .map(|index| index as TokenId)
        .unwrap_or_else(|| panic!("{piece:?} is not in the test vocabulary"))
}

pub struct ScriptedModel {
    pub script: Vec<TokenId>,
}

pub struct ScriptedContext {
    pub context_length: usize,
    pub seed: u64,
    script: Vec<TokenId>,
    script_index: usize,
    positions: Vec<usize>,
    logits: Vec<f32>,
}

/// Backend that replays a fixed list of "sampled" tokens.
///
/// Every decode whose last entry wants logits produces a one-hot row for the
/// next scripted token; once the script runs out it keeps producing `!`.
/// Decoding a position twice or past the context length fails like a KV cache
/// overrun would.
#[derive(Default)]
pub struct ScriptedBackend {
    pub script: Vec<TokenId>,
    pub fail_model_load: bool,
    pub fail_context_creations: usize,
    pub fail_decode_call: Option<usize>,

    pub decode_calls: Vec<Vec<BatchEntry>>,
    pub contexts_created: usize,
    pub contexts_released: usize,
    pub models_released: usize,
    pub last_seed: Option<u64>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<TokenId>) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    pub fn with_script_text(pieces: &[&str]) -> Self {
        Self::new(pieces.iter().map(|piece| token(piece)).collect())
    }

    pub fn decoded_positions(&self) -> Vec<usize> {
        self.decode_calls
            .iter()
            .flat_map(|entries| entries.iter().map(|entry| entry.position))
            .collect()
    }
}

impl Backend for ScriptedBackend {
    type Model = ScriptedModel;
    type Context = ScriptedContext;

    fn load_model(
        &mut self,
        params: &ModelParams,
    ) -> Result<Self::Model, BackendError> {
        if self.fail_model_load {
            return Err(BackendError::message(format!(
                "Unable to open {}",
                params.model_path.display()
            )));
        }
        Ok(ScriptedModel {
            script: self.script.clone(),
        })
    }

    fn create_context(
        &mut self,
        model: &Self::Model,
        params: &ContextParams,
    ) -> Result<Self::Context, BackendError> {
        if self.fail_context_creations > 0 {
            self.fail_context_creations -= 1;
            return Err(BackendError::message("Out of memory"));
        }
        self.contexts_created += 1;
        self.last_seed = Some(params.seed);
        Ok(ScriptedContext {
            context_length: params.context_length,
            seed: params.seed,
            script: model.script.clone(),
            script_index: 0,
            positions: Vec::new(),
            logits: Vec::new(),
        })
    }

    fn tokenize(
        &self,
        _context: &Self::Context,
        text: &str,
    ) -> Result<Vec<TokenId>, BackendError> {
        let mut tokens = Vec::new();
        let mut rest = text;
        while !rest.is_empty() {
            let (index, piece) = VOCABULARY
                .iter()
                .enumerate()
                .skip(1)
                .filter(|(_, piece)| rest.starts_with(*piece))
                .max_by_key(|(_, piece)| piece.len())
                .ok_or_else(|| {
                    BackendError::message(format!("Unknown text {rest:?}"))
                })?;
            tokens.push(index as TokenId);
            rest = &rest[piece.len()..];
        }
        Ok(tokens)
    }

    fn detokenize(
        &self,
        _context: &Self::Context,
        token: TokenId,
    ) -> Result<String, BackendError> {
        VOCABULARY
            .get(token as usize)
            .map(|piece| piece.to_string())
            .ok_or(BackendError::Status(-2))
    }

    fn vocabulary_size(
        &self,
        _model: &Self::Model,
    ) -> usize {
        VOCABULARY.len()
    }

    fn end_of_sequence_id(
        &self,
        _model: &Self::Model,
    ) -> TokenId {
        EOS
    }

    fn decode(
        &mut self,
        context: &mut Self::Context,
        batch: &Batch,
    ) -> Result<(), BackendError> {
        let call_index = self.decode_calls.len();
        self.decode_calls.push(batch.entries().to_vec());
        if self.fail_decode_call == Some(call_index) {
            return Err(BackendError::Status(1));
        }

        for entry in batch.entries() {
            if entry.position >= context.context_length
                || context.positions.contains(&entry.position)
            {
                return Err(BackendError::Status(1));
            }
            context.positions.push(entry.position);
        }

        context.logits.clear();
        if batch.entries().last().is_some_and(|entry| entry.wants_logits) {
            let next = context
                .script
                .get(context.script_index)
                .copied()
                .unwrap_or_else(|| token("!"));
            context.script_index += 1;
            context.logits = vec![-1.0; VOCABULARY.len()];
            context.logits[next as usize] = 1.0;
        }
        Ok(())
    }

    fn logits_for_last_token<'a>(
        &self,
        context: &'a Self::Context,
    ) -> &'a [f32] {
        &context.logits
    }

    fn release_context(
        &mut self,
        context: Self::Context,
    ) {
        self.contexts_released += 1;
        drop(context);
    }

    fn release_model(
        &mut self,
        model: Self::Model,
    ) {
        self.models_released += 1;
        drop(model);
    }
}
