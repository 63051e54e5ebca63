use std::path::PathBuf;

use crate::{backends::BackendError, batch::Batch};

pub type TokenId = u32;

#[derive(Debug, Clone)]
pub struct ModelParams {
    pub model_path: PathBuf,
    pub tokenizer_path: Option<PathBuf>,
    pub gpu_layers: u32,
    pub threads: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ContextParams {
    pub context_length: usize,
    pub seed: u64,
    pub threads: usize,
}

/// The inference library a [`Session`](crate::session::Session) drives.
///
/// A backend owns weight loading, tokenization and the forward pass. The
/// session only ever talks to it through this trait, so the decode loop can be
/// exercised against a scripted implementation in tests.
///
/// Model handles are read-only after load. Context handles carry the KV cache
/// and are mutated by [`Backend::decode`] only; a context is never decoded by
/// two callers at once.
pub trait Backend {
    type Model;
    type Context;

    fn load_model(
        &mut self,
        params: &ModelParams,
    ) -> Result<Self::Model, BackendError>;

    fn create_context(
        &mut self,
        model: &Self::Model,
        params: &ContextParams,
    ) -> Result<Self::Context, BackendError>;

    fn tokenize(
        &self,
        context: &Self::Context,
        text: &str,
    ) -> Result<Vec<TokenId>, BackendError>;

    fn detokenize(
        &self,
        context: &Self::Context,
        token: TokenId,
    ) -> Result<String, BackendError>;

    fn vocabulary_size(
        &self,
        model: &Self::Model,
    ) -> usize;

    fn end_of_sequence_id(
        &self,
        model: &Self::Model,
    ) -> TokenId;

    /// Runs one forward pass over `batch`.
    ///
    /// Logits are only guaranteed for the entry flagged `wants_logits`, and
    /// only until the next call.
    fn decode(
        &mut self,
        context: &mut Self::Context,
        batch: &Batch,
    ) -> Result<(), BackendError>;

    /// Scores of the last decoded entry that requested logits. Empty when the
    /// most recent decode requested none.
    fn logits_for_last_token<'a>(
        &self,
        context: &'a Self::Context,
    ) -> &'a [f32];

    fn release_context(
        &mut self,
        context: Self::Context,
    ) {
        drop(context);
    }

    fn release_model(
        &mut self,
        model: Self::Model,
    ) {
        drop(model);
    }
}
