use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    backends::{ContextParams, ModelParams},
    session::parameter::{ContextMode, ResolvableValue, SamplingSeed},
};

const DEFAULT_SEED: u64 = 777;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Context length must be positive")]
    ZeroContextLength,
    #[error("Batch capacity must be positive")]
    ZeroBatchCapacity,
    #[error(
        "Batch capacity {batch_capacity} exceeds context length {context_length}"
    )]
    BatchLargerThanContext {
        batch_capacity: usize,
        context_length: usize,
    },
    #[error("Unable to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    pub model_path: PathBuf,
    pub tokenizer_path: Option<PathBuf>,
    pub context_length: usize,
    pub gpu_layers: u32,
    pub threads: usize,
    pub sampling_seed: SamplingSeed,
    pub batch_capacity: usize,
    pub context_mode: ContextMode,
}

impl SessionConfig {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            ..Self::default()
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: SessionConfig =
            serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.context_length == 0 {
            return Err(ConfigError::ZeroContextLength);
        }
        if self.batch_capacity == 0 {
            return Err(ConfigError::ZeroBatchCapacity);
        }
        if self.batch_capacity > self.context_length {
            return Err(ConfigError::BatchLargerThanContext {
                batch_capacity: self.batch_capacity,
                context_length: self.context_length,
            });
        }
        Ok(())
    }

    pub fn model_params(&self) -> ModelParams {
        ModelParams {
            model_path: self.model_path.clone(),
            tokenizer_path: self.tokenizer_path.clone(),
            gpu_layers: self.gpu_layers,
            threads: self.threads,
        }
    }

    pub fn context_params(&self) -> ContextParams {
        ContextParams {
            context_length: self.context_length,
            seed: self.sampling_seed.resolve(),
            threads: self.threads,
        }
    }

    pub fn tokenizer_path(
        mut self,
        tokenizer_path: impl Into<PathBuf>,
    ) -> Self {
        self.tokenizer_path = Some(tokenizer_path.into());
        self
    }

    pub fn context_length(
        mut self,
        context_length: usize,
    ) -> Self {
        self.context_length = context_length;
        self
    }

    pub fn gpu_layers(
        mut self,
        gpu_layers: u32,
    ) -> Self {
        self.gpu_layers = gpu_layers;
        self
    }

    pub fn threads(
        mut self,
        threads: usize,
    ) -> Self {
        self.threads = threads;
        self
    }

    pub fn sampling_seed(
        mut self,
        sampling_seed: SamplingSeed,
    ) -> Self {
        self.sampling_seed = sampling_seed;
        self
    }

    pub fn batch_capacity(
        mut self,
        batch_capacity: usize,
    ) -> Self {
        self.batch_capacity = batch_capacity;
        self
    }

    pub fn context_mode(
        mut self,
        context_mode: ContextMode,
    ) -> Self {
        self.context_mode = context_mode;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            tokenizer_path: None,
            context_length: 4096,
            gpu_layers: 20,
            threads: 4,
            sampling_seed: SamplingSeed::Custom(DEFAULT_SEED),
            batch_capacity: 512,
            context_mode: ContextMode::Fresh,
        }
    }
}
