use std::{path::PathBuf, time::Duration};

use clap::Args;
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use spindle::{
    Session, SessionConfig,
    backends::candle::CandleBackend,
    session::parameter::{ContextMode, SamplingSeed},
};

#[derive(Args, Debug, Clone)]
pub struct SessionOptions {
    /// GGUF model file
    pub model_path: PathBuf,
    /// tokenizer.json, defaults to the one next to the model
    #[arg(long)]
    pub tokenizer: Option<PathBuf>,
    /// JSON session config; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub context_length: Option<usize>,
    #[arg(long)]
    pub batch_capacity: Option<usize>,
    #[arg(long)]
    pub gpu_layers: Option<u32>,
    #[arg(long)]
    pub threads: Option<usize>,
    #[arg(long)]
    pub seed: Option<u64>,
    /// Keep the context between prompts
    #[arg(long)]
    pub persistent: bool,
}

impl SessionOptions {
    pub fn session_config(&self) -> Result<SessionConfig, String> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::from_file(path)
                .map_err(|error| error.to_string())?,
            None => SessionConfig::default(),
        };
        config.model_path = self.model_path.clone();
        if let Some(tokenizer) = &self.tokenizer {
            config = config.tokenizer_path(tokenizer.clone());
        }
        if let Some(context_length) = self.context_length {
            config = config.context_length(context_length);
        }
        if let Some(batch_capacity) = self.batch_capacity {
            config = config.batch_capacity(batch_capacity);
        }
        if let Some(gpu_layers) = self.gpu_layers {
            config = config.gpu_layers(gpu_layers);
        }
        if let Some(threads) = self.threads {
            config = config.threads(threads);
        }
        if let Some(seed) = self.seed {
            config = config.sampling_seed(SamplingSeed::Custom(seed));
        }
        if self.persistent {
            config = config.context_mode(ContextMode::Persistent);
        }
        Ok(config)
    }
}

pub fn load_session(
    options: &SessionOptions
) -> Result<Session<CandleBackend>, String> {
    let style_bold = Style::new().bold();
    let model_name = style_bold
        .apply_to(
            options
                .model_path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| options.model_path.display().to_string()),
        )
        .to_string();

    let config = options.session_config()?;

    let progress_bar = ProgressBar::new_spinner();
    progress_bar.enable_steady_tick(Duration::from_millis(100));
    progress_bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} Loading: {msg}")
            .map_err(|error| error.to_string())?,
    );
    progress_bar.set_message(model_name.clone());

    let session = Session::new(CandleBackend::new(), config);
    match &session {
        Ok(_) => {
            progress_bar.set_style(
                ProgressStyle::default_spinner()
                    .template("Loaded: {msg}")
                    .map_err(|error| error.to_string())?,
            );
            progress_bar.finish_with_message(model_name);
        },
        Err(_) => progress_bar.finish_and_clear(),
    }
    session.map_err(|error| error.to_string())
}
