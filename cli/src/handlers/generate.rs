use std::io::{self, Write};

use spindle::FinishReason;

use crate::session_loader::{SessionOptions, load_session};

pub fn handle_generate(
    options: SessionOptions,
    prompt: String,
    tokens_limit: usize,
) -> Result<(), String> {
    let mut session = load_session(&options)?;

    let mut stdout = io::stdout().lock();
    let mut sink = |text: &str| {
        stdout.write_all(text.as_bytes()).is_ok() && stdout.flush().is_ok()
    };
    let result = session
        .generate(&prompt, tokens_limit, &mut sink)
        .map_err(|error| error.to_string())?;
    println!();

    log::info!(
        "{} prompt tokens, {} generated, cursor {}",
        result.prompt_tokens,
        result.generated_tokens,
        result.cursor
    );
    if result.finish_reason == FinishReason::Cancelled {
        return Err("Output stream closed".to_string());
    }
    Ok(())
}
