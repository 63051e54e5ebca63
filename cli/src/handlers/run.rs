use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::Text;
use spindle::{FinishReason, GenerationResult};

use crate::session_loader::{SessionOptions, load_session};

const PROGRESS_BAR_MESSAGE_LIMIT: usize = 1024;

fn tail(
    text: &str,
    limit: usize,
) -> String {
    let skip = text.chars().count().saturating_sub(limit);
    text.chars().skip(skip).collect()
}

fn format_output(result: &GenerationResult) -> String {
    let stats = &result.stats;
    let tokens_per_second = if let Some(generate_stats) = &stats.generate_stats
    {
        generate_stats.tokens_per_second
    } else {
        stats.prefill_stats.tokens_per_second
    };

    let style_stats = Style::new().bold();
    let mut stats_info = format!(
        "{:.3}s, {:.3}t/s, cursor {}",
        stats.total_stats.duration, tokens_per_second, result.cursor,
    );
    if result.finish_reason == FinishReason::Cancelled {
        stats_info.push_str(", cancelled");
    }

    format!("{}\n\n{}", result.text, style_stats.apply_to(stats_info))
}

pub fn handle_run(
    options: SessionOptions,
    tokens_limit: usize,
) {
    let mut session = match load_session(&options) {
        Ok(session) => session,
        Err(error) => {
            eprintln!("❌ Unable to load session: {}", error);
            return;
        },
    };

    let is_model_running = Arc::new(AtomicBool::new(false));
    let is_model_running_for_ctrlc = is_model_running.clone();
    if let Err(error) = ctrlc::set_handler(move || {
        if is_model_running_for_ctrlc.load(Ordering::SeqCst) {
            is_model_running_for_ctrlc.store(false, Ordering::SeqCst);
        }
    }) {
        eprintln!("❌ Unable to install Ctrl-C handler: {}", error);
        return;
    }

    loop {
        let input =
            match Text::new("").with_placeholder("Send a message").prompt() {
                Ok(input) => input,
                Err(_) => {
                    break;
                },
            };
        if input.is_empty() {
            continue;
        }
        if input == "/reset" {
            if let Err(error) = session.reset() {
                eprintln!("❌ Unable to reset session: {}", error);
            }
            continue;
        }

        is_model_running.store(true, Ordering::SeqCst);

        let progress_bar = ProgressBar::new_spinner();
        progress_bar.enable_steady_tick(Duration::from_millis(100));
        progress_bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        let mut streamed = String::new();
        let mut sink = |text: &str| {
            if !is_model_running.load(Ordering::SeqCst) {
                return false;
            }
            streamed.push_str(text);
            progress_bar
                .set_message(tail(&streamed, PROGRESS_BAR_MESSAGE_LIMIT));
            true
        };

        let generation = session.generate(&input, tokens_limit, &mut sink);
        progress_bar.finish_and_clear();
        is_model_running.store(false, Ordering::SeqCst);

        match generation {
            Ok(result) => println!("{}", format_output(&result)),
            Err(error) => {
                eprintln!("❌ Error during generation: {}", error);
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::tail;

    #[test]
    fn test_tail_keeps_last_characters() {
        assert_eq!(tail("héllo", 3), "llo");
        assert_eq!(tail("hi", 8), "hi");
    }
}
