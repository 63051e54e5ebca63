use std::process::ExitCode;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use cli::{
    handlers::{handle_generate, handle_run},
    logger::init_logger,
    session_loader::SessionOptions,
};

#[derive(Parser)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with a model interactively
    Run {
        #[command(flatten)]
        options: SessionOptions,
        /// Maximum number of generated tokens per message
        #[arg(long, default_value_t = 256)]
        tokens_limit: usize,
    },
    /// Stream a single completion to stdout
    Generate {
        #[command(flatten)]
        options: SessionOptions,
        /// Prompt to complete
        prompt: String,
        /// Maximum number of generated tokens
        #[arg(long, default_value_t = 256)]
        tokens_limit: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Some(Commands::Run {
            options,
            tokens_limit,
        }) => {
            handle_run(options, tokens_limit);
        },
        Some(Commands::Generate {
            options,
            prompt,
            tokens_limit,
        }) => {
            if let Err(error) = handle_generate(options, prompt, tokens_limit) {
                eprintln!("❌ {}", error);
                return ExitCode::FAILURE;
            }
        },
        None => {
            let mut cmd = Cli::command();
            let _ = cmd.print_help();
        },
    }
    ExitCode::SUCCESS
}
