//! answerline CLI: the main entry point.
//!
//! Commands:
//! - `ask`     answer one question and print `[{ "output": ... }]`
//! - `serve`   start the HTTP gateway
//! - `config`  print the effective (or default) configuration
//! - `check`   health-check every configured provider
//! - `exam`    answer a multiple-choice exam file and grade it

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "answerline",
    about = "answerline: one LLM answer step with tool calling",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Config file to use instead of ~/.answerline/config.toml
    #[arg(short, long, global = true, env = "ANSWERLINE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Ask {
        /// The question to answer
        question: String,
    },

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show the effective configuration (API keys redacted)
    Config {
        /// Print the built-in defaults instead
        #[arg(long)]
        default: bool,
    },

    /// Check that every configured provider is reachable
    Check,

    /// Answer every question of an exam file and grade the letters
    Exam {
        /// Questions JSON: `{ "questions": [{ "question", "options", "metadata" }] }`
        questions: PathBuf,

        /// Exam name in the report (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Questions in flight at once
        #[arg(long, default_value_t = 1)]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so `ask` output stays machine-readable
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Ask { question } => commands::ask::run(config_path, question).await?,
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Config { default } => commands::config_cmd::run(config_path, default)?,
        Commands::Check => commands::check::run(config_path).await?,
        Commands::Exam {
            questions,
            name,
            out,
            concurrency,
        } => {
            commands::exam::run(config_path, &questions, name, out.as_deref(), concurrency).await?
        }
    }

    Ok(())
}
