use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use webqa::config::API_KEY_VAR;
use webqa::{AnswerService, GeminiConfig, QueryPreprocessor, load_env_file, server};

/// webqa - ask a question, get an answer from Gemini
#[derive(Parser)]
#[command(name = "webqa")]
#[command(about = "A minimal web front-end for question answering with Gemini")]
#[command(version)]
struct Cli {
    /// Load environment variables from this file instead of ./.env
    #[arg(long, global = true, value_name = "PATH")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve(ServeCommand),
    /// Answer a single question and print the result
    Ask(AskCommand),
}

/// Start the web server
#[derive(Parser)]
struct ServeCommand {
    /// Address to bind
    #[arg(long, env = "WEBQA_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "WEBQA_PORT", default_value_t = 5000)]
    port: u16,
}

/// Answer one question from the terminal
#[derive(Parser)]
struct AskCommand {
    /// The question to ask
    #[arg(value_name = "QUESTION")]
    question: String,
}

/// Failure classes mapped to process exit codes.
#[derive(Debug, thiserror::Error)]
enum AskFailure {
    #[error("Question cannot be empty")]
    EmptyQuestion,
    #[error("{0}")]
    Answer(String),
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Serve(cmd) => handle_serve(cli.env_file.clone(), cmd),
        Commands::Ask(cmd) => handle_ask(cli.env_file.clone(), cmd),
    };

    if let Err(e) = result {
        let exit_code = match e.downcast_ref::<AskFailure>() {
            Some(AskFailure::EmptyQuestion) => 1,
            Some(AskFailure::Answer(_)) => 2,
            None => 2,
        };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Loads configuration and builds the answer service.
fn build_service(env_file: Option<PathBuf>) -> Result<AnswerService> {
    if let Some(path) = load_env_file(env_file.as_deref())? {
        info!(path = %path.display(), "Loaded environment file");
    }

    let config = GeminiConfig::from_env().context("Invalid configuration")?;
    if !config.has_api_key() {
        warn!("{API_KEY_VAR} is NOT set. Every answer request will fail until it is configured.");
    }
    info!(model = config.model(), timeout = ?config.timeout(), "Configuration loaded");

    AnswerService::from_config(config).context("Failed to create Gemini client")
}

fn handle_serve(env_file: Option<PathBuf>, cmd: &ServeCommand) -> Result<()> {
    // Declared before the runtime so the blocking client is dropped after it.
    let service = Arc::new(build_service(env_file)?);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let addr = SocketAddr::new(cmd.host, cmd.port);
    runtime.block_on(server::run(addr, Arc::clone(&service)))
}

fn handle_ask(env_file: Option<PathBuf>, cmd: &AskCommand) -> Result<()> {
    if cmd.question.trim().is_empty() {
        return Err(AskFailure::EmptyQuestion.into());
    }

    let service = build_service(env_file)?;
    let processed = QueryPreprocessor::process(&cmd.question);
    println!("Processed: {processed}");

    let result = service.answer(&processed);
    if result.is_error() {
        return Err(AskFailure::Answer(result.answer().to_string()).into());
    }

    println!();
    println!("{}", result.answer());
    Ok(())
}
