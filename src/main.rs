use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use uigen::config::{ChatSettings, ServerConfig};
use uigen::llm::{LlmChat, LlmClient};
use uigen::render::Registry;
use uigen::services::preview;
use uigen::{routes, state};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "uigen", about = "Chat-driven UI preview service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },
    /// Compile a reply from FILE (or stdin) and print the preview JSON.
    Compile { file: Option<PathBuf> },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(port).await,
        Command::Compile { file } => {
            if let Err(e) = compile(file) {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
    }
}

async fn serve(port: Option<u16>) {
    let mut server = ServerConfig::from_env();
    if let Some(port) = port {
        server.port = port;
    }

    // Non-fatal: chat requests report the missing configuration instead.
    let llm: Option<Arc<dyn LlmChat>> = match LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), fallback = ?client.fallback_model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured, chat disabled");
            None
        }
    };

    let state = state::AppState::new(llm, ChatSettings::from_env());
    let app = routes::app(state, server.body_limit);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", server.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = server.port, "uigen listening");
    axum::serve(listener, app).await.expect("server failed");
}

fn compile(file: Option<PathBuf>) -> Result<(), CliError> {
    let source = match &file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|source| CliError::Read { path: path.display().to_string(), source })?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| CliError::Read { path: "stdin".to_owned(), source })?;
            buf
        }
    };

    let settings = ChatSettings::from_env();
    let result = preview::preview(&source, &settings.limits, &Registry::builtin());
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
