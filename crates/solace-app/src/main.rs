//! Solace - therapy platform backend.
//!
//! Runs the HTTP API server, or classifies and chats on the terminal:
//! - `solace serve` starts the API used by the dashboard
//! - `solace classify` checks text for emergency language, exiting with
//!   status 2 when it is flagged
//! - `solace chat` talks to the demo assistant
//! - `solace taxonomy` prints the keyword taxonomy

mod cli;
mod commands;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use directories::ProjectDirs;
use solace_core::ChatSession;
use solace_server::Server;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Args, Command};

/// Get the logs directory path.
fn logs_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "solace", "Solace").map(|dirs| dirs.data_dir().join("logs"))
}

/// Initialize logging with file rotation.
///
/// Console output goes to stderr so command output on stdout stays clean.
fn init_logging(args: &Args) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_level = if args.debug { "debug" } else { &args.log_level };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("solace={},warn", log_level)));

    if let Some(log_dir) = logs_dir() {
        if std::fs::create_dir_all(&log_dir).is_ok() {
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(5)
                .filename_prefix("solace")
                .filename_suffix("log")
                .build(&log_dir)
                .ok();

            if let Some(appender) = file_appender {
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);

                let console = args.debug || matches!(args.command, Command::Serve { .. });
                if console {
                    tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().with_writer(io::stderr))
                        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                        .init();
                } else {
                    tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                        .init();
                }

                tracing::debug!("Logging to {:?}", log_dir);
                return Some(guard);
            }
        }
    }

    // Fallback: console logging only
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    tracing::warn!("File logging unavailable, using console only");
    None
}

/// Joins the words given on the command line, or reads all of stdin.
fn classify_input(words: &[String]) -> anyhow::Result<String> {
    if !words.is_empty() {
        return Ok(words.join(" "));
    }

    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("failed to read text from stdin")?;
    Ok(text)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Keep the guard alive for the duration of the program
    let _log_guard = init_logging(&args);

    match args.command {
        Command::Serve { ref host, port } => {
            tracing::info!("Starting Solace v{}", env!("CARGO_PKG_VERSION"));

            let server = Server::new(args.server_config(host, port))
                .context("failed to configure server")?;
            server.run().await?;

            tracing::info!("Solace shutdown complete");
        }
        Command::Classify {
            ref text,
            all,
            json,
        } => {
            let classifier = args.taxonomy.build_classifier()?;
            let input = classify_input(text)?;
            let mut stdout = io::stdout().lock();
            let flagged = commands::classify(&classifier, &input, all, json, &mut stdout)?;
            return Ok(ExitCode::from(commands::classify_exit_code(flagged)));
        }
        Command::Chat { ref user } => {
            let classifier = Arc::new(args.taxonomy.build_classifier()?);
            let session = ChatSession::new("terminal", user.as_str(), classifier);
            let mut stdout = io::stdout().lock();
            commands::chat(session, io::stdin().lock(), &mut stdout)?;
        }
        Command::Taxonomy => {
            let classifier = args.taxonomy.build_classifier()?;
            let mut stdout = io::stdout().lock();
            commands::taxonomy(&classifier, &mut stdout)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
