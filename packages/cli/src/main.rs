mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{emotions, ingest, render, upload, EmotionsArgs, IngestArgs, RenderArgs, UploadArgs};
use tracing_subscriber::{fmt, EnvFilter};

/// Postkit CLI - rich-text post engine tooling
#[derive(Parser, Debug)]
#[command(name = "postkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Repair a model tree and render it
    Render(RenderArgs),

    /// Convert an external view tree into the model
    Ingest(IngestArgs),

    /// Upload a file to the configured endpoint
    Upload(UploadArgs),

    /// Browse the emotion catalog
    Emotions(EmotionsArgs),
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays pipeable
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();

    let result = match std::env::current_dir() {
        Ok(dir) => {
            let cwd = dir.display().to_string();
            match cli.command {
                Command::Render(args) => render(args),
                Command::Ingest(args) => ingest(args),
                Command::Upload(args) => upload(args, &cwd).await,
                Command::Emotions(args) => emotions(args, &cwd),
            }
        }
        Err(err) => Err(anyhow::anyhow!("Cannot get current directory: {}", err)),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
