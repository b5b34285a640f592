use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use postkit_upload::{UploadFile, UploadOutcome, Uploader};
use std::path::Path;

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// File to upload
    pub file: String,

    /// Override the configured endpoint base URL
    #[arg(long)]
    pub base_url: Option<String>,
}

pub async fn upload(args: UploadArgs, cwd: &str) -> Result<()> {
    let mut config = Config::load(cwd)?;
    if args.base_url.is_some() {
        config.upload.base_url = args.base_url;
    }

    let file = UploadFile::from_path(Path::new(&args.file))
        .await
        .with_context(|| format!("Failed to read {}", args.file))?;

    println!("{} {} ({} bytes)", "Uploading".cyan().bold(), file.name, file.size);

    let uploader = Uploader::new(config.upload);
    let mut handle = uploader.start(file);

    // Ctrl-C aborts the upload instead of killing the process
    let cancel = handle.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    while let Some(tick) = handle.progress.recv().await {
        eprint!("\r  {}/{} bytes", tick.sent, tick.total);
    }
    eprintln!();

    match handle.finish().await {
        UploadOutcome::Succeeded(uploaded) => {
            println!("{} {}", "Uploaded".green().bold(), uploaded.urls.default);
            println!("{}", serde_json::to_string_pretty(&uploaded)?);
            Ok(())
        }
        UploadOutcome::Failed(err) => Err(err.into()),
        UploadOutcome::Aborted => {
            println!("{}", "Upload aborted".yellow());
            Ok(())
        }
    }
}
