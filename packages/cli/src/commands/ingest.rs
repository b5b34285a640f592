use anyhow::{Context, Result};
use clap::Args;
use postkit_editor::{Document, EditorContext, ViewNode};
use std::fs;

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// External view tree (JSON array of view nodes)
    pub file: String,
}

/// Upcast an external tree into the model and print the repaired result
pub fn ingest(args: IngestArgs) -> Result<()> {
    let source = fs::read_to_string(&args.file).with_context(|| format!("Failed to read {}", args.file))?;
    let nodes: Vec<ViewNode> =
        serde_json::from_str(&source).with_context(|| format!("{} is not a view tree", args.file))?;

    let doc = Document::from_view(EditorContext::standard(), &nodes)?;
    println!("{}", serde_json::to_string_pretty(doc.root())?);

    Ok(())
}
