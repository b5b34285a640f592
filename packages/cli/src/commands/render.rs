use anyhow::{Context, Result};
use clap::Args;
use postkit_editor::{Document, EditorContext, ModelElement};
use std::fs;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Model tree to render (JSON, rooted at `$root`)
    pub file: String,

    /// Print HTML instead of the view tree
    #[arg(long)]
    pub html: bool,
}

pub fn render(args: RenderArgs) -> Result<()> {
    let source = fs::read_to_string(&args.file).with_context(|| format!("Failed to read {}", args.file))?;
    let root: ModelElement =
        serde_json::from_str(&source).with_context(|| format!("{} is not a model tree", args.file))?;

    println!("{}", render_root(root, args.html)?);
    Ok(())
}

/// Load `root` through the repair pass and serialize the downcast result
fn render_root(root: ModelElement, html: bool) -> Result<String> {
    let doc = Document::load(EditorContext::standard(), root)?;
    if html {
        Ok(doc.to_html())
    } else {
        Ok(serde_json::to_string_pretty(&doc.render())?)
    }
}
