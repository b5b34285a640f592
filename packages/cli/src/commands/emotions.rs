use crate::config::Config;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use postkit_editor::DEFAULT_PER_PAGE;

#[derive(Args, Debug)]
pub struct EmotionsArgs {
    /// Group to list; lists the groups when omitted
    #[arg(short, long)]
    pub group: Option<String>,

    /// 1-based page within the group
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: usize,
}

pub fn emotions(args: EmotionsArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let catalog = match config.emotion_catalog(cwd)? {
        Some(catalog) if catalog.is_enabled() => catalog,
        _ => {
            println!("{}", "Emotions are disabled".yellow());
            return Ok(());
        }
    };

    let Some(group) = args.group else {
        for name in catalog.groups() {
            let count = catalog.emotions_for_group(name).len();
            println!("{} {}", name.bold(), format!("({count})").dimmed());
        }
        return Ok(());
    };

    if !catalog.groups().contains(&group.as_str()) {
        bail!("Unknown emotion group: {}", group);
    }

    let page = catalog.page(&group, args.page, args.per_page);
    println!("{} page {}/{}", group.bold(), page.page, page.total_pages);
    for tile in &page.tiles {
        println!("  {:>6}  {}", tile.id.cyan(), tile.url);
    }

    Ok(())
}
