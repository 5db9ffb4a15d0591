use crate::cli_args::FoldersArgs;
use crate::load_config_for_command;
use crate::output::print_data_or_text;
use anyhow::{Context, Result};
use colored::*;
use foldertext_core::{Config, FolderChoice, list_top_level_folders};
use log;
use std::path::Path;

pub fn handle_folders_command(args: FoldersArgs, _quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    let config = load_config_for_command(
        &project_root,
        &args.project_config,
        None,
        Some(&args.format_output),
    )
    .context("Failed to load configuration for folders command")?;

    let root = args.root.as_deref().unwrap_or(&config.folders.root);
    log::info!("Listing folders under {}", root.display());
    let choices = list_top_level_folders(root, config.general.sort_entries)
        .with_context(|| format!("Failed to list folders under {}", root.display()))?;

    print_data_or_text(
        &choices,
        Some(render_choices(root, &choices)),
        &config.output.format,
        args.format_output.disable_json_minify,
        "folders",
    )
}

fn render_choices(root: &Path, choices: &[FolderChoice]) -> String {
    if choices.is_empty() {
        return format!("{}", format!("(No folders under {})", root.display()).dimmed());
    }
    let mut out = String::new();
    for choice in choices {
        out.push_str(&format!("{}\n", choice.path.display().to_string().cyan().bold()));
        for sub in &choice.subfolders {
            out.push_str(&format!("  - {}\n", sub.display()));
        }
    }
    out
}
