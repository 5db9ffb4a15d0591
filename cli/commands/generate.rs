use crate::cli_args::GenerateArgs;
use crate::load_config_for_command;
use crate::output;
use anyhow::{Context, Result};
use colored::Colorize;
use foldertext_core::{self as core, Attachment, Config, ScanReport};
use log;
use std::env;
use std::path::{Path, PathBuf};

pub fn handle_generate_command(args: GenerateArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let mut config = load_config_for_command(
        &project_root,
        &args.project_config,
        Some(&args.ignore),
        Some(&args.format_output),
    )
    .context("Failed to load configuration")?;
    if let Some(header) = &args.header {
        config.output.header = header.clone();
    }

    let report = core::run_scan(&project_root, &config)
        .with_context(|| format!("Failed to scan {}", project_root.display()))?;
    output::print_warnings(&report.warnings, quiet);

    let format = config.output.format.to_lowercase();
    let pretty_json = args.format_output.disable_json_minify;

    match &args.save {
        Some(cli_dir) => {
            let base = env::current_dir().context("Failed to read current directory")?;
            let save_dir = config.resolve_save_dir(cli_dir.as_deref(), &base);
            let attachment = build_attachment(&report, &config, &format, pretty_json)?;
            if let Some(path) = save_attachment(&attachment, &save_dir, quiet)? {
                if !quiet {
                    print_saved(&path, &report);
                }
            }
        }
        None => {
            output::print_data_or_text(
                &report,
                Some(report.concatenated_text.clone()),
                &format,
                pretty_json,
                "scanReport",
            )?;
        }
    }
    Ok(())
}

/// The plain-text document keeps the configured file name; structured formats
/// swap its extension for the format's.
fn build_attachment(
    report: &ScanReport,
    config: &Config,
    format: &str,
    pretty_json: bool,
) -> Result<Attachment> {
    if format == "text" {
        return Ok(report.attachment().with_file_name(config.save.filename.clone()));
    }
    let content = output::serialize_output(report, format, pretty_json, "scanReport")?;
    let file_name = PathBuf::from(&config.save.filename)
        .with_extension(format)
        .to_string_lossy()
        .into_owned();
    Ok(Attachment::processed_files(content).with_file_name(file_name))
}

/// Writes `attachment` into `save_dir` unless an existing file there is kept.
/// Returns the written path, or `None` when the overwrite was declined.
fn save_attachment(attachment: &Attachment, save_dir: &Path, quiet: bool) -> Result<Option<PathBuf>> {
    let target = save_dir.join(&attachment.file_name);
    if !output::confirm_overwrite(&target, quiet)? {
        log::info!("Kept existing file {}", target.display());
        return Ok(None);
    }
    let path = attachment
        .write_to_dir(save_dir)
        .with_context(|| format!("Failed to save output to {}", save_dir.display()))?;
    Ok(Some(path))
}

fn print_saved(path: &Path, report: &ScanReport) {
    println!(
        "{} {} file(s), {} line(s) saved to: {}",
        "✅".green(),
        report.file_list.len().to_string().cyan(),
        report.result.total_lines().to_string().cyan(),
        path.display().to_string().blue()
    );
}
