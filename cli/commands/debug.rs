use crate::cli_args::DebugArgs;
use crate::load_config_for_command;
use crate::output::{self, print_data_or_text};
use anyhow::{Context, Result};
use colored::*;
use foldertext_core::{
    self as core, Config, FileEntry, IgnoreRuleSet, PatternMatcher, RuleOrigin, ScanWarning,
};
use log;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrunedDir<'a> {
    path: &'a str,
    matched_by: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DebugInfo<'a> {
    effective_config: &'a Config,
    ignore_rules: &'a IgnoreRuleSet,
    pruned_dirs: Vec<PrunedDir<'a>>,
    included_files: &'a [FileEntry],
    warnings: &'a [ScanWarning],
}

pub fn handle_debug_command(args: DebugArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(
        &project_root,
        &args.project_config,
        Some(&args.ignore),
        Some(&args.format_output),
    )
    .context("Failed to load configuration for debug command")?;

    log::debug!("Debug: Running scan...");
    let report = core::run_scan(&project_root, &config)
        .with_context(|| format!("Failed to scan {}", project_root.display()))?;
    let matcher = PatternMatcher::new(&report.rules);

    let debug_data = DebugInfo {
        effective_config: &config,
        ignore_rules: &report.rules,
        pruned_dirs: report
            .pruned_dirs
            .iter()
            .map(|path| PrunedDir {
                path,
                matched_by: matcher.matching_patterns(path),
            })
            .collect(),
        included_files: &report.result.files,
        warnings: &report.warnings,
    };

    if is_text_output(&config) {
        print_debug_info_pretty(&debug_data)?;
        output::print_warnings(debug_data.warnings, quiet);
    } else {
        print_data_or_text(
            &debug_data,
            None,
            &config.output.format,
            args.format_output.disable_json_minify,
            "debugInfo",
        )?;
    }
    Ok(())
}

/// The effective format decides, whether it came from `-f` or the config file.
fn is_text_output(config: &Config) -> bool {
    config.output.format == "text"
}

fn print_debug_info_pretty(debug_info: &DebugInfo) -> Result<()> {
    println!(
        "{}",
        "\n--- Effective Configuration ---"
            .green()
            .bold()
            .underline()
    );
    let config_toml = toml::to_string_pretty(debug_info.effective_config)
        .context("Failed to serialize effective config to TOML")?;
    println!("{}", config_toml);

    display_ignore_sources(debug_info.ignore_rules);

    println!("{}", "\n--- Pruned Directories ---".green().bold().underline());
    if debug_info.pruned_dirs.is_empty() {
        println!("{}", "(None)".dimmed());
    } else {
        for pruned in &debug_info.pruned_dirs {
            println!(
                "- {} {}",
                pruned.path.cyan(),
                format!("[{}]", pruned.matched_by.join(", ")).dimmed()
            );
        }
    }

    println!("{}", "\n--- Included Files ---".green().bold().underline());
    output::print_file_table(debug_info.included_files);
    let total_lines: usize = debug_info.included_files.iter().map(|f| f.line_count).sum();
    let total_bytes: usize = debug_info.included_files.iter().map(|f| f.size).sum();
    println!(
        "{:<14} {}\n{:<14} {}\n{:<14} {}",
        "Total Files:".green(),
        debug_info.included_files.len().to_string().cyan(),
        "Total Lines:".green(),
        total_lines.to_string().cyan(),
        "Total Size:".green(),
        output::readable_size(total_bytes).cyan()
    );

    println!("{}", "\n--- End Debug Info ---".green().bold());
    Ok(())
}

fn display_ignore_sources(rules: &IgnoreRuleSet) {
    println!("{}", "\n--- Ignore Rules ---".green().bold().underline());
    if rules.is_empty() {
        println!("{}", "(No ignore patterns)".dimmed());
        return;
    }
    println!(
        "{:<45} {:<14} {:<10}",
        "Source".bold(),
        "Origin".bold(),
        "Patterns".bold()
    );
    println!("{:-<71}", "");

    for source in rules.sources() {
        let origin = match source.origin {
            RuleOrigin::IgnoreFile => "ignore file".green(),
            RuleOrigin::Extra => "extra".yellow(),
            RuleOrigin::Builtin => "built-in".cyan(),
        };
        let label = source
            .path
            .as_ref()
            .map_or_else(|| "(config/cli)".to_string(), |p| p.display().to_string());
        println!(
            "{:<45} {:<14} {:<10}",
            label.blue(),
            origin,
            source.patterns.len()
        );
    }
    println!("\n{} {}", "Patterns:".bold(), rules.patterns().join("  ").cyan());
}
