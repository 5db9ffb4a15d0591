use crate::config::Config;
use crate::error::{AppError, Result, ScanWarning};
use crate::gather::{self, FileEntry};
use crate::matcher::PatternMatcher;
use crate::output_formats::{Attachment, render_document};
use crate::rules::IgnoreRuleSet;
use crate::tree::{DirectoryNode, build_tree, render_tree};
use log;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Included files and the tree built from them. Every leaf path of `tree` is
/// the path of exactly one entry in `files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub files: Vec<FileEntry>,
    pub tree: DirectoryNode,
}

impl ScanResult {
    pub fn from_entries(files: Vec<FileEntry>) -> Result<Self> {
        let tree = build_tree(&files)?;
        Ok(Self { files, tree })
    }

    pub fn file_list(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn total_lines(&self) -> usize {
        self.files.iter().map(|f| f.line_count).sum()
    }
}

/// Everything one scan produced. Serializing it leaves out file contents and
/// the concatenated text.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub root: PathBuf,
    pub rules: IgnoreRuleSet,
    pub file_list: Vec<String>,
    pub tree_text: String,
    #[serde(skip)]
    pub concatenated_text: String,
    pub pruned_dirs: Vec<String>,
    pub warnings: Vec<ScanWarning>,
    pub result: ScanResult,
}

impl ScanReport {
    /// The concatenated text as a download, without rescanning.
    pub fn attachment(&self) -> Attachment {
        Attachment::processed_files(self.concatenated_text.clone())
    }
}

/// Scans `folder` with fresh rules and returns the rendered document along
/// with everything needed to explain it.
///
/// Only a missing or non-directory `folder` fails the call; unreadable files,
/// bad patterns and walk errors end up in `warnings`.
pub fn run_scan(folder: &Path, config: &Config) -> Result<ScanReport> {
    if !folder.is_dir() {
        return Err(AppError::NotADirectory(folder.to_path_buf()));
    }
    log::info!("Scanning folder: {}", folder.display());

    let (rules, mut warnings) = IgnoreRuleSet::resolve(folder, &config.ignore);
    let matcher = PatternMatcher::new(&rules);
    warnings.extend(matcher.warnings().iter().cloned());

    let walk = gather::scan(folder, &matcher, config.general.sort_entries)?;
    warnings.extend(walk.warnings);

    let (files, load_warnings) = gather::load_files(&walk.paths);
    warnings.extend(load_warnings);

    let result = ScanResult::from_entries(files)?;
    let tree_text = render_tree(&result.tree);
    let concatenated_text = render_document(&config.output.header, &tree_text, &result.files);

    log::info!(
        "Scan complete: {} file(s), {} line(s), {} warning(s)",
        result.files.len(),
        result.total_lines(),
        warnings.len()
    );

    Ok(ScanReport {
        root: folder.to_path_buf(),
        rules,
        file_list: result.file_list(),
        tree_text,
        concatenated_text,
        pruned_dirs: walk.pruned_dirs,
        warnings,
        result,
    })
}
