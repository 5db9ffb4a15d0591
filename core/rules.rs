//! Ignore-rule resolution: finding ignore files above a scan root and turning
//! them into one combined pattern list.

use crate::config::IgnoreConfig;
use crate::error::{AppError, Result, ScanWarning};
use log;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const GITIGNORE_FILE_NAME: &str = ".gitignore";
pub const GPTIGNORE_FILE_NAME: &str = ".gptignore";
/// Always part of every rule set.
pub const VCS_METADATA_PATTERN: &str = ".git";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleOrigin {
    IgnoreFile,
    Extra,
    Builtin,
}

/// Where a group of patterns in an [`IgnoreRuleSet`] came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnoreSource {
    pub origin: RuleOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub patterns: Vec<String>,
}

/// The combined patterns used for one scan. Order is kept for display only;
/// matching is any-match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnoreRuleSet {
    patterns: Vec<String>,
    sources: Vec<IgnoreSource>,
}

impl IgnoreRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(&mut self, origin: RuleOrigin, path: Option<PathBuf>, patterns: Vec<String>) {
        log::trace!(
            "Adding {} pattern(s) from {:?} source {:?}",
            patterns.len(),
            origin,
            path
        );
        self.patterns.extend(patterns.iter().cloned());
        self.sources.push(IgnoreSource {
            origin,
            path,
            patterns,
        });
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn sources(&self) -> &[IgnoreSource] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Builds the rule set for a scan starting at `start_dir`.
    ///
    /// Each name in `config.ignore_files` is searched for independently, walking
    /// upward from `start_dir`. The nearest match for each name contributes its
    /// patterns; names with no match contribute nothing. `config.extra` and
    /// `config.builtin` are appended afterwards, so the version-control pattern
    /// is present even when no ignore file exists. An ignore file that exists
    /// but cannot be read is reported as a warning and skipped.
    pub fn resolve(start_dir: &Path, config: &IgnoreConfig) -> (Self, Vec<ScanWarning>) {
        let mut set = Self::new();
        let mut warnings = Vec::new();
        log::debug!(
            "Resolving ignore rules for {} (files: {:?})",
            start_dir.display(),
            config.ignore_files
        );

        for file_name in &config.ignore_files {
            let Some(path) = find_ignore_file(start_dir, file_name) else {
                log::debug!("No '{}' found above {}", file_name, start_dir.display());
                continue;
            };
            match load_ignore_file(&path) {
                Ok(patterns) => {
                    log::info!(
                        "Loaded {} pattern(s) from {}",
                        patterns.len(),
                        path.display()
                    );
                    set.add_source(RuleOrigin::IgnoreFile, Some(path), patterns);
                }
                Err(e) => {
                    log::warn!("Skipping ignore file '{}': {}", path.display(), e);
                    warnings.push(ScanWarning::IgnoreFileRead {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        if !config.extra.is_empty() {
            set.add_source(RuleOrigin::Extra, None, clean_patterns(&config.extra));
        }
        if !config.builtin.is_empty() {
            set.add_source(RuleOrigin::Builtin, None, clean_patterns(&config.builtin));
        }

        log::debug!("Ignore patterns: {:?}", set.patterns);
        (set, warnings)
    }
}

/// Returns the nearest regular file named `file_name` in `start_dir` or any of
/// its ancestors. Reaching the filesystem root without a match yields `None`.
pub fn find_ignore_file(start_dir: &Path, file_name: &str) -> Option<PathBuf> {
    start_dir.ancestors().find_map(|dir| {
        let candidate = dir.join(file_name);
        log::trace!("Probing for ignore file: {}", candidate.display());
        candidate.is_file().then_some(candidate)
    })
}

/// One pattern per non-blank line, trimmed, in file order.
pub fn parse_ignore_patterns(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn load_ignore_file(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(parse_ignore_patterns(&String::from_utf8_lossy(&bytes)))
}

fn clean_patterns(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_discards_blank_lines_and_trims() {
        let patterns = parse_ignore_patterns("target\n\n   \n  *.log  \r\n# comment\n!keep.txt\n");
        assert_eq!(patterns, vec!["target", "*.log", "# comment", "!keep.txt"]);
    }

    #[test]
    fn find_ignore_file_searches_upward() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b").join("c");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("a").join(".gptignore"), "dist\n").unwrap();

        assert_eq!(
            find_ignore_file(&nested, ".gptignore"),
            Some(dir.path().join("a").join(".gptignore"))
        );
    }

    #[test]
    fn find_ignore_file_prefers_the_nearest_match() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("inner");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(".gitignore"), "outer\n").unwrap();
        fs::write(nested.join(".gitignore"), "inner\n").unwrap();

        assert_eq!(
            find_ignore_file(&nested, ".gitignore"),
            Some(nested.join(".gitignore"))
        );
    }

    #[test]
    fn find_ignore_file_skips_directories_with_the_same_name() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("inner");
        fs::create_dir_all(nested.join(".gptignore")).unwrap();
        fs::write(dir.path().join(".gptignore"), "x\n").unwrap();

        assert_eq!(
            find_ignore_file(&nested, ".gptignore"),
            Some(dir.path().join(".gptignore"))
        );
    }

    #[test]
    fn find_ignore_file_returns_none_when_absent() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            find_ignore_file(dir.path(), ".foldertext-test-ignore-that-does-not-exist"),
            None
        );
    }

    #[test]
    fn resolve_combines_both_files_and_appends_builtin() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "target\n*.log\n").unwrap();
        fs::write(dir.path().join(".gptignore"), "*.log\ndocs\n").unwrap();

        let (rules, warnings) = IgnoreRuleSet::resolve(dir.path(), &IgnoreConfig::default());
        assert!(warnings.is_empty());
        assert_eq!(rules.patterns(), ["target", "*.log", "*.log", "docs", ".git"]);
        assert_eq!(rules.sources().len(), 3);
        assert_eq!(rules.sources()[0].origin, RuleOrigin::IgnoreFile);
        assert_eq!(rules.sources()[2].origin, RuleOrigin::Builtin);
    }

    #[test]
    fn resolve_without_ignore_files_still_has_vcs_pattern() {
        let dir = TempDir::new().unwrap();
        let config = IgnoreConfig {
            ignore_files: vec![".foldertext-test-ignore-that-does-not-exist".to_string()],
            ..IgnoreConfig::default()
        };
        let (rules, warnings) = IgnoreRuleSet::resolve(dir.path(), &config);
        assert!(warnings.is_empty());
        assert_eq!(rules.patterns(), [".git"]);
    }

    #[test]
    fn resolve_appends_extra_patterns_before_builtin() {
        let dir = TempDir::new().unwrap();
        let config = IgnoreConfig {
            ignore_files: Vec::new(),
            builtin: vec![".git".to_string()],
            extra: vec![" node_modules ".to_string(), "".to_string()],
        };
        let (rules, _) = IgnoreRuleSet::resolve(dir.path(), &config);
        assert_eq!(rules.patterns(), ["node_modules", ".git"]);
        assert_eq!(rules.sources()[0].origin, RuleOrigin::Extra);
    }

    #[test]
    fn ignore_files_with_invalid_utf8_are_decoded_lossily() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".gitignore");
        fs::write(&path, b"build\n\xff\xfe\nout\n").unwrap();
        let patterns = load_ignore_file(&path).unwrap();
        assert_eq!(patterns.len(), 3);
        assert_eq!(patterns[0], "build");
        assert_eq!(patterns[2], "out");
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_ignore_file_is_skipped_with_warning() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let name = ".foldertext-test-locked-ignore";
        let path = dir.path().join(name);
        fs::write(&path, "secret\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read(&path).is_ok() {
            // Running with privileges that bypass permission bits.
            fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
            return;
        }

        let config = IgnoreConfig {
            ignore_files: vec![name.to_string()],
            ..IgnoreConfig::default()
        };
        let (rules, warnings) = IgnoreRuleSet::resolve(dir.path(), &config);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        assert_eq!(rules.patterns(), [".git"]);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            ScanWarning::IgnoreFileRead { path: warned, .. } if warned == &path
        ));
    }
}
