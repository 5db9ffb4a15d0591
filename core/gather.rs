use crate::error::{AppError, Result, ScanWarning};
use crate::matcher::PatternMatcher;
use log;
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// One included file, read once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Relative to the scan root, `/`-separated.
    pub path: String,
    #[serde(skip)]
    pub content: String,
    pub line_count: usize,
    pub size: usize,
    /// Set when the bytes were not valid UTF-8 and replacement decoding was used.
    pub lossy: bool,
}

/// A file accepted by the walk. `relative` is for display and matching;
/// `full_path` is what gets read, so names that are not valid UTF-8 still load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    pub relative: String,
    pub full_path: PathBuf,
}

/// Files that survived filtering, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkOutcome {
    pub paths: Vec<WalkedFile>,
    pub pruned_dirs: Vec<String>,
    pub warnings: Vec<ScanWarning>,
}

impl WalkOutcome {
    pub fn relative_paths(&self) -> Vec<&str> {
        self.paths.iter().map(|f| f.relative.as_str()).collect()
    }
}

/// Walks `root` and returns the root-relative paths of files not ignored by
/// `matcher`.
///
/// Directories are tested with the same root-relative form as files; an
/// ignored directory is never entered, so nothing beneath it is reported even
/// when the file's own path would not match. With `sort_entries` each
/// directory is visited in file-name order, otherwise in whatever order the
/// filesystem yields. Symlinks are not followed.
pub fn scan(root: &Path, matcher: &PatternMatcher, sort_entries: bool) -> Result<WalkOutcome> {
    if !root.is_dir() {
        return Err(AppError::NotADirectory(root.to_path_buf()));
    }

    let mut walker = WalkDir::new(root).follow_links(false);
    if sort_entries {
        walker = walker.sort_by_file_name();
    }

    log::info!("Walking directory: {}", root.display());
    let mut outcome = WalkOutcome::default();
    let mut entries = walker.into_iter();

    while let Some(entry_result) = entries.next() {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                if e.depth() == 0 {
                    return Err(AppError::from(e));
                }
                log::warn!("Error walking directory: {}", e);
                outcome.warnings.push(ScanWarning::Walk {
                    path: e.path().map(Path::to_path_buf),
                    message: e.to_string(),
                });
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let Some(relative_path) = relative_path_string(root, entry.path()) else {
            log::warn!("Could not get relative path for: {}", entry.path().display());
            continue;
        };

        if entry.file_type().is_dir() {
            if matcher.is_ignored(&relative_path) {
                log::debug!("Pruning ignored directory: {}", relative_path);
                entries.skip_current_dir();
                outcome.pruned_dirs.push(relative_path);
            }
            continue;
        }

        if is_symlinked_dir(&entry) {
            log::trace!("Not following directory symlink: {}", relative_path);
            continue;
        }

        if matcher.is_ignored(&relative_path) {
            log::trace!("Excluding file: {}", relative_path);
            continue;
        }

        log::trace!("Including file: {}", relative_path);
        outcome.paths.push(WalkedFile {
            relative: relative_path,
            full_path: entry.into_path(),
        });
    }

    log::info!(
        "Directory walk complete. {} file(s) included, {} director(ies) pruned.",
        outcome.paths.len(),
        outcome.pruned_dirs.len()
    );
    Ok(outcome)
}

fn is_symlinked_dir(entry: &DirEntry) -> bool {
    entry.path_is_symlink() && fs::metadata(entry.path()).is_ok_and(|m| m.is_dir())
}

/// `path` relative to `root`, joined with `/`.
pub fn relative_path_string(root: &Path, path: &Path) -> Option<String> {
    let relative = pathdiff::diff_paths(path, root)?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Number of lines, counting an unterminated last line. `\r\n` is one terminator.
pub fn count_lines(text: &str) -> usize {
    text.lines().count()
}

/// Decodes `bytes` as UTF-8, falling back to U+FFFD replacement. The flag is
/// `true` when the fallback was used.
pub fn decode_content(bytes: Vec<u8>) -> (String, bool) {
    match String::from_utf8(bytes) {
        Ok(text) => (text, false),
        Err(e) => (String::from_utf8_lossy(e.as_bytes()).into_owned(), true),
    }
}

pub fn load_file(root: &Path, relative_path: &str) -> Result<FileEntry> {
    load_file_at(&root.join(relative_path), relative_path)
}

/// Reads `full_path` and records it under `relative_path`.
pub fn load_file_at(full_path: &Path, relative_path: &str) -> Result<FileEntry> {
    let bytes = fs::read(full_path).map_err(|e| AppError::FileRead {
        path: full_path.to_path_buf(),
        source: e,
    })?;
    let size = bytes.len();
    let (content, lossy) = decode_content(bytes);
    let line_count = count_lines(&content);
    log::debug!(
        "Processed file {}: size {} bytes, lines {}",
        full_path.display(),
        size,
        line_count
    );
    Ok(FileEntry {
        path: relative_path.to_string(),
        content,
        line_count,
        size,
        lossy,
    })
}

/// Loads every walked file in order. Unreadable files are dropped with a
/// warning; non-UTF-8 files are kept and flagged.
pub fn load_files(files: &[WalkedFile]) -> (Vec<FileEntry>, Vec<ScanWarning>) {
    log::info!("Reading content for {} file(s)...", files.len());
    let mut entries = Vec::with_capacity(files.len());
    let mut warnings = Vec::new();

    for file in files {
        let path = &file.relative;
        match load_file_at(&file.full_path, path) {
            Ok(entry) => {
                if entry.lossy {
                    log::warn!("Non-UTF-8 content in {}; invalid bytes replaced", path);
                    warnings.push(ScanWarning::LossyDecode { path: path.clone() });
                }
                entries.push(entry);
            }
            Err(e) => {
                log::warn!("Error reading file {}: {}", path, e);
                let message = match &e {
                    AppError::FileRead { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                warnings.push(ScanWarning::FileRead {
                    path: path.clone(),
                    message,
                });
            }
        }
    }
    log::info!("File reading complete.");
    (entries, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn count_lines_handles_terminators() {
        assert_eq!(count_lines(""), 0);
        assert_eq!(count_lines("one"), 1);
        assert_eq!(count_lines("one\n"), 1);
        assert_eq!(count_lines("one\ntwo"), 2);
        assert_eq!(count_lines("one\r\ntwo\r\n"), 2);
        assert_eq!(count_lines("\n\n"), 2);
    }

    #[test]
    fn decode_replaces_invalid_sequences() {
        let (text, lossy) = decode_content(b"ok\xffbad\n".to_vec());
        assert!(lossy);
        assert_eq!(text, "ok\u{FFFD}bad\n");

        let (text, lossy) = decode_content("plain".as_bytes().to_vec());
        assert!(!lossy);
        assert_eq!(text, "plain");
    }

    #[test]
    fn scan_prunes_ignored_directories_and_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", b"a\nb\n");
        write(dir.path(), "sub/b.py", b"print()\n");
        write(dir.path(), "sub/skip.log", b"x");
        write(dir.path(), "node_modules/pkg/index.js", b"x");

        let matcher = PatternMatcher::from_patterns(&["node_modules", "*.log"]);
        let outcome = scan(dir.path(), &matcher, true).unwrap();
        assert_eq!(outcome.relative_paths(), vec!["a.txt", "sub/b.py"]);
        assert_eq!(outcome.pruned_dirs, vec!["node_modules"]);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn substring_pattern_prunes_directory_and_matching_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "cache/readme.md", b"x");
        write(dir.path(), "src/cache.rs", b"x");
        write(dir.path(), "src/main.rs", b"x");

        let matcher = PatternMatcher::from_patterns(&["cache"]);
        let outcome = scan(dir.path(), &matcher, true).unwrap();
        assert_eq!(outcome.relative_paths(), vec!["src/main.rs"]);
        assert_eq!(outcome.pruned_dirs, vec!["cache"]);
    }

    #[test]
    fn sorted_scan_is_depth_first_in_name_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b/z.txt", b"");
        write(dir.path(), "b/a.txt", b"");
        write(dir.path(), "a.txt", b"");
        write(dir.path(), "c.txt", b"");

        let matcher = PatternMatcher::from_patterns::<&str>(&[]);
        let outcome = scan(dir.path(), &matcher, true).unwrap();
        assert_eq!(outcome.relative_paths(), vec!["a.txt", "b/a.txt", "b/z.txt", "c.txt"]);
    }

    #[test]
    fn scan_rejects_non_directory_root() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "file.txt", b"");
        let matcher = PatternMatcher::from_patterns::<&str>(&[]);
        let err = scan(&dir.path().join("file.txt"), &matcher, true).unwrap_err();
        assert!(matches!(err, AppError::NotADirectory(_)));
    }

    #[cfg(unix)]
    #[test]
    fn directory_symlinks_are_not_followed_or_listed() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "real/file.txt", b"x");
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let matcher = PatternMatcher::from_patterns::<&str>(&[]);
        let outcome = scan(dir.path(), &matcher, true).unwrap();
        assert_eq!(outcome.relative_paths(), vec!["real/file.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_file_names_are_listed_and_loaded() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let raw_name = OsStr::from_bytes(b"caf\xe9.txt");
        if fs::write(dir.path().join(raw_name), "hello\n").is_err() {
            // Some filesystems refuse names that are not valid UTF-8.
            return;
        }

        let matcher = PatternMatcher::from_patterns::<&str>(&[]);
        let outcome = scan(dir.path(), &matcher, true).unwrap();
        assert_eq!(outcome.relative_paths(), vec!["caf\u{FFFD}.txt"]);

        let (files, warnings) = load_files(&outcome.paths);
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "caf\u{FFFD}.txt");
        assert_eq!(files[0].content, "hello\n");
        assert_eq!(files[0].line_count, 1);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_becomes_walk_warning() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        write(dir.path(), "open.txt", b"x");
        write(dir.path(), "locked/hidden.txt", b"x");
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Running with privileges that bypass permission bits.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let matcher = PatternMatcher::from_patterns::<&str>(&[]);
        let result = scan(dir.path(), &matcher, true);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let outcome = result.unwrap();
        assert_eq!(outcome.relative_paths(), vec!["open.txt"]);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(
            &outcome.warnings[0],
            ScanWarning::Walk { path: Some(path), .. } if path == &locked
        ));
    }

    #[test]
    fn load_file_counts_lines_of_lossy_text() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "bin/blob.dat", b"\xff\xfe\nsecond\nthird");
        let entry = load_file(dir.path(), "bin/blob.dat").unwrap();
        assert!(entry.lossy);
        assert_eq!(entry.line_count, 3);
        assert_eq!(entry.size, 15);
        assert!(entry.content.starts_with('\u{FFFD}'));
    }

    #[test]
    fn load_files_skips_missing_files_with_warning() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "present.txt", b"one\ntwo\n");
        let paths: Vec<WalkedFile> = ["present.txt", "vanished.txt"]
            .into_iter()
            .map(|rel| WalkedFile {
                relative: rel.to_string(),
                full_path: dir.path().join(rel),
            })
            .collect();

        let (files, warnings) = load_files(&paths);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "present.txt");
        assert_eq!(files[0].line_count, 2);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            ScanWarning::FileRead { path, .. } if path == "vanished.txt"
        ));
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/project");
        assert_eq!(
            relative_path_string(root, &root.join("a").join("b.rs")).as_deref(),
            Some("a/b.rs")
        );
        assert_eq!(relative_path_string(root, root), None);
    }
}
