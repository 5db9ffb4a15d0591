use crate::error::{AppError, Result};
use log;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A directory directly under the chooser root, with its own child directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderChoice {
    pub path: PathBuf,
    pub subfolders: Vec<PathBuf>,
}

/// Lists directories one and two levels below `root`. Symlinks to
/// directories count as directories. A second-level directory that cannot be
/// listed yields an empty `subfolders`.
pub fn list_top_level_folders(root: &Path, sort: bool) -> Result<Vec<FolderChoice>> {
    if !root.is_dir() {
        return Err(AppError::NotADirectory(root.to_path_buf()));
    }
    log::debug!("Listing folder choices under {}", root.display());

    let mut choices = Vec::new();
    for path in child_directories(root, sort)? {
        let subfolders = child_directories(&path, sort).unwrap_or_else(|e| {
            log::warn!("Could not list subfolders of {}: {}", path.display(), e);
            Vec::new()
        });
        choices.push(FolderChoice { path, subfolders });
    }
    Ok(choices)
}

fn child_directories(dir: &Path, sort: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true);
    if sort {
        walker = walker.sort_by_file_name();
    }

    let mut dirs = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => dirs.push(entry.into_path()),
            Ok(_) => {}
            Err(e) if e.depth() == 0 => return Err(AppError::from(e)),
            Err(e) => log::warn!("Skipping entry in {}: {}", dir.display(), e),
        }
    }
    Ok(dirs)
}
