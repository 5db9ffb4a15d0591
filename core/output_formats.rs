use crate::error::{AppError, Result};
use crate::gather::FileEntry;
use log;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_HEADER: &str = "Files in repository:";
pub const DOWNLOAD_FILE_NAME: &str = "processed_files.txt";
pub const DOWNLOAD_MIME_TYPE: &str = "text/plain";

/// One file's section of the concatenated text.
pub fn render_file_block(entry: &FileEntry) -> String {
    format!(
        "\n'''--- {} ---\n\n(Line count: {})\n{}\n'''",
        entry.path, entry.line_count, entry.content
    )
}

/// Blocks for every entry in list order, joined by newlines.
pub fn render_file_blocks(entries: &[FileEntry]) -> String {
    entries
        .iter()
        .map(render_file_block)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_document(header: &str, tree_text: &str, entries: &[FileEntry]) -> String {
    format!("{}\n\n{}\n\n{}", header, tree_text, render_file_blocks(entries))
}

/// Generated text packaged for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub body: String,
}

impl Attachment {
    /// Wraps text that was already produced; nothing is regenerated.
    pub fn processed_files(text: impl Into<String>) -> Self {
        Self {
            file_name: DOWNLOAD_FILE_NAME.to_string(),
            mime_type: DOWNLOAD_MIME_TYPE.to_string(),
            body: text.into(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Writes the body to `dir/<file_name>`, creating `dir` if needed.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        if !dir.exists() {
            log::info!("Creating output directory: {}", dir.display());
            fs::create_dir_all(dir).map_err(|e| AppError::DirCreation {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.body).map_err(|e| AppError::FileWrite {
            path: path.clone(),
            source: e,
        })?;
        log::info!("Saved {} ({} bytes)", path.display(), self.body.len());
        Ok(path)
    }
}

pub fn serialize_to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).map_err(AppError::JsonSerialize)
    } else {
        serde_json::to_string(value).map_err(AppError::JsonSerialize)
    }
}

pub fn serialize_to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_yml::to_string(value).map_err(AppError::YamlError)
}

pub fn serialize_to_xml<T: Serialize>(value: &T, root_name: &str) -> Result<String> {
    quick_xml::se::to_string_with_root(root_name, value).map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(path: &str, content: &str, line_count: usize) -> FileEntry {
        FileEntry {
            path: path.to_string(),
            content: content.to_string(),
            line_count,
            size: content.len(),
            lossy: false,
        }
    }

    #[test]
    fn block_has_fenced_header_and_line_count() {
        let block = render_file_block(&entry("sub/b.py", "print()\n", 1));
        assert_eq!(block, "\n'''--- sub/b.py ---\n\n(Line count: 1)\nprint()\n\n'''");
    }

    #[test]
    fn blocks_are_joined_in_order() {
        let text = render_file_blocks(&[entry("a", "1", 1), entry("b", "2", 1)]);
        assert_eq!(
            text,
            "\n'''--- a ---\n\n(Line count: 1)\n1\n'''\n\n'''--- b ---\n\n(Line count: 1)\n2\n'''"
        );
    }

    #[test]
    fn document_joins_header_tree_and_blocks() {
        let doc = render_document(DEFAULT_HEADER, "- a (1 lines)\n", &[entry("a", "x", 1)]);
        assert_eq!(
            doc,
            "Files in repository:\n\n- a (1 lines)\n\n\n\n'''--- a ---\n\n(Line count: 1)\nx\n'''"
        );
    }

    #[test]
    fn document_with_no_files_keeps_separators() {
        assert_eq!(render_document("H", "", &[]), "H\n\n\n\n");
    }

    #[test]
    fn attachment_is_plain_text_named_processed_files() {
        let attachment = Attachment::processed_files("body");
        assert_eq!(attachment.file_name, "processed_files.txt");
        assert_eq!(attachment.mime_type, "text/plain");
        assert_eq!(attachment.body, "body");
    }

    #[test]
    fn attachment_writes_body_verbatim() {
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("nested").join("out");
        let path = Attachment::processed_files("exact\ntext")
            .write_to_dir(&out_dir)
            .unwrap();
        assert_eq!(path, out_dir.join("processed_files.txt"));
        assert_eq!(fs::read_to_string(path).unwrap(), "exact\ntext");
    }

    #[test]
    fn structured_formats_serialize_entries() {
        let e = entry("a.txt", "secret", 1);
        let json = serialize_to_json(&e, false).unwrap();
        assert!(json.contains("\"lineCount\":1"));
        assert!(!json.contains("secret"));
        assert!(serialize_to_yaml(&e).unwrap().contains("path: a.txt"));
        assert!(serialize_to_xml(&e, "file").unwrap().starts_with("<file>"));
    }
}
