pub mod config;
pub mod context;
pub mod error;
pub mod folders;
pub mod gather;
pub mod matcher;
pub mod output_formats;
pub mod rules;
pub mod tree;

pub use config::{Config, IgnoreConfig};
pub use context::{ScanReport, ScanResult, run_scan};
pub use error::{AppError, Result, ScanWarning};
pub use folders::{FolderChoice, list_top_level_folders};
pub use gather::{FileEntry, WalkOutcome, WalkedFile, load_file, load_file_at, load_files, scan};
pub use matcher::{PatternMatcher, matches};
pub use output_formats::{
    Attachment, render_document, render_file_block, render_file_blocks, serialize_to_json,
    serialize_to_xml, serialize_to_yaml,
};
pub use rules::{IgnoreRuleSet, IgnoreSource, RuleOrigin, find_ignore_file, parse_ignore_patterns};
pub use tree::{DirectoryNode, build_tree, render_tree};
