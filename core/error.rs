use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("TOML Parsing Error: {0}")]
    TomlParse(String),

    #[error("TOML Serialization Error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON Serialization Error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("YAML Parsing/Serialization Error: {0}")]
    YamlError(#[from] serde_yml::Error),

    #[error("XML Serialization Error: {0}")]
    XmlSerialize(String),

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File Read Error: Path '{path}', Error: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File Write Error: Path '{path}', Error: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory Creation Error: Path '{path}', Error: {source}")]
    DirCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("WalkDir Error: {0}")]
    WalkDir(String),

    #[error("Glob Pattern Error: {0}")]
    Glob(String),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Tree conflict: {0}")]
    TreeConflict(String),

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),
}

impl From<quick_xml::se::SeError> for AppError {
    fn from(err: quick_xml::se::SeError) -> Self {
        AppError::XmlSerialize(err.to_string())
    }
}

impl From<globset::Error> for AppError {
    fn from(err: globset::Error) -> Self {
        AppError::Glob(format!("Globset error: {}", err))
    }
}

impl From<walkdir::Error> for AppError {
    fn from(err: walkdir::Error) -> Self {
        AppError::WalkDir(err.to_string())
    }
}

/// A problem that is reported to the caller but never aborts a scan. Each one
/// is also logged with `log::warn!` where it is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScanWarning {
    /// A pattern failed to compile and is treated as never matching.
    InvalidPattern { pattern: String, message: String },
    /// An ignore file was found but could not be read.
    IgnoreFileRead { path: PathBuf, message: String },
    /// Directory enumeration failed below the scan root.
    Walk {
        path: Option<PathBuf>,
        message: String,
    },
    /// A file could not be read; it is left out of the output.
    FileRead { path: String, message: String },
    /// A file was not valid UTF-8 and was decoded with replacement characters.
    LossyDecode { path: String },
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanWarning::InvalidPattern { pattern, message } => {
                write!(f, "Invalid ignore pattern \"{}\" skipped: {}", pattern, message)
            }
            ScanWarning::IgnoreFileRead { path, message } => {
                write!(f, "Could not read ignore file '{}': {}", path.display(), message)
            }
            ScanWarning::Walk {
                path: Some(path),
                message,
            } => write!(f, "Could not walk '{}': {}", path.display(), message),
            ScanWarning::Walk { path: None, message } => {
                write!(f, "Directory walk error: {}", message)
            }
            ScanWarning::FileRead { path, message } => {
                write!(f, "Skipped unreadable file '{}': {}", path, message)
            }
            ScanWarning::LossyDecode { path } => {
                write!(f, "File '{}' is not valid UTF-8; invalid bytes replaced", path)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_render_human_readable_messages() {
        let warning = ScanWarning::InvalidPattern {
            pattern: "[abc".to_string(),
            message: "unclosed character class".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "Invalid ignore pattern \"[abc\" skipped: unclosed character class"
        );

        let lossy = ScanWarning::LossyDecode {
            path: "data/blob.bin".to_string(),
        };
        assert!(lossy.to_string().contains("data/blob.bin"));
    }

    #[test]
    fn warnings_serialize_with_kind_tag() {
        let warning = ScanWarning::FileRead {
            path: "a.txt".to_string(),
            message: "permission denied".to_string(),
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "fileRead");
        assert_eq!(json["path"], "a.txt");
    }
}
