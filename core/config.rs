use crate::error::{AppError, Result};
use crate::output_formats::{DEFAULT_HEADER, DOWNLOAD_FILE_NAME};
use crate::rules::{GITIGNORE_FILE_NAME, GPTIGNORE_FILE_NAME, VCS_METADATA_PATTERN};
use log;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_DIR: &str = ".foldertext";
pub const DEFAULT_CONFIG_FILENAME: &str = "foldertext.toml";
pub const DEFAULT_FOLDERS_ROOT: &str = "/home";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ignore: IgnoreConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub save: SaveConfig,
    #[serde(default)]
    pub folders: FoldersConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Visit directory entries sorted by file name instead of enumeration order.
    #[serde(default = "default_true")]
    pub sort_entries: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IgnoreConfig {
    /// Ignore file names searched upward from the scan root, in order.
    #[serde(default = "default_ignore_files")]
    pub ignore_files: Vec<String>,
    /// Patterns appended to every rule set regardless of ignore files.
    #[serde(default = "default_builtin_ignores")]
    pub builtin: Vec<String>,
    #[serde(default)]
    pub extra: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_header")]
    pub header: String,
    #[serde(default = "default_format")]
    pub format: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SaveConfig {
    #[serde(default = "default_save_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_save_filename")]
    pub filename: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FoldersConfig {
    #[serde(default = "default_folders_root")]
    pub root: PathBuf,
}

fn default_true() -> bool {
    true
}
fn default_ignore_files() -> Vec<String> {
    vec![
        GITIGNORE_FILE_NAME.to_string(),
        GPTIGNORE_FILE_NAME.to_string(),
    ]
}
fn default_builtin_ignores() -> Vec<String> {
    vec![VCS_METADATA_PATTERN.to_string()]
}
fn default_header() -> String {
    DEFAULT_HEADER.to_string()
}
fn default_format() -> String {
    "text".to_string()
}
fn default_save_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_save_filename() -> String {
    DOWNLOAD_FILE_NAME.to_string()
}
fn default_folders_root() -> PathBuf {
    PathBuf::from(DEFAULT_FOLDERS_ROOT)
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            sort_entries: default_true(),
        }
    }
}
impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            ignore_files: default_ignore_files(),
            builtin: default_builtin_ignores(),
            extra: Vec::new(),
        }
    }
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            header: default_header(),
            format: default_format(),
        }
    }
}
impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            output_dir: default_save_dir(),
            filename: default_save_filename(),
        }
    }
}
impl Default for FoldersConfig {
    fn default() -> Self {
        Self {
            root: default_folders_root(),
        }
    }
}

impl Config {
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("PROJECT_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => expand_path(&p_str),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize project root '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })
    }

    /// Picks the config file for `project_root`.
    ///
    /// An explicit `cli_config_file` that looks like a path is used as is
    /// (`.toml` is appended when the bare path is missing); a plain name is
    /// looked up in the default config directory. Without one, the default
    /// file is used only if it exists.
    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        let Some(requested) = cli_config_file else {
            let default_path = Self::default_config_path(project_root);
            if default_path.is_file() {
                log::debug!("Using default config file: {}", default_path.display());
                return Ok(Some(default_path));
            }
            log::debug!("No config file at {}", default_path.display());
            return Ok(None);
        };

        let candidate = expand_path(requested);
        let is_path = candidate.is_absolute()
            || candidate.components().count() > 1
            || requested.contains(['/', '\\']);
        let resolved = if is_path {
            with_toml_fallback(candidate)
        } else {
            project_root
                .join(DEFAULT_CONFIG_DIR)
                .join(with_toml_extension(requested))
        };

        if !resolved.exists() {
            return Err(AppError::Config(format!(
                "Config file '{}' not found (looked at {})",
                requested,
                resolved.display()
            )));
        }
        log::debug!("Using config file: {}", resolved.display());
        Ok(Some(resolved))
    }

    pub fn default_config_path(project_root: &Path) -> PathBuf {
        project_root
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILENAME)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| match e {
            AppError::TomlParse(msg) => AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_toml_str(toml_content: &str) -> Result<Self> {
        toml::from_str::<Config>(toml_content).map_err(|e| AppError::TomlParse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Directory a saved document goes to; relative paths resolve against `base`.
    pub fn resolve_save_dir(&self, cli_dir: Option<&Path>, base: &Path) -> PathBuf {
        let dir = match cli_dir {
            Some(dir) => dir.to_path_buf(),
            None => expand_path(&self.save.output_dir.to_string_lossy()),
        };
        if dir.is_absolute() { dir } else { base.join(dir) }
    }
}

fn with_toml_extension(name: &str) -> String {
    if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{}.toml", name)
    }
}

fn with_toml_fallback(mut path: PathBuf) -> PathBuf {
    if !path.exists() && path.extension().is_none() {
        path.set_extension("toml");
    }
    path
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}
