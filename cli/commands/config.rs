use crate::cli_args::ConfigArgs;
use crate::output::{confirm_overwrite, write_to_stdout};
use anyhow::{Context, Result};
use colored::*;
use foldertext_core::Config;
use std::fs;
use std::path::Path;

pub fn handle_config_command(args: &ConfigArgs, project_root: &Path, quiet: bool) -> Result<()> {
    let content = Config::default()
        .to_toml_string()
        .context("Failed to serialize default configuration")?;

    if !args.save {
        return write_to_stdout(&content);
    }

    let save_path = Config::default_config_path(project_root);
    if !confirm_overwrite(&save_path, quiet)? {
        return Ok(());
    }
    if let Some(parent) = save_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(&save_path, &content)
        .with_context(|| format!("Failed to write config to {}", save_path.display()))?;

    if !quiet {
        println!(
            "{} Default configuration saved to: {}",
            "✅".green(),
            save_path.display().to_string().blue()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_args::ProjectConfigOpts;
    use tempfile::TempDir;

    #[test]
    fn saved_config_loads_back_as_default() {
        let dir = TempDir::new().unwrap();
        let args = ConfigArgs {
            project_config: ProjectConfigOpts::default(),
            save: true,
        };
        handle_config_command(&args, dir.path(), true).unwrap();

        let path = Config::default_config_path(dir.path());
        assert_eq!(Config::load_from_path(&path).unwrap(), Config::default());
    }

    #[test]
    fn quiet_mode_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = Config::default_config_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[general]\nsort_entries = false\n").unwrap();

        let args = ConfigArgs {
            project_config: ProjectConfigOpts::default(),
            save: true,
        };
        assert!(handle_config_command(&args, dir.path(), true).is_err());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[general]\nsort_entries = false\n"
        );
    }
}
