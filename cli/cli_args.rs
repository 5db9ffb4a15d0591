use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        long,
        help = "Folder to scan (default: $PROJECT_ROOT or current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Specify path/filename of the TOML config file (default: .foldertext/foldertext.toml).",
        value_name = "CONTEXT_FILE",
        conflicts_with = "disable_context_file",
        help_heading = "Project Setup"
    )]
    pub context_file: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "context_file",
        help_heading = "Project Setup"
    )]
    pub disable_context_file: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FormatOutputOpts {
    #[arg(short = 'f', long, help = "Set the output format.", value_name = "FORMAT", value_parser = ["text", "json", "yaml", "xml"], help_heading = "Output Formatting")]
    pub format: Option<String>,

    #[arg(
        long,
        help = "Pretty-print JSON output instead of the compact default.",
        help_heading = "Output Formatting"
    )]
    pub disable_json_minify: bool,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Concatenate a folder's text files into one document.",
    long_about = "foldertext walks a folder, skips anything matched by .gitignore/.gptignore \npatterns, and produces a single text document: a tree of the included files \nwith line counts followed by the content of every file.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  foldertext generate --project-root ~/code/app\n  foldertext generate -s ./out --exclude node_modules\n  foldertext folders --root /srv\n  foldertext debug -f json",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv, -vvv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "g",
        visible_alias = "gen",
        about = "Scan a folder and produce the concatenated document."
    )]
    Generate(GenerateArgs),

    #[command(
        visible_alias = "f",
        about = "List folders that can be scanned, two levels deep."
    )]
    Folders(FoldersArgs),

    #[command(
        visible_alias = "d",
        about = "Show effective configuration, ignore rules and included files."
    )]
    Debug(DebugArgs),

    #[command(about = "Generate or save shell completion scripts.")]
    Completion(CompletionArgs),

    #[command(about = "Show or save the default configuration file structure.")]
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,

    #[arg(
        short = 's', long, value_name = "SAVE_DIR",
        num_args = 0..=1,
        help_heading = "Output Control",
        help = "Save as processed_files.txt. Optional SAVE_DIR overrides config/default logic.",
    )]
    pub save: Option<Option<PathBuf>>,

    #[arg(
        long,
        value_name = "TEXT",
        help = "Text placed above the tree [default: \"Files in repository:\"].",
        help_heading = "Output Control"
    )]
    pub header: Option<String>,

    #[clap(flatten)]
    pub ignore: IgnoreOpts,
}

#[derive(Args, Debug, Clone, Default)]
pub struct IgnoreOpts {
    #[arg(long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append, help = "Add an ignore pattern (matched anywhere in the relative path).", help_heading = "Ignore Rules")]
    pub exclude: Vec<String>,

    #[arg(long = "ignore-file", value_name = "NAME", action = clap::ArgAction::Append, help = "Ignore file name to search upward for; replaces the configured names.", help_heading = "Ignore Rules")]
    pub ignore_files: Vec<String>,

    #[arg(
        long,
        help = "Do not add the built-in '.git' pattern.",
        help_heading = "Ignore Rules"
    )]
    pub disable_builtin_ignore: bool,

    #[arg(
        long,
        help = "Keep filesystem enumeration order instead of sorting by name.",
        help_heading = "Ignore Rules"
    )]
    pub no_sort: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FoldersArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,

    #[arg(
        long,
        value_name = "PATH",
        help = "Directory whose folders are listed [default: /home]."
    )]
    pub root: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DebugArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,
    #[clap(flatten)]
    pub ignore: IgnoreOpts,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(
        long,
        value_name = "SHELL",
        help = "Shell to generate completions for (fish, bash, zsh) [default: fish]"
    )]
    pub shell: Option<String>,
    #[arg(
        long,
        help = "Save completion script to default location (prompts overwrite)."
    )]
    pub save: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[arg(
        long,
        help = "Save default config structure to default path (prompts overwrite)."
    )]
    pub save: bool,
}
